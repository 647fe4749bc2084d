//! Text restyling through the completion service
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use super::prompt_builder::{PromptBuilder, Task};
use crate::features::completion::{mark_in_flight, CompletionService};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// Character used when none is configured
pub const DEFAULT_CHARACTER: &str = "tsundere";

/// Summarize `text` in the voice of `character` and return the trimmed reply
///
/// Makes exactly one completion call. Failures are returned unchanged.
pub fn styled_summarize(
    service: &dyn CompletionService,
    text: &str,
    character: &str,
) -> Result<String> {
    let prompt = PromptBuilder::new(character)
        .with_task(Task::Message)
        .with_payload(text)
        .build();
    complete_trimmed(service, &prompt)
}

pub(crate) fn complete_trimmed(service: &dyn CompletionService, prompt: &str) -> Result<String> {
    let reply = mark_in_flight(|| service.complete(prompt))?;
    Ok(reply.trim().to_string())
}

/// A character bound to a completion service
///
/// This is the context object handed out by setup. The print façade, the log
/// formatter and failure reporting all restyle through one of these.
#[derive(Clone)]
pub struct Styler {
    character: String,
    service: Arc<dyn CompletionService>,
}

impl Styler {
    pub fn new(character: &str, service: Arc<dyn CompletionService>) -> Self {
        Self {
            character: character.to_string(),
            service,
        }
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    /// Same completion service, different voice
    pub fn with_character(&self, character: &str) -> Self {
        Self::new(character, self.service.clone())
    }

    pub fn summarize(&self, text: &str) -> Result<String> {
        styled_summarize(self.service.as_ref(), text, &self.character)
    }

    pub(crate) fn complete(&self, prompt: &str) -> Result<String> {
        complete_trimmed(self.service.as_ref(), prompt)
    }
}

impl fmt::Debug for Styler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Styler")
            .field("character", &self.character)
            .finish_non_exhaustive()
    }
}
