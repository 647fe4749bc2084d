//! OpenAI chat-completion client behind the blocking [`CompletionService`] seam
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use super::{mark_in_flight, CompletionService};
use crate::core::DIAG_TARGET;
use anyhow::{Context, Result};
use log::debug;
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use tokio::runtime::{Builder, Handle, Runtime};
use uuid::Uuid;

/// Model used when `OPENAI_MODEL` is not set
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Environment variable selecting the completion model
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Sends each prompt as a single user message and blocks until the reply arrives
///
/// The openai crate is async, so the client owns a current-thread runtime and
/// drives each request to completion on it.
pub struct OpenAiCompletion {
    model: String,
    runtime: Runtime,
}

impl OpenAiCompletion {
    pub fn new(model: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start completion runtime")?;

        Ok(Self {
            model: model.to_string(),
            runtime,
        })
    }

    /// Build a client for `OPENAI_MODEL`, falling back to [`DEFAULT_MODEL`]
    pub fn from_env() -> Result<Self> {
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(&model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, prompt: String, request_id: Uuid) -> Result<String> {
        let messages = vec![ChatCompletionMessage {
            role: ChatCompletionMessageRole::User,
            content: Some(prompt),
            name: None,
            function_call: None,
            tool_call_id: None,
            tool_calls: None,
        }];

        let completion = ChatCompletion::builder(&self.model, messages)
            .create()
            .await?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("Completion response contained no message text"))?;

        debug!(target: DIAG_TARGET, "[{request_id}] Got response: {} chars", text.len());

        Ok(text)
    }
}

impl CompletionService for OpenAiCompletion {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request_id = Uuid::new_v4();
        debug!(
            target: DIAG_TARGET,
            "[{request_id}] Sending {} char prompt to {}",
            prompt.len(),
            self.model
        );

        let request = self.request(prompt.to_string(), request_id);

        // block_on panics when called from inside another runtime
        if Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                scope
                    .spawn(|| mark_in_flight(|| self.runtime.block_on(request)))
                    .join()
            })
            .map_err(|_| anyhow::anyhow!("Completion request thread panicked"))?
        } else {
            self.runtime.block_on(request)
        }
    }
}
