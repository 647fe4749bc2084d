//! # Feature: Completion Service
//!
//! The single seam to the remote chat-completion endpoint. Everything that
//! restyles text goes through a [`CompletionService`].
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Per-thread in-flight marker so nested log records are not restyled
//! - 1.0.0: Initial release with OpenAI-backed blocking client

pub mod client;

pub use client::{OpenAiCompletion, DEFAULT_MODEL};

use anyhow::Result;
use std::cell::Cell;

thread_local! {
    static IN_FLIGHT: Cell<bool> = const { Cell::new(false) };
}

/// Whether this thread is currently waiting on a completion call
pub fn in_flight() -> bool {
    IN_FLIGHT.with(Cell::get)
}

/// Run `call` with this thread marked as in flight
pub(crate) fn mark_in_flight<T>(call: impl FnOnce() -> T) -> T {
    struct Restore(bool);

    impl Drop for Restore {
        fn drop(&mut self) {
            IN_FLIGHT.with(|flag| flag.set(self.0));
        }
    }

    let _restore = Restore(IN_FLIGHT.with(|flag| flag.replace(true)));
    call()
}

/// Blocking prompt -> text call against a completion endpoint
///
/// Implementations send the prompt as a single user-role message and return
/// the text of the first choice as received. Trimming is the caller's job.
pub trait CompletionService: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}


#[cfg(test)]
pub(crate) mod testing {
    use super::CompletionService;
    use anyhow::Result;
    use std::sync::Mutex;

    /// Records every prompt and answers with a fixed reply (or fails)
    pub struct ScriptedCompletion {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl CompletionService for ScriptedCompletion {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(anyhow::anyhow!("completion endpoint unreachable")),
            }
        }
    }
}
