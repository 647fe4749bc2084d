//! # Feature: Personas
//!
//! Character-voiced restyling of arbitrary text. A [`Styler`] binds a
//! character to a completion service; [`PromptBuilder`] assembles the prompt.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release

pub mod prompt_builder;
pub mod styler;

pub use prompt_builder::{PromptBuilder, Task, BASE_PROMPT};
pub use styler::{styled_summarize, Styler, DEFAULT_CHARACTER};
