//! # Features
//!
//! Each feature lives in its own module with a versioned header.

pub mod completion;
pub mod crash;
pub mod formatter;
pub mod logger;
pub mod personas;
pub mod print;
pub mod setup;

pub use completion::{CompletionService, OpenAiCompletion};
pub use crash::{guard, install_panic_hook, panic_hook, run_main, FailureReport, Frame};
pub use formatter::{FormatStyle, LogFormat, StyledFormatter};
pub use logger::{console_handler, file_handler, pipe_handler, StyledLogger};
pub use personas::{styled_summarize, PromptBuilder, Styler, Task, DEFAULT_CHARACTER};
pub use print::PrintOptions;
pub use setup::{active_styler, is_initialized, setup, Setup};
