// Core layer - configuration and shared constants
pub mod core;

// Features layer - all feature modules
pub mod features;

pub use core::{SetupOptions, DIAG_TARGET};

pub use features::{
    // Setup
    active_styler, is_initialized, setup, Setup,
    // Styling
    styled_summarize, CompletionService, OpenAiCompletion, PromptBuilder, Styler, Task,
    DEFAULT_CHARACTER,
    // Print
    PrintOptions,
    // Logging
    console_handler, file_handler, pipe_handler, FormatStyle, LogFormat, StyledFormatter,
    StyledLogger,
    // Crash reports
    guard, install_panic_hook, panic_hook, run_main, FailureReport, Frame,
};
