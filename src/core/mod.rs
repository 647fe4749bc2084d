//! # Core Module
//!
//! Configuration and shared constants for the persona logger.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial creation with setup options

pub mod config;

pub use config::{parse_level, SetupOptions};

/// Log target for the crate's own diagnostics; records on it are never restyled
pub const DIAG_TARGET: &str = "persona_log::diag";
