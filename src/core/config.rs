//! Setup options
//!
//! Defaults, environment overlays (`PERSONA_LOG_*`) and YAML loading for the
//! one-time setup call.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use crate::features::formatter::{FormatStyle, LogFormat};
use crate::features::personas::DEFAULT_CHARACTER;
use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const CHARACTER_ENV: &str = "PERSONA_LOG_CHARACTER";
pub const FORMAT_ENV: &str = "PERSONA_LOG_FORMAT";
pub const DATE_FORMAT_ENV: &str = "PERSONA_LOG_DATEFMT";
pub const LEVEL_ENV: &str = "PERSONA_LOG_LEVEL";
pub const FILE_ENV: &str = "PERSONA_LOG_FILE";
pub const ROOT_LOGGER_ENV: &str = "PERSONA_LOG_ROOT";
pub const EXCEPTHOOK_ENV: &str = "PERSONA_LOG_EXCEPTHOOK";

/// Everything setup can be told
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupOptions {
    /// Persona used by the logger, the print façade and crash reports
    pub character: String,

    /// Format string for the styled log handlers
    pub format: String,

    /// strftime pattern for `asctime`
    pub date_format: Option<String>,

    /// Placeholder syntax of `format`
    pub style: FormatStyle,

    /// Minimum level for the root logger
    pub level: String,

    /// Also write log lines to this file (append mode)
    pub file: Option<PathBuf>,

    /// Install the styled root logger
    pub logger: bool,

    /// Install the styled panic hook
    pub excepthook: bool,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            character: DEFAULT_CHARACTER.to_string(),
            format: "%(message)s".to_string(),
            date_format: None,
            style: FormatStyle::Percent,
            level: "INFO".to_string(),
            file: None,
            logger: false,
            excepthook: true,
        }
    }
}

impl SetupOptions {
    /// Defaults overlaid with any `PERSONA_LOG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load options from a YAML file; missing keys keep their defaults
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read setup options from {path}"))?;
        let options: SetupOptions = serde_yaml::from_str(&contents)?;
        options.validate()?;
        Ok(options)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut options = Self::default();

        if let Some(character) = lookup(CHARACTER_ENV) {
            options.character = character;
        }
        if let Some(format) = lookup(FORMAT_ENV) {
            options.format = format;
        }
        if let Some(date_format) = lookup(DATE_FORMAT_ENV) {
            options.date_format = Some(date_format);
        }
        if let Some(level) = lookup(LEVEL_ENV) {
            options.level = level;
        }
        if let Some(file) = lookup(FILE_ENV) {
            options.file = Some(PathBuf::from(file));
        }
        if let Some(value) = lookup(ROOT_LOGGER_ENV) {
            options.logger = parse_flag(ROOT_LOGGER_ENV, &value)?;
        }
        if let Some(value) = lookup(EXCEPTHOOK_ENV) {
            options.excepthook = parse_flag(EXCEPTHOOK_ENV, &value)?;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn with_character(mut self, character: &str) -> Self {
        self.character = character.to_string();
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_logger(mut self, logger: bool) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_excepthook(mut self, excepthook: bool) -> Self {
        self.excepthook = excepthook;
        self
    }

    /// Check the level, the format string and the date format
    pub fn validate(&self) -> Result<()> {
        self.level_filter()?;
        self.log_format()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        parse_level(&self.level)
    }

    pub fn log_format(&self) -> Result<LogFormat> {
        LogFormat::new(&self.format, self.date_format.as_deref(), self.style)
    }
}

/// Parse a level name, accepting the common aliases (`WARNING`, `CRITICAL`, ...)
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    let filter = match level.trim().to_ascii_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "CRITICAL" | "FATAL" | "ERROR" => LevelFilter::Error,
        "WARNING" | "WARN" => LevelFilter::Warn,
        "INFO" => LevelFilter::Info,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" | "NOTSET" => LevelFilter::Trace,
        _ => return Err(anyhow::anyhow!("Unknown log level: {}", level)),
    };
    Ok(filter)
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!("{} must be a boolean, got '{}'", name, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let options = SetupOptions::default();
        assert_eq!(options.character, "tsundere");
        assert_eq!(options.format, "%(message)s");
        assert_eq!(options.level, "INFO");
        assert_eq!(options.file, None);
        assert!(!options.logger);
        assert!(options.excepthook);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let options = SetupOptions::from_lookup(lookup_from(&[
            (CHARACTER_ENV, "Taiga from Toradora"),
            (LEVEL_ENV, "warning"),
            (FILE_ENV, "log.out"),
            (ROOT_LOGGER_ENV, "yes"),
            (EXCEPTHOOK_ENV, "0"),
        ]))
        .unwrap();

        assert_eq!(options.character, "Taiga from Toradora");
        assert_eq!(options.level_filter().unwrap(), LevelFilter::Warn);
        assert_eq!(options.file, Some(PathBuf::from("log.out")));
        assert!(options.logger);
        assert!(!options.excepthook);
    }

    #[test]
    fn test_env_overlay_rejects_bad_flag() {
        let result = SetupOptions::from_lookup(lookup_from(&[(ROOT_LOGGER_ENV, "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overlay_rejects_bad_format() {
        let result = SetupOptions::from_lookup(lookup_from(&[(FORMAT_ENV, "%(nope)s")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_level_aliases() {
        assert_eq!(parse_level("CRITICAL").unwrap(), LevelFilter::Error);
        assert_eq!(parse_level("Warning").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level(" info ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("NOTSET").unwrap(), LevelFilter::Trace);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_yaml_with_defaults() {
        let yaml = r#"
character: kuudere
format: "{asctime} {levelname} {message}"
style: brace
logger: true
"#;
        let options: SetupOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.character, "kuudere");
        assert_eq!(options.style, FormatStyle::Brace);
        assert_eq!(options.level, "INFO");
        assert!(options.logger);
        assert!(options.excepthook);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_yaml_invalid_date_format() {
        let yaml = r#"
date_format: "%Y-%"
"#;
        let options: SetupOptions = serde_yaml::from_str(yaml).unwrap();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(SetupOptions::load("/nonexistent/persona-log.yaml").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let options = SetupOptions::default()
            .with_character("dandere")
            .with_format("%(levelname)s: %(message)s")
            .with_level("debug")
            .with_file("app.log")
            .with_logger(true)
            .with_excepthook(false);

        assert_eq!(options.character, "dandere");
        assert_eq!(options.level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(options.file, Some(PathBuf::from("app.log")));
        assert!(options.logger);
        assert!(!options.excepthook);
    }
}
