//! # Feature: Styled Log Formatter
//!
//! Adapter for env_logger's `Builder::format` extension point. Each record's
//! message is restyled through the formatter's character, then laid out with
//! a format string such as `%(asctime)s - %(name)s - %(levelname)s - %(message)s`.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Records logged while a completion call is in flight stay unstyled
//! - 1.1.0: Brace and dollar placeholder styles, date format validation
//! - 1.0.0: Initial release with percent-style templates

pub mod template;

pub use template::{Field, FormatStyle, Template};

use crate::core::DIAG_TARGET;
use crate::features::completion::in_flight;
use crate::features::personas::Styler;
use anyhow::{bail, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use log::{Level, Record};
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Numeric severity, spaced the way common logging frameworks number them
pub fn level_number(level: Level) -> u32 {
    match level {
        Level::Error => 40,
        Level::Warn => 30,
        Level::Info => 20,
        Level::Debug => 10,
        Level::Trace => 5,
    }
}

/// Reject strftime patterns chrono cannot render
pub fn validate_date_format(date_format: &str) -> Result<()> {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        bail!("Invalid date format: {date_format}");
    }
    Ok(())
}

/// Format string, date format and placeholder style for one handler
#[derive(Debug, Clone, Default)]
pub struct LogFormat {
    template: Template,
    date_format: Option<String>,
}

impl LogFormat {
    pub fn new(format: &str, date_format: Option<&str>, style: FormatStyle) -> Result<Self> {
        let template = Template::parse(format, style)?;
        if let Some(date_format) = date_format {
            validate_date_format(date_format)?;
        }
        PROCESS_START.get_or_init(Instant::now);

        Ok(Self {
            template,
            date_format: date_format.map(String::from),
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Lay out `record` with `message` standing in for its own text
    pub fn render(&self, record: &Record, message: &str, now: DateTime<Local>) -> String {
        self.template.render(|field| match field {
            Field::Message => message.to_string(),
            Field::Asctime => self.asctime(now),
            Field::Name => record.target().to_string(),
            Field::Levelname => record.level().to_string(),
            Field::Levelno => level_number(record.level()).to_string(),
            Field::Pathname => record.file().unwrap_or("(unknown file)").to_string(),
            Field::Filename => record
                .file()
                .and_then(|f| Path::new(f).file_name())
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "(unknown file)".to_string()),
            Field::Module => record
                .module_path()
                .unwrap_or("(unknown module)")
                .to_string(),
            Field::Lineno => record.line().unwrap_or(0).to_string(),
            Field::Created => format!("{:.3}", now.timestamp_millis() as f64 / 1000.0),
            Field::Msecs => format!("{:03}", now.timestamp_subsec_millis()),
            Field::RelativeCreated => PROCESS_START
                .get_or_init(Instant::now)
                .elapsed()
                .as_millis()
                .to_string(),
            Field::Thread => format!("{:?}", std::thread::current().id()),
            Field::ThreadName => std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
            Field::Process => std::process::id().to_string(),
        })
    }

    fn asctime(&self, now: DateTime<Local>) -> String {
        match &self.date_format {
            Some(date_format) => now.format(date_format).to_string(),
            None => format!(
                "{},{:03}",
                now.format("%Y-%m-%d %H:%M:%S"),
                now.timestamp_subsec_millis()
            ),
        }
    }
}

/// Restyles every record it formats; one completion call per record
#[derive(Debug, Clone)]
pub struct StyledFormatter {
    styler: Styler,
    format: LogFormat,
}

impl StyledFormatter {
    pub fn new(styler: Styler, format: LogFormat) -> Self {
        Self { styler, format }
    }

    pub fn character(&self) -> &str {
        self.styler.character()
    }

    /// Produce the final line (without newline) for `record`
    ///
    /// Records on the diagnostics target, and records logged on a thread
    /// already waiting on a completion (the HTTP stack's own debug output),
    /// are laid out unstyled.
    pub fn format(&self, record: &Record) -> Result<String> {
        let raw = record.args().to_string();
        let message = if record.target().starts_with(DIAG_TARGET) || in_flight() {
            raw
        } else {
            self.styler.summarize(&raw)?
        };
        Ok(self.format.render(record, &message, Local::now()))
    }

    /// Register this formatter as `builder`'s format closure
    ///
    /// If styling fails the handler writes nothing for that record and the
    /// failure is reported on stderr.
    pub fn install(self, builder: &mut env_logger::Builder) -> &mut env_logger::Builder {
        builder.format(move |buf, record| match self.format(record) {
            Ok(line) => writeln!(buf, "{line}"),
            Err(e) => {
                report_logging_error(&e, record);
                Err(io::Error::new(io::ErrorKind::Other, e.to_string()))
            }
        })
    }
}

fn report_logging_error(error: &anyhow::Error, record: &Record) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(
        stderr,
        "--- Logging error ---\n{error:#}\nMessage: {}\nLogged from {}:{}",
        record.args(),
        record.file().unwrap_or("(unknown file)"),
        record.line().unwrap_or(0)
    );
}
