//! # Feature: Styled Root Logger
//!
//! A `log::Log` implementation that fans every record out to a list of
//! env_logger handlers (stderr console, append-mode file, or any pipe), each
//! carrying its own [`StyledFormatter`]. A record accepted by two handlers is
//! restyled twice.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.0.0: Initial release with console and file handlers

use crate::features::formatter::StyledFormatter;
use anyhow::{Context, Result};
use env_logger::{Builder, Logger, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Handler writing to stderr
pub fn console_handler(formatter: StyledFormatter, level: LevelFilter) -> Logger {
    let mut builder = Builder::new();
    builder.filter_level(level).target(Target::Stderr);
    formatter.install(&mut builder).build()
}

/// Handler appending to `path`, creating it when missing
pub fn file_handler(formatter: StyledFormatter, level: LevelFilter, path: &Path) -> Result<Logger> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok(pipe_handler(formatter, level, Box::new(file)))
}

/// Handler writing to an arbitrary sink
pub fn pipe_handler(
    formatter: StyledFormatter,
    level: LevelFilter,
    sink: Box<dyn Write + Send + 'static>,
) -> Logger {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .target(Target::Pipe(sink))
        .write_style(WriteStyle::Never);
    formatter.install(&mut builder).build()
}

/// Root logger dispatching to every attached handler
#[derive(Default)]
pub struct StyledLogger {
    handlers: Vec<Logger>,
}

impl StyledLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, handler: Logger) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Most verbose level any handler accepts
    pub fn filter(&self) -> LevelFilter {
        self.handlers
            .iter()
            .map(Logger::filter)
            .max()
            .unwrap_or(LevelFilter::Off)
    }

    /// Make this the process-wide logger
    pub fn install(self) -> Result<()> {
        let max_level = self.filter();
        log::set_boxed_logger(Box::new(self)).context("A global logger is already installed")?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for StyledLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.handlers.iter().any(|h| h.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for handler in &self.handlers {
            handler.log(record);
        }
    }

    fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::completion::testing::ScriptedCompletion;
    use crate::features::completion::CompletionService;
    use crate::features::formatter::{FormatStyle, LogFormat};
    use crate::features::personas::Styler;
    use log::Level;
    use std::io;
    use std::sync::{Arc, Mutex, OnceLock};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn formatter(service: Arc<ScriptedCompletion>) -> StyledFormatter {
        StyledFormatter::new(
            Styler::new("Taiga from Toradora", service),
            LogFormat::new("%(name)s - %(levelname)s - %(message)s", None, FormatStyle::Percent)
                .unwrap(),
        )
    }

    fn log_message(logger: &StyledLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(level)
                .target("demo")
                .build(),
        );
    }

    #[test]
    fn test_one_call_per_handler() {
        let service = Arc::new(ScriptedCompletion::replying("Baka! It crashed!"));
        let first = SharedBuf::default();
        let second = SharedBuf::default();
        let logger = StyledLogger::new()
            .with_handler(pipe_handler(
                formatter(service.clone()),
                LevelFilter::Info,
                Box::new(first.clone()),
            ))
            .with_handler(pipe_handler(
                formatter(service.clone()),
                LevelFilter::Info,
                Box::new(second.clone()),
            ));

        log_message(&logger, Level::Warn, "The program has crashed");

        assert_eq!(service.calls(), 2);
        assert_eq!(first.contents(), "demo - WARN - Baka! It crashed!\n");
        assert_eq!(second.contents(), "demo - WARN - Baka! It crashed!\n");
    }

    #[test]
    fn test_records_below_level_are_not_styled() {
        let service = Arc::new(ScriptedCompletion::replying("styled"));
        let sink = SharedBuf::default();
        let logger = StyledLogger::new().with_handler(pipe_handler(
            formatter(service.clone()),
            LevelFilter::Info,
            Box::new(sink.clone()),
        ));

        log_message(&logger, Level::Debug, "noisy detail");

        assert_eq!(service.calls(), 0);
        assert!(sink.contents().is_empty());
        assert_eq!(logger.filter(), LevelFilter::Info);
    }

    #[test]
    fn test_failed_styling_writes_nothing() {
        let service = Arc::new(ScriptedCompletion::failing());
        let sink = SharedBuf::default();
        let logger = StyledLogger::new().with_handler(pipe_handler(
            formatter(service.clone()),
            LevelFilter::Info,
            Box::new(sink.clone()),
        ));

        log_message(&logger, Level::Error, "lost");

        assert_eq!(service.calls(), 1);
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn test_file_handler_appends() {
        let path = std::env::temp_dir().join(format!("persona-log-{}.out", uuid::Uuid::new_v4()));
        std::fs::write(&path, "earlier line\n").unwrap();
        let service = Arc::new(ScriptedCompletion::replying("styled"));

        let logger = StyledLogger::new().with_handler(
            file_handler(formatter(service), LevelFilter::Info, &path).unwrap(),
        );
        log_message(&logger, Level::Info, "hello");
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(contents, "earlier line\ndemo - INFO - styled\n");
    }

    /// Logs a debug record through the root logger from inside every call
    struct LoggingCompletion {
        logger: OnceLock<Arc<StyledLogger>>,
        calls: Mutex<usize>,
    }

    impl CompletionService for LoggingCompletion {
        fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            *self.calls.lock().unwrap() += 1;
            if let Some(logger) = self.logger.get() {
                logger.log(
                    &Record::builder()
                        .args(format_args!("starting new connection"))
                        .level(Level::Debug)
                        .target("reqwest::connect")
                        .build(),
                );
            }
            Ok("Baka!".to_string())
        }
    }

    #[test]
    fn test_http_debug_output_does_not_trigger_more_calls() {
        let service = Arc::new(LoggingCompletion {
            logger: OnceLock::new(),
            calls: Mutex::new(0),
        });
        let sink = SharedBuf::default();
        let logger = Arc::new(StyledLogger::new().with_handler(pipe_handler(
            StyledFormatter::new(
                Styler::new("Taiga from Toradora", service.clone()),
                LogFormat::new("%(name)s - %(message)s", None, FormatStyle::Percent).unwrap(),
            ),
            LevelFilter::Debug,
            Box::new(sink.clone()),
        )));
        assert!(service.logger.set(logger.clone()).is_ok());

        log_message(&logger, Level::Info, "user logged in");

        assert_eq!(*service.calls.lock().unwrap(), 1);
        assert_eq!(
            sink.contents(),
            "reqwest::connect - starting new connection\ndemo - Baka!\n"
        );
    }

    #[test]
    fn test_empty_logger_is_off() {
        let logger = StyledLogger::new();
        assert_eq!(logger.filter(), LevelFilter::Off);
        assert_eq!(logger.handler_count(), 0);
    }
}
