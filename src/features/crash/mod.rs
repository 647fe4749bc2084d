//! # Feature: Crash Reports
//!
//! Restyles uncaught failures. Two entry points cover Rust's two ways of
//! failing: [`run_main`] is an explicit error boundary around a
//! `Result`-returning entry point, and [`panic_hook`] builds a hook for
//! `std::panic::set_hook`. Both write only the styled summary to stdout.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Boundary call site stands in for a missing backtrace
//! - 1.1.0: Error boundary for `Result`-returning mains
//! - 1.0.0: Initial release with panic hook

pub mod frames;

pub use frames::{frames_from_backtrace, parse_backtrace, Frame};

use frames::read_source_line;

use crate::features::personas::{PromptBuilder, Styler, Task};
use anyhow::Result;
use std::any::type_name;
use std::backtrace::Backtrace;
use std::io::{self, Write};
use std::panic::{Location, PanicHookInfo};
use std::process::ExitCode;

/// Kind, value and traceback of one uncaught failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: String,
    pub value: String,
    /// Outermost first
    pub frames: Vec<Frame>,
}

impl FailureReport {
    pub fn new(kind: &str, value: &str, frames: Vec<Frame>) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.to_string(),
            frames,
        }
    }

    /// Report for an error returned from an entry point
    ///
    /// `kind` is the error's type name; frames come from the backtrace anyhow
    /// captured, which is empty unless `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE` enabled capture.
    pub fn from_error<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let kind = type_name::<E>();
        let error: anyhow::Error = error.into();
        Self::new(
            kind,
            &format!("{error:#}"),
            frames_from_backtrace(error.backtrace()),
        )
    }

    /// Use `location` as the only frame when no backtrace was captured
    pub fn with_call_site(mut self, location: &Location<'_>) -> Self {
        if self.frames.is_empty() {
            self.frames.push(Frame {
                file: location.file().to_string(),
                line: location.line(),
                function: "<entry point>".to_string(),
                source: read_source_line(location.file(), location.line()),
            });
        }
        self
    }

    /// Report for a panic; `backtrace` should be force-captured inside the hook
    pub fn from_panic(info: &PanicHookInfo<'_>, backtrace: &Backtrace) -> Self {
        let thread = std::thread::current();
        let kind = format!("panic in thread '{}'", thread.name().unwrap_or("<unnamed>"));

        let payload = info.payload();
        let value = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Box<dyn Any>".to_string());

        let mut frames = frames_from_backtrace(backtrace);
        if frames.is_empty() {
            if let Some(location) = info.location() {
                frames.push(Frame::new(location.file(), location.line(), "<panic>", None));
            }
        }

        Self::new(&kind, &value, frames)
    }

    /// Unstyled report: kind, value, then two lines per frame
    pub fn details(&self) -> String {
        let mut text = format!(
            "exception: {}\nexception value: {}\ntraceback:\n",
            self.kind, self.value
        );
        for frame in &self.frames {
            text.push_str(&format!(
                "File '{}', line {}, in {}:\n",
                frame.file, frame.line, frame.function
            ));
            text.push_str(&format!(
                "    {}\n",
                frame.source.as_deref().unwrap_or("(source unavailable)")
            ));
        }
        text
    }

    pub fn prompt(&self, character: &str) -> String {
        PromptBuilder::new(character)
            .with_task(Task::Exception)
            .with_payload(&self.details())
            .build()
    }
}

impl Styler {
    /// Write the styled summary of `report` (and nothing else) to `out`
    pub fn report_failure<W: Write + ?Sized>(&self, report: &FailureReport, out: &mut W) -> Result<()> {
        let styled = self.complete(&report.prompt(self.character()))?;
        writeln!(out, "{styled}")?;
        Ok(())
    }
}

/// Styled report on stdout, falling back to the plain report on stderr
fn report_to_stdout(styler: &Styler, report: &FailureReport) {
    if let Err(e) = styler.report_failure(report, &mut io::stdout()) {
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "{}", report.details());
        let _ = writeln!(
            stderr,
            "\nWhile styling the report above, another error occurred:\n{e:#}"
        );
    }
}

/// Run `main`; on error print its styled report and return `None`
#[track_caller]
pub fn guard<T, E, F>(styler: &Styler, main: F) -> Option<T>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: Into<anyhow::Error>,
{
    let call_site = Location::caller();
    match main() {
        Ok(value) => Some(value),
        Err(e) => {
            let report = FailureReport::from_error(e).with_call_site(call_site);
            report_to_stdout(styler, &report);
            None
        }
    }
}

/// Error boundary for a program's entry point
///
/// ```ignore
/// fn main() -> ExitCode {
///     let Ok(styler) = persona_log::setup(SetupOptions::default()) else {
///         return ExitCode::FAILURE;
///     };
///     persona_log::run_main(&styler, app)
/// }
/// ```
#[track_caller]
pub fn run_main<T, E, F>(styler: &Styler, main: F) -> ExitCode
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: Into<anyhow::Error>,
{
    match guard(styler, main) {
        Some(_) => ExitCode::SUCCESS,
        None => ExitCode::FAILURE,
    }
}

/// Hook restyling panics, for `std::panic::set_hook`
pub fn panic_hook(styler: Styler) -> Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static> {
    Box::new(move |info| {
        let backtrace = Backtrace::force_capture();
        report_to_stdout(&styler, &FailureReport::from_panic(info, &backtrace));
    })
}

/// Replace the process-wide panic hook with [`panic_hook`]
pub fn install_panic_hook(styler: Styler) {
    std::panic::set_hook(panic_hook(styler));
}
