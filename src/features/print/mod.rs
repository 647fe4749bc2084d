//! # Feature: Styled Print
//!
//! Opt-in print façade. Arguments are rendered in their debug form, joined,
//! restyled through the bound character and written with a terminator.
//! The std `print!` family is never shadowed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release with separator/terminator options and `styled_print!`

use crate::features::personas::Styler;
use anyhow::Result;
use std::fmt::Debug;
use std::io::{self, Write};

/// Separator and terminator for [`Styler::print_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions<'a> {
    pub sep: &'a str,
    pub end: &'a str,
}

impl Default for PrintOptions<'_> {
    fn default() -> Self {
        Self { sep: " ", end: "\n" }
    }
}

/// Join the debug form of each argument with `sep`
pub fn render_args(args: &[&dyn Debug], sep: &str) -> String {
    args.iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>()
        .join(sep)
}

impl Styler {
    /// Restyle `args` and write them to stdout followed by a newline
    pub fn print(&self, args: &[&dyn Debug]) -> Result<()> {
        self.print_to(args, &PrintOptions::default(), &mut io::stdout())
    }

    /// Restyle `args` and write `styled + end` to `out` in one write
    ///
    /// One completion call per invocation. If styling fails nothing is written.
    pub fn print_to<W: Write + ?Sized>(
        &self,
        args: &[&dyn Debug],
        options: &PrintOptions<'_>,
        out: &mut W,
    ) -> Result<()> {
        let joined = render_args(args, options.sep);
        let styled = self.summarize(&joined)?;
        out.write_all(format!("{styled}{}", options.end).as_bytes())?;
        Ok(())
    }
}

/// Print through a [`Styler`]: `styled_print!(styler, "disk", vec![1, 2])?`
#[macro_export]
macro_rules! styled_print {
    ($styler:expr) => {
        $styler.print(&[])
    };
    ($styler:expr, $($arg:expr),+ $(,)?) => {
        $styler.print(&[$(&$arg as &dyn ::std::fmt::Debug),+])
    };
}
