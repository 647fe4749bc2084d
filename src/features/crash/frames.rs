//! Stack frames recovered from `std::backtrace::Backtrace`
//!
//! std does not expose structured frames, so the rendered backtrace is parsed.
//! Frames come out outermost first, std internals and the reporting machinery
//! itself are dropped.

use regex::Regex;
use std::backtrace::{Backtrace, BacktraceStatus};

/// Path prefix of std sources in a rendered backtrace
const STD_SOURCE_PREFIX: &str = "/rustc/";

/// Function path prefixes never shown to the reader
const HIDDEN_FUNCTIONS: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "<alloc::",
    "<core::",
    "<std::",
    "persona_log::features::crash::",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: String,
    /// Trimmed source text of `line`, when the file is readable
    pub source: Option<String>,
}

impl Frame {
    pub fn new(file: &str, line: u32, function: &str, source: Option<&str>) -> Self {
        Self {
            file: file.to_string(),
            line,
            function: function.to_string(),
            source: source.map(String::from),
        }
    }
}

/// Frames of a captured backtrace; empty when capture was disabled
pub fn frames_from_backtrace(backtrace: &Backtrace) -> Vec<Frame> {
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    parse_backtrace(&backtrace.to_string())
}

/// Parse std's rendering (innermost first) into frames (outermost first)
pub fn parse_backtrace(text: &str) -> Vec<Frame> {
    let (Ok(frame_re), Ok(location_re)) = (
        Regex::new(r"^\s*\d+:\s+(.+?)\s*$"),
        Regex::new(r"^\s*at\s+(.+):(\d+):(\d+)\s*$"),
    ) else {
        return Vec::new();
    };

    let mut frames = Vec::new();
    let mut function: Option<String> = None;

    for line in text.lines() {
        if let Some(caps) = location_re.captures(line) {
            let Some(name) = function.take() else {
                continue;
            };
            let file = &caps[1];
            let line_no: u32 = caps[2].parse().unwrap_or(0);
            if file.starts_with(STD_SOURCE_PREFIX)
                || HIDDEN_FUNCTIONS.iter().any(|p| name.starts_with(p))
            {
                continue;
            }
            let source = read_source_line(file, line_no);
            frames.push(Frame {
                file: file.to_string(),
                line: line_no,
                function: strip_hash(&name),
                source,
            });
        } else if let Some(caps) = frame_re.captures(line) {
            function = Some(caps[1].to_string());
        }
    }

    frames.reverse();
    frames
}

/// Drop the `::h0123456789abcdef` suffix of legacy-mangled names
fn strip_hash(name: &str) -> String {
    match name.rsplit_once("::h") {
        Some((head, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            head.to_string()
        }
        _ => name.to_string(),
    }
}

pub(crate) fn read_source_line(file: &str, line: u32) -> Option<String> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    let contents = std::fs::read_to_string(file).ok()?;
    contents.lines().nth(index).map(|l| l.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/std/src/../../backtrace/src/backtrace/libunwind.rs:93:5
   1: persona_log::features::crash::panic_hook::{{closure}}
             at ./src/features/crash/mod.rs:150:29
   2: app::storage::flush::h0a1b2c3d4e5f6a7b
             at /home/dev/app/src/storage.rs:41:9
   3: app::run
             at /home/dev/app/src/main.rs:12:5
   4: core::ops::function::FnOnce::call_once
             at /rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/core/src/ops/function.rs:250:5
   5: app::main
             at /home/dev/app/src/main.rs:4:5
   6: __libc_start_main
   7: _start
";

    #[test]
    fn test_frames_outermost_first() {
        let frames = parse_backtrace(SAMPLE);
        let functions: Vec<&str> = frames.iter().map(|f| f.function.as_str()).collect();
        assert_eq!(functions, vec!["app::main", "app::run", "app::storage::flush"]);
        assert_eq!(frames[0].line, 4);
        assert_eq!(frames[2].file, "/home/dev/app/src/storage.rs");
        assert_eq!(frames[2].line, 41);
    }

    #[test]
    fn test_frames_without_location_are_skipped() {
        let frames = parse_backtrace("   0: __libc_start_main\n   1: _start\n");
        assert!(frames.is_empty());
    }

    #[test]
    fn test_unreadable_source_is_none() {
        let frames = parse_backtrace(SAMPLE);
        assert!(frames.iter().all(|f| f.source.is_none()));
    }

    #[test]
    fn test_source_line_read_from_disk() {
        let path = std::env::temp_dir().join(format!("persona-frames-{}.rs", uuid::Uuid::new_v4()));
        std::fs::write(&path, "fn main() {\n    explode();\n}\n").unwrap();
        let text = format!("   0: app::main\n             at {}:2:5\n", path.display());

        let frames = parse_backtrace(&text);
        std::fs::remove_file(&path).ok();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].source.as_deref(), Some("explode();"));
    }

    #[test]
    fn test_disabled_backtrace_has_no_frames() {
        assert!(frames_from_backtrace(&Backtrace::disabled()).is_empty());
    }

    #[test]
    fn test_strip_hash() {
        assert_eq!(strip_hash("app::run::h0a1b2c3d4e5f6a7b"), "app::run");
        assert_eq!(strip_hash("app::hello"), "app::hello");
    }
}
