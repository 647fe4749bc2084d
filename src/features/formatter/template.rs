//! Log line templates
//!
//! Three placeholder syntaxes are understood: `%(name)s` (with `-` and width,
//! e.g. `%(levelname)-8s`), `{name}` (with `<`/`>` and width, e.g.
//! `{levelname:<8}`) and `$name` / `${name}`. Templates are parsed once and
//! rejected up front when they reference unknown fields.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Chars;

/// Placeholder syntax of a log format string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    /// `%(message)s`
    #[default]
    #[serde(alias = "%")]
    Percent,
    /// `{message}`
    #[serde(alias = "{")]
    Brace,
    /// `$message` or `${message}`
    #[serde(alias = "$")]
    Dollar,
}

/// Record attribute a placeholder can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Message,
    Asctime,
    Name,
    Levelname,
    Levelno,
    Pathname,
    Filename,
    Module,
    Lineno,
    Created,
    Msecs,
    RelativeCreated,
    Thread,
    ThreadName,
    Process,
}

impl Field {
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "message" => Field::Message,
            "asctime" => Field::Asctime,
            "name" => Field::Name,
            "levelname" => Field::Levelname,
            "levelno" => Field::Levelno,
            "pathname" => Field::Pathname,
            "filename" => Field::Filename,
            "module" => Field::Module,
            "lineno" => Field::Lineno,
            "created" => Field::Created,
            "msecs" => Field::Msecs,
            "relativeCreated" => Field::RelativeCreated,
            "thread" => Field::Thread,
            "threadName" => Field::ThreadName,
            "process" => Field::Process,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        field: Field,
        width: Option<usize>,
        left_align: bool,
    },
}

/// A parsed format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            segments: vec![Segment::Field {
                field: Field::Message,
                width: None,
                left_align: false,
            }],
        }
    }
}

impl Template {
    pub fn parse(format: &str, style: FormatStyle) -> Result<Self> {
        let segments = match style {
            FormatStyle::Percent => parse_percent(format)?,
            FormatStyle::Brace => parse_brace(format)?,
            FormatStyle::Dollar => parse_dollar(format)?,
        };
        Ok(Self { segments })
    }

    pub fn uses(&self, wanted: Field) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Field { field, .. } if *field == wanted))
    }

    /// Render with `lookup` supplying each field's text
    pub fn render(&self, lookup: impl Fn(Field) -> String) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field {
                    field,
                    width,
                    left_align,
                } => {
                    let value = lookup(*field);
                    match *width {
                        Some(w) if *left_align => out.push_str(&format!("{value:<w$}")),
                        Some(w) => out.push_str(&format!("{value:>w$}")),
                        None => out.push_str(&value),
                    }
                }
            }
        }
        out
    }
}

fn field_named(name: &str) -> Result<Field> {
    match Field::from_name(name) {
        Some(field) => Ok(field),
        None => bail!("Unknown log format field: {name}"),
    }
}

fn push_literal(segments: &mut Vec<Segment>, ch: char) {
    if let Some(Segment::Literal(text)) = segments.last_mut() {
        text.push(ch);
    } else {
        segments.push(Segment::Literal(ch.to_string()));
    }
}

fn read_width(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

fn parse_percent(format: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            push_literal(&mut segments, ch);
            continue;
        }
        match chars.next() {
            Some('%') => push_literal(&mut segments, '%'),
            Some('(') => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(')') => break,
                        Some(c) => name.push(c),
                        None => bail!("Unterminated placeholder in log format: {format}"),
                    }
                }
                let left_align = chars.next_if_eq(&'-').is_some();
                let width = read_width(&mut chars);
                // precision is accepted and ignored
                if chars.next_if_eq(&'.').is_some() {
                    read_width(&mut chars);
                }
                match chars.next() {
                    Some(c) if c.is_ascii_alphabetic() => {}
                    _ => bail!("Missing conversion type for %({name}) in log format"),
                }
                segments.push(Segment::Field {
                    field: field_named(&name)?,
                    width,
                    left_align,
                });
            }
            _ => bail!("Log format uses '%' without a named field: {format}"),
        }
    }
    Ok(segments)
}

fn parse_brace(format: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.next_if_eq(&'{').is_some() => push_literal(&mut segments, '{'),
            '}' if chars.next_if_eq(&'}').is_some() => push_literal(&mut segments, '}'),
            '}' => bail!("Single '}}' in log format: {format}"),
            '{' => {
                let mut name = String::new();
                let mut spec: Option<String> = None;
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(':') if spec.is_none() => spec = Some(String::new()),
                        Some(c) => match spec.as_mut() {
                            Some(s) => s.push(c),
                            None => name.push(c),
                        },
                        None => bail!("Unterminated placeholder in log format: {format}"),
                    }
                }
                let (width, left_align) = match spec {
                    Some(spec) => parse_brace_spec(&spec)?,
                    None => (None, true),
                };
                segments.push(Segment::Field {
                    field: field_named(&name)?,
                    width,
                    left_align,
                });
            }
            _ => push_literal(&mut segments, ch),
        }
    }
    Ok(segments)
}

fn parse_brace_spec(spec: &str) -> Result<(Option<usize>, bool)> {
    let mut chars = spec.chars().peekable();
    let left_align = match chars.peek() {
        Some('>') => {
            chars.next();
            false
        }
        Some('<') => {
            chars.next();
            true
        }
        _ => true,
    };
    let width = read_width(&mut chars);
    if chars.next().is_some() {
        bail!("Unsupported format spec in log format: {spec}");
    }
    Ok((width, left_align))
}

fn parse_dollar(format: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            push_literal(&mut segments, ch);
            continue;
        }
        let name = if chars.next_if_eq(&'$').is_some() {
            push_literal(&mut segments, '$');
            continue;
        } else if chars.next_if_eq(&'{').is_some() {
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => bail!("Unterminated placeholder in log format: {format}"),
                }
            }
            name
        } else {
            let mut name = String::new();
            while let Some(c) = chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
                name.push(c);
            }
            if name.is_empty() {
                bail!("Invalid '$' placeholder in log format: {format}");
            }
            name
        };
        segments.push(Segment::Field {
            field: field_named(&name)?,
            width: None,
            left_align: false,
        });
    }
    Ok(segments)
}
