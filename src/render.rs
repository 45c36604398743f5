//! Attribute rendering: a single `key=value` run, or an indented block
//! when the run would be too long.

use serde::Serializer as _;
use serde_json::ser::PrettyFormatter;
use std::fmt::Write as _;

use crate::record::{AttrValue, Attributes};

/// Inline length above which attributes switch to block layout.
pub const DEFAULT_INLINE_THRESHOLD: usize = 42;

/// Indentation added per nesting depth in block layout.
pub const BLOCK_INDENT: &[u8] = b"  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// `key=value key2=value2`, to follow the message on the same line.
    Inline(String),
    /// Pretty-printed JSON object, on the lines after the message.
    Block(String),
}

impl Rendered {
    pub fn as_str(&self) -> &str {
        match self {
            Rendered::Inline(s) | Rendered::Block(s) => s,
        }
    }
}

/// Render `attrs` for the console.
///
/// Returns `None` when there is nothing to show. The inline form is built
/// first and kept unless it is longer than `threshold` characters.
pub fn render(attrs: &Attributes, threshold: usize, show_empty: bool) -> Option<Rendered> {
    if attrs.is_empty() {
        return show_empty.then(|| Rendered::Inline("{}".to_string()));
    }

    let inline = inline(attrs);
    if inline.chars().count() <= threshold {
        return Some(Rendered::Inline(inline));
    }
    match block(attrs) {
        Ok(text) => Some(Rendered::Block(text)),
        Err(_) => Some(Rendered::Inline(inline)),
    }
}

/// Space separated `key=value` pairs in insertion order.
pub fn inline(attrs: &Attributes) -> String {
    let mut out = String::new();
    write_inline_pairs(&mut out, attrs);
    out
}

fn write_inline_pairs(out: &mut String, attrs: &Attributes) {
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_text(out, key);
        out.push('=');
        write_inline_value(out, value);
    }
}

fn write_inline_value(out: &mut String, value: &AttrValue) {
    // Writing into a String cannot fail.
    let _ = match value {
        AttrValue::Str(s) => {
            write_text(out, s);
            Ok(())
        }
        AttrValue::Int(v) => write!(out, "{v}"),
        AttrValue::Uint(v) => write!(out, "{v}"),
        AttrValue::Float(v) => write!(out, "{v}"),
        AttrValue::Bool(v) => write!(out, "{v}"),
        AttrValue::Opaque(v) => write!(out, "{v:?}"),
        AttrValue::Map(entries) => {
            out.push('{');
            write_inline_pairs(out, entries);
            out.write_char('}')
        }
        AttrValue::Seq(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_inline_value(out, item);
            }
            out.write_char(']')
        }
    };
}

/// Keys and string values, quoted when they would break the `k=v` run.
fn write_text(out: &mut String, s: &str) {
    if needs_quotes(s) {
        let _ = write!(out, "{s:?}");
    } else {
        out.push_str(s);
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '=' || c == '"')
}

/// Multi-line layout: the attributes as a JSON object indented by
/// [`BLOCK_INDENT`] per level.
pub fn block(attrs: &Attributes) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(BLOCK_INDENT));
    serializer.collect_map(attrs)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
