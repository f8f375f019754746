//! Handling of ASS override blocks (`{\b1}`, `{\p1}...{\p0}`, ...) inside
//! dialogue text.

use crate::{
    formats::style::{GeneratedStyle, StyleFieldSet, StyleSource, StyleTranslator},
    model::{ConversionOptions, TargetFormat},
};

/// Override code names understood when a line carries a single leading
/// block. Matching picks the longest name that prefixes a code.
const INLINE_CODE_NAMES: &[&str] = &[
    "iclip", "xbord", "ybord", "yshad", "xshad", "shad", "clip", "blur", "bord", "move", "pos",
    "fax", "fay", "frx", "fry", "frz", "fsp", "fscx", "fscy", "fs", "fn", "fe", "be", "1c", "2c",
    "3c", "4c", "c", "i", "b", "u", "s",
];

/// Markup toggles converted to tags, in processing order.
const TOGGLE_TAGS: [char; 3] = ['b', 'i', 'u'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    /// Contents of a `{...}` block, braces excluded.
    Block(&'a str),
    Open(char),
    Close(char),
}

/// Dialogue text after code processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedLine {
    pub text: String,
    /// CSS from a leading override block (WebVTT only), possibly empty.
    pub inline_style: GeneratedStyle,
}

#[derive(Debug, Clone, Copy)]
pub struct CodeProcessor<'a> {
    options: &'a ConversionOptions,
    target: TargetFormat,
    translator: StyleTranslator,
}

impl<'a> CodeProcessor<'a> {
    pub fn new(
        options: &'a ConversionOptions,
        target: TargetFormat,
        translator: StyleTranslator,
    ) -> Self {
        Self {
            options,
            target,
            translator,
        }
    }

    /// Returns `None` when nothing visible is left of the line.
    pub fn process(&self, raw: &str) -> Option<ProcessedLine> {
        let raw = raw.trim();
        let mut line = ProcessedLine::default();

        let body = if self.options.strip_control_codes {
            let segments = split_segments(raw);

            if self.target == TargetFormat::Vtt {
                if let Some(block) = sole_leading_block(&segments, raw) {
                    line.inline_style = self
                        .translator
                        .translate(&inline_fields(block), StyleSource::Inline);
                }
            }

            let segments = if self.options.convert_codes_to_tags {
                convert_toggles(segments)
            } else {
                segments
            };
            render(strip_drawings(segments))
        } else {
            raw.to_string()
        };

        line.text = replace_escapes(&body);

        if visible_text(&line.text).trim().is_empty() {
            return None;
        }
        Some(line)
    }
}

fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(open) = rest.find('{') else {
            segments.push(Segment::Text(rest));
            break;
        };
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            // An unmatched brace is plain text.
            segments.push(Segment::Text(rest));
            break;
        };
        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }
        segments.push(Segment::Block(&rest[open + 1..close]));
        rest = &rest[close + 1..];
    }

    segments
}

/// The block of a line shaped `{codes}text` with no other brace after it.
fn sole_leading_block<'a>(segments: &[Segment<'a>], raw: &str) -> Option<&'a str> {
    match segments {
        [Segment::Block(block), Segment::Text(rest)]
            if raw.starts_with('{') && !block.contains('{') && !rest.contains('{') =>
        {
            Some(*block)
        }
        _ => None,
    }
}

fn codes(block: &str) -> impl Iterator<Item = &str> {
    // Text before the first backslash is not a code.
    block.split('\\').skip(1)
}

fn match_inline_code(code: &str) -> Option<(&'static str, &str)> {
    INLINE_CODE_NAMES
        .iter()
        .filter(|name| code.starts_with(**name))
        .max_by_key(|name| name.len())
        .map(|name| (*name, &code[name.len()..]))
}

fn inline_fields(block: &str) -> StyleFieldSet<'_> {
    let mut set = StyleFieldSet::new();
    for code in codes(block) {
        match match_inline_code(code) {
            Some((name, value)) => set.push(name, value),
            None => tracing::trace!(code, "dropping unrecognised override code"),
        }
    }
    set
}

/// Numeric argument of `\<name><digits>` codes in a block; the last one wins.
fn numeric_code(block: &str, name: char) -> Option<u32> {
    codes(block)
        .filter_map(|code| {
            let digits = code.strip_prefix(name)?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        })
        .last()
}

/// Wraps spans between `\X1` and `\X0` toggles in `<X>`/`</X>`. Tags opened
/// and never closed are closed at the end, innermost first.
fn convert_toggles(segments: Vec<Segment<'_>>) -> Vec<Segment<'_>> {
    let mut segments = segments;
    let mut unclosed = Vec::new();

    for tag in TOGGLE_TAGS {
        let mut out = Vec::with_capacity(segments.len() + 2);
        let mut open = false;

        for seg in segments {
            let toggle = match &seg {
                Segment::Block(block) => numeric_code(block, tag),
                _ => None,
            };
            match toggle {
                Some(v) if v != 0 && !open => {
                    out.push(Segment::Open(tag));
                    out.push(seg);
                    open = true;
                }
                Some(0) if open => {
                    out.push(seg);
                    out.push(Segment::Close(tag));
                    open = false;
                }
                _ => out.push(seg),
            }
        }

        if open {
            unclosed.push(tag);
        }
        segments = out;
    }

    segments.extend(unclosed.into_iter().rev().map(Segment::Close));
    segments
}

/// Drops text between a `\p<n>` (n > 0) block and the next `\p0` block, or
/// through the end of the line when drawing mode is never switched off.
fn strip_drawings(segments: Vec<Segment<'_>>) -> Vec<Segment<'_>> {
    let mut drawing = false;
    segments
        .into_iter()
        .filter(|seg| match seg {
            Segment::Block(block) => {
                match numeric_code(block, 'p') {
                    Some(0) => drawing = false,
                    Some(_) => drawing = true,
                    None => {}
                }
                true
            }
            Segment::Text(_) => !drawing,
            Segment::Open(_) | Segment::Close(_) => true,
        })
        .collect()
}

/// Concatenates text and markup; remaining blocks are dropped.
fn render(segments: Vec<Segment<'_>>) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::Text(t) => out.push_str(t),
            Segment::Open(tag) => {
                out.push('<');
                out.push(tag);
                out.push('>');
            }
            Segment::Close(tag) => {
                out.push_str("</");
                out.push(tag);
                out.push('>');
            }
            Segment::Block(_) => {}
        }
    }
    out
}

fn replace_escapes(text: &str) -> String {
    text.replace("\\h", "\u{a0}")
        .replace("\\n", " ")
        .replace("\\N", "\r\n")
}

/// Text with `<b>`, `<i>`, `<u>` markup removed.
fn visible_text(text: &str) -> String {
    let mut out = text.to_string();
    for tag in TOGGLE_TAGS {
        out = out
            .replace(&format!("<{tag}>"), "")
            .replace(&format!("</{tag}>"), "");
    }
    out
}
