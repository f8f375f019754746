pub mod ass;
pub mod codes;
pub mod color;
pub mod srt;
pub mod style;
pub mod time;
pub mod vtt;

use textwrap::wrap;

/// Trims trailing whitespace and ends a non-empty document with one CRLF.
fn finish(out: String) -> String {
    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\r\n")
    }
}

/// Re-wraps each line of `text` to `width` columns; 0 leaves it alone.
fn wrap_lines(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    text.split("\r\n")
        .flat_map(|line| wrap(line, width))
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Cue text with CRLF line breaks.
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}
