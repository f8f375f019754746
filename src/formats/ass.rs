//! Section-by-section scan of an ASS/SSA script.

use crate::{
    error::{ConvertError, Result},
    formats::{
        codes::CodeProcessor,
        style::{StyleFieldSet, StyleSource, StyleTranslator},
        time::{format_for, parse_time_to_ms},
    },
    model::{ConversionOptions, DialogueInterval, Meta, TargetFormat},
};

const DEFAULT_VIDEO_HEIGHT: f64 = 1080.0;

/// Everything a conversion needs from one script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssDocument {
    pub meta: Meta,
    /// Dialogue rows in file order; rows that strip down to nothing are absent.
    pub intervals: Vec<DialogueInterval>,
    pub video_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    ScriptInfo,
    Styles,
    Events,
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        let lower = header.to_lowercase();
        if lower == "[script info]" {
            Section::ScriptInfo
        } else if lower.ends_with("styles]") {
            Section::Styles
        } else if lower == "[events]" {
            Section::Events
        } else {
            Section::Other
        }
    }

    fn name(self) -> &'static str {
        match self {
            Section::Preamble => "preamble",
            Section::ScriptInfo => "[Script Info]",
            Section::Styles => "[V4+ Styles]",
            Section::Events => "[Events]",
            Section::Other => "unknown section",
        }
    }
}

/// Column names of a `Format:` line, spaces removed.
fn format_columns(rest: &str) -> Vec<String> {
    rest.split(',').map(|c| c.replace(' ', "")).collect()
}

/// Positions of the event columns the converter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventColumns {
    start: usize,
    end: usize,
    text: usize,
    style: Option<usize>,
}

impl EventColumns {
    fn from_format(columns: &[String], line: usize) -> Result<Self> {
        let find = |name: &str| columns.iter().position(|c| c == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ConvertError::MissingColumn {
                line,
                column: name.to_string(),
            })
        };
        Ok(Self {
            start: require("Start")?,
            end: require("End")?,
            text: require("Text")?,
            style: find("Style"),
        })
    }

    /// Smallest row width that reaches every column.
    fn min_width(&self) -> usize {
        [self.start, self.end, self.text, self.style.unwrap_or(0)]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

struct Scanner<'a> {
    target: TargetFormat,
    options: &'a ConversionOptions,
    section: Section,
    style_columns: Option<Vec<String>>,
    event_columns: Option<EventColumns>,
    doc: AssDocument,
}

impl<'a> Scanner<'a> {
    fn translator(&self) -> StyleTranslator {
        StyleTranslator::new(self.doc.video_height, self.options.force_contrast_outline)
    }

    fn script_info_line(&mut self, line: &str) {
        if let Some(value) = line.strip_prefix("PlayResY") {
            let value = value.trim_start_matches(':').trim();
            match value.parse::<f64>() {
                Ok(h) if h > 0.0 => self.doc.video_height = h,
                _ => tracing::warn!(value, "ignoring unusable PlayResY"),
            }
        }
        self.doc.meta.metadata.push(line.to_string());
    }

    fn styles_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        if self.style_columns.is_none() {
            if let Some(rest) = line.strip_prefix("Format:") {
                self.style_columns = Some(format_columns(rest));
                return Ok(());
            }
        }

        let Some(rest) = line.strip_prefix("Style:") else {
            return Ok(());
        };
        let columns = self
            .style_columns
            .as_ref()
            .ok_or_else(|| ConvertError::MissingFormatHeader {
                line: line_no,
                section: Section::Styles.name().to_string(),
            })?;

        let values: Vec<&str> = rest.split(',').collect();
        let fields = StyleFieldSet::zip(columns, &values);
        let generated = self.translator().translate(&fields, StyleSource::Header);

        match generated.voice_rule() {
            Some(rule) if !generated.is_empty() => self.doc.meta.voice_styles.push(rule),
            _ => tracing::debug!(line = line_no, "style row produced no voice rule"),
        }
        Ok(())
    }

    fn events_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        if self.event_columns.is_none() {
            if let Some(rest) = line.strip_prefix("Format:") {
                let columns = format_columns(rest);
                self.event_columns = Some(EventColumns::from_format(&columns, line_no)?);
                return Ok(());
            }
        }

        let Some(rest) = line.strip_prefix("Dialogue:") else {
            return Ok(());
        };
        let cols = self
            .event_columns
            .ok_or_else(|| ConvertError::MissingFormatHeader {
                line: line_no,
                section: Section::Events.name().to_string(),
            })?;

        let parts: Vec<&str> = rest.split(',').collect();
        if parts.len() < cols.min_width() {
            return Err(ConvertError::TruncatedRow {
                line: line_no,
                expected: cols.min_width(),
                found: parts.len(),
            });
        }

        let timestamp = |idx: usize| {
            let value = parts[idx].trim();
            parse_time_to_ms(value).ok_or_else(|| ConvertError::MalformedTimestamp {
                line: line_no,
                value: value.to_string(),
            })
        };
        let start_ms = timestamp(cols.start)?;
        let end_ms = timestamp(cols.end)?;

        // Free text may itself contain commas.
        let text = parts[cols.text..].join(",");

        let processor = CodeProcessor::new(self.options, self.target, self.translator());
        let Some(processed) = processor.process(&text) else {
            tracing::debug!(line = line_no, "dialogue empty after stripping codes");
            return Ok(());
        };

        self.doc.intervals.push(DialogueInterval {
            start_ms,
            end_ms,
            start_str: format_for(start_ms, self.target),
            end_str: format_for(end_ms, self.target),
            text: processed.text,
            style_name: cols
                .style
                .map(|i| parts[i].trim().to_string())
                .unwrap_or_default(),
            inline_style_css: processed.inline_style.declarations,
        });
        Ok(())
    }
}

/// Scans `source` and collects dialogue rows plus, for WebVTT, the script
/// metadata and per-style CSS.
///
/// Scanning stops at the first section header after `[Events]`.
pub fn parse_ass(
    source: &str,
    target: TargetFormat,
    options: &ConversionOptions,
) -> Result<AssDocument> {
    let mut scanner = Scanner {
        target,
        options,
        section: Section::Preamble,
        style_columns: None,
        event_columns: None,
        doc: AssDocument {
            video_height: DEFAULT_VIDEO_HEIGHT,
            ..AssDocument::default()
        },
    };

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            if scanner.section == Section::Events {
                break;
            }
            scanner.section = Section::from_header(line);
            match scanner.section {
                Section::Styles => scanner.doc.meta.has_styles_section = true,
                Section::Other => tracing::debug!(line = line_no, header = line, "skipping section"),
                _ => {}
            }
            continue;
        }

        match (scanner.section, target) {
            (Section::Events, _) => scanner.events_line(line, line_no)?,
            (Section::ScriptInfo, TargetFormat::Vtt) => scanner.script_info_line(line),
            (Section::Styles, TargetFormat::Vtt) => scanner.styles_line(line, line_no)?,
            _ => {}
        }
    }

    tracing::debug!(
        intervals = scanner.doc.intervals.len(),
        voice_styles = scanner.doc.meta.voice_styles.len(),
        "scanned ASS script"
    );

    Ok(scanner.doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "\u{feff}[Script Info]\r
; comment\r
Title: Demo\r
PlayResY: 720\r
\r
[V4+ Styles]\r
Format: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, BackColour, BorderStyle, Outline, Shadow\r
Style: Default,Arial,36,&H00FFFFFF,&H00000000,&H00000000,1,2,0\r
\r
[Events]\r
Format: Layer, Style, Start, End, Name, Text\r
Dialogue: 0,Default,0:00:01.00,0:00:03.50,,Hello, world\r
Comment: 0,Default,0:00:02.00,0:00:03.00,,ignored\r
Dialogue: 0,Default,0:00:04.00,0:00:05.00,,{\\p1}m 0 0 l 10 10{\\p0}\r
Dialogue: 0,Sign,0:00:05.00,0:00:06.00,,{\\fs40}Sign text\r
\r
[Fonts]\r
Dialogue: 0,Default,0:00:09.00,0:00:10.00,,after events\r
";

    #[test]
    fn reads_columns_by_name() {
        let doc = parse_ass(SCRIPT, TargetFormat::Srt, &ConversionOptions::default()).unwrap();
        assert_eq!(doc.intervals.len(), 2);

        let first = &doc.intervals[0];
        assert_eq!(first.start_ms, 1000);
        assert_eq!(first.end_ms, 3500);
        assert_eq!(first.start_str, "00:00:01,000");
        assert_eq!(first.end_str, "00:00:03,500");
        assert_eq!(first.text, "Hello, world");
        assert_eq!(first.style_name, "Default");

        assert_eq!(doc.intervals[1].style_name, "Sign");
        assert_eq!(doc.intervals[1].text, "Sign text");
    }

    #[test]
    fn srt_skips_header_sections() {
        let doc = parse_ass(SCRIPT, TargetFormat::Srt, &ConversionOptions::default()).unwrap();
        assert!(doc.meta.metadata.is_empty());
        assert!(doc.meta.voice_styles.is_empty());
        assert!(doc.intervals[1].inline_style_css.is_empty());
    }

    #[test]
    fn vtt_collects_metadata_and_styles() {
        let doc = parse_ass(SCRIPT, TargetFormat::Vtt, &ConversionOptions::default()).unwrap();
        assert_eq!(doc.video_height, 720.0);
        assert_eq!(doc.meta.metadata, vec!["; comment", "Title: Demo", "PlayResY: 720"]);
        assert!(doc.meta.has_styles_section);
        assert_eq!(doc.meta.voice_styles.len(), 1);
        assert!(doc.meta.voice_styles[0].contains("font-size: clamp(14px, 1.8em, 20vmin);"));
        assert_eq!(doc.intervals[0].start_str, "00:00:01.000");
        assert_eq!(
            doc.intervals[1].inline_style_css,
            "font-size: 2em;\r\nfont-size: clamp(14px, 2em, 18vmin);\r\nbackground-color: transparent;\r\n"
        );
    }

    #[test]
    fn dialogue_before_format_is_fatal() {
        let src = "[Events]\nDialogue: 0,0:00:01.00,0:00:02.00,,x\n";
        let err = parse_ass(src, TargetFormat::Srt, &ConversionOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingFormatHeader {
                line: 2,
                section: "[Events]".to_string()
            }
        );
    }

    #[test]
    fn style_before_format_is_fatal_for_vtt_only() {
        let src = "[V4+ Styles]\nStyle: Default,Arial\n[Events]\n";
        let err = parse_ass(src, TargetFormat::Vtt, &ConversionOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingFormatHeader { line: 2, .. }));
        assert!(parse_ass(src, TargetFormat::Srt, &ConversionOptions::default()).is_ok());
    }

    #[test]
    fn format_without_text_column() {
        let src = "[Events]\nFormat: Layer, Start, End\n";
        let err = parse_ass(src, TargetFormat::Srt, &ConversionOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingColumn {
                line: 2,
                column: "Text".to_string()
            }
        );
    }

    #[test]
    fn bad_timestamp_names_line() {
        let src = "[Events]\nFormat: Start, End, Text\nDialogue: 0:00:01.00,soon,x\n";
        let err = parse_ass(src, TargetFormat::Srt, &ConversionOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MalformedTimestamp {
                line: 3,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn short_row_is_rejected() {
        let src = "[Events]\nFormat: Layer, Start, End, Style, Text\nDialogue: 0,0:00:01.00\n";
        let err = parse_ass(src, TargetFormat::Srt, &ConversionOptions::default()).unwrap_err();
        assert_eq!(
            err,
            ConvertError::TruncatedRow {
                line: 3,
                expected: 5,
                found: 2
            }
        );
    }

    #[test]
    fn no_events_section_is_empty() {
        let src = "[Script Info]\nTitle: nothing\n";
        let doc = parse_ass(src, TargetFormat::Srt, &ConversionOptions::default()).unwrap();
        assert!(doc.intervals.is_empty());
    }
}
