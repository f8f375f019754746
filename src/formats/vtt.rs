use aspasia::{Subtitle, WebVttSubtitle};

use crate::{
    error::{ConvertError, Result},
    formats::{
        finish, normalize_newlines,
        time::{format_for, moment_to_ms},
        wrap_lines,
    },
    model::{Cue, TargetFormat, Transcript},
};

/// Cue settings of cues converted from ASS.
pub const ASS_CUE_SETTINGS: &str = "line:90%";

/// Base rule every generated STYLE block starts with.
pub const DEFAULT_CUE_STYLE: &str = "::cue{color: white;\r\n\
background-color: transparent;\r\n\
font-size: 20px;\r\n\
white-space: normal;\r\n\
text-shadow: 0 0 1px black, 1px 1px 0 black;\r\n\
}\r\n";

/// Identifier of a cue, also used by `::cue(#x<index>)` selectors.
pub fn cue_id(index: u32) -> String {
    format!("x{index}")
}

fn style_block(t: &Transcript) -> Option<String> {
    let per_cue: String = t
        .cues
        .iter()
        .filter_map(|c| {
            let css = c.inline_style.as_deref()?;
            Some(format!("::cue(#{}) {{\r\n{css}}}\r\n", cue_id(c.index)))
        })
        .collect();

    if !t.meta.has_styles_section && per_cue.is_empty() {
        return None;
    }

    let mut block = String::from("STYLE\r\n");
    block.push_str(DEFAULT_CUE_STYLE);
    for rule in &t.meta.voice_styles {
        block.push_str(rule);
    }
    block.push_str(&per_cue);
    block.push_str("\r\n\r\n");
    Some(block)
}

/// Renders a WebVTT document: header, optional metadata NOTE, optional
/// STYLE block, then the cues.
pub fn write_vtt(t: &Transcript, cue_settings: Option<&str>, wrap_width: usize) -> String {
    let mut out = String::from("WEBVTT\r\n\r\n");

    if !t.meta.metadata.is_empty() {
        out.push_str("NOTE - metadata\r\n");
        out.push_str(&t.meta.metadata.join("\r\n"));
        out.push_str("\r\n\r\n");
    }

    if let Some(block) = style_block(t) {
        out.push_str(&block);
    }

    for cue in &t.cues {
        out.push_str(&cue_id(cue.index));
        out.push_str("\r\n");
        out.push_str(&format!("{} --> {}", cue.start, cue.end));
        if let Some(settings) = cue_settings {
            out.push(' ');
            out.push_str(settings);
        }
        out.push_str("\r\n");
        if let Some(voice) = &cue.voice {
            out.push_str(&format!("<v {voice}>"));
        }
        out.push_str(&wrap_lines(&cue.text, wrap_width));
        out.push_str("\r\n\r\n");
    }

    finish(out)
}

/// Reads a WebVTT document into cues timed in the notation of `target`.
pub fn read_vtt(raw: &str, target: TargetFormat) -> Result<Vec<Cue>> {
    let vtt = raw
        .parse::<WebVttSubtitle>()
        .map_err(|e| ConvertError::Passthrough {
            format: "WebVTT",
            message: e.to_string(),
        })?;
    tracing::info!(events = vtt.events().len(), "parsed VTT via aspasia");

    let cues = vtt
        .events()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let start_ms = moment_to_ms(&e.start);
            let end_ms = moment_to_ms(&e.end);
            Cue {
                index: u32::try_from(i + 1).unwrap_or(u32::MAX),
                start_ms,
                end_ms,
                start: format_for(start_ms, target),
                end: format_for(end_ms, target),
                text: normalize_newlines(&e.text),
                voice: None,
                inline_style: None,
            }
        })
        .collect();

    Ok(cues)
}
