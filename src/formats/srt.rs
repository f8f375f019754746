use aspasia::{SubRipSubtitle, Subtitle};

use crate::{
    error::{ConvertError, Result},
    formats::{
        finish, normalize_newlines,
        time::{format_for, moment_to_ms},
        wrap_lines,
    },
    model::{Cue, TargetFormat, Transcript},
};

/// Renders numbered SubRip blocks with CRLF line endings.
pub fn write_srt(t: &Transcript, wrap_width: usize) -> String {
    let mut out = String::new();

    for cue in &t.cues {
        out.push_str(&format!(
            "{}\r\n{} --> {}\r\n{}\r\n\r\n",
            cue.index,
            cue.start,
            cue.end,
            wrap_lines(&cue.text, wrap_width)
        ));
    }

    finish(out)
}

/// Reads a SubRip document into cues timed in the notation of `target`.
pub fn read_srt(raw: &str, target: TargetFormat) -> Result<Vec<Cue>> {
    let srt = raw
        .parse::<SubRipSubtitle>()
        .map_err(|e| ConvertError::Passthrough {
            format: "SRT",
            message: e.to_string(),
        })?;
    tracing::info!(events = srt.events().len(), "parsed SRT via aspasia");

    let cues = srt
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
