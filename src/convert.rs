//! Entry points of the conversion engine. Each call is a pure function of
//! its input text; no I/O happens here.

use crate::{
    error::Result,
    formats::{ass, srt, vtt},
    model::{ConversionOptions, SourceFormat, TargetFormat, Transcript},
    timeline,
};

/// Parses an ASS script and reconciles its dialogue into emit-ready cues.
pub fn ass_transcript(
    source: &str,
    target: TargetFormat,
    options: &ConversionOptions,
) -> Result<Transcript> {
    let doc = ass::parse_ass(source, target, options)?;
    let parsed = doc.intervals.len();
    let cues = timeline::reconcile(doc.intervals, u64::from(options.min_duration_ms));
    tracing::debug!(parsed, emitted = cues.len(), "reconciled timeline");

    Ok(Transcript {
        cues,
        meta: doc.meta,
    })
}

/// Reads any supported source into cues timed for `target`.
pub fn transcript_from(
    source: &str,
    from: SourceFormat,
    target: TargetFormat,
    options: &ConversionOptions,
) -> Result<Transcript> {
    match from {
        SourceFormat::Ass => ass_transcript(source, target, options),
        SourceFormat::Srt => Ok(Transcript::new(srt::read_srt(source, target)?)),
        SourceFormat::Vtt => Ok(Transcript::new(vtt::read_vtt(source, target)?)),
    }
}

/// Renders a transcript. Cues that came from ASS carry the WebVTT line
/// setting; passthrough cues carry none.
pub fn render(
    t: &Transcript,
    from: SourceFormat,
    target: TargetFormat,
    wrap_width: usize,
) -> String {
    match target {
        TargetFormat::Srt => srt::write_srt(t, wrap_width),
        TargetFormat::Vtt => {
            let settings = (from == SourceFormat::Ass).then_some(vtt::ASS_CUE_SETTINGS);
            vtt::write_vtt(t, settings, wrap_width)
        }
    }
}

/// Converts `source` from any supported format to `target`.
pub fn convert(
    source: &str,
    from: SourceFormat,
    target: TargetFormat,
    options: &ConversionOptions,
) -> Result<String> {
    let t = transcript_from(source, from, target, options)?;
    Ok(render(&t, from, target, 0))
}

/// Converts an ASS/SSA script to SRT or WebVTT.
pub fn convert_ass(
    source: &str,
    target: TargetFormat,
    options: &ConversionOptions,
) -> Result<String> {
    convert(source, SourceFormat::Ass, target, options)
}

pub fn convert_srt_to_vtt(source: &str) -> Result<String> {
    convert(
        source,
        SourceFormat::Srt,
        TargetFormat::Vtt,
        &ConversionOptions::default(),
    )
}

pub fn convert_vtt_to_srt(source: &str) -> Result<String> {
    convert(
        source,
        SourceFormat::Vtt,
        TargetFormat::Srt,
        &ConversionOptions::default(),
    )
}
