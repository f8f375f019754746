use crate::model::TargetFormat;

pub fn format_srt_timestamp(ms: u64) -> String {
    format_timestamp(ms, ',')
}

pub fn format_vtt_timestamp(ms: u64) -> String {
    format_timestamp(ms, '.')
}

pub fn format_for(ms: u64, target: TargetFormat) -> String {
    match target {
        TargetFormat::Srt => format_srt_timestamp(ms),
        TargetFormat::Vtt => format_vtt_timestamp(ms),
    }
}

fn format_timestamp(ms: u64, ms_sep: char) -> String {
    let total_seconds = ms / 1000;
    let milli = ms % 1000;

    let sec = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let min = total_minutes % 60;
    let hour = total_minutes / 60;

    format!("{hour:02}:{min:02}:{sec:02}{ms_sep}{milli:03}")
}

/// Parses an ASS `H:MM:SS.CC` timestamp into milliseconds.
///
/// The fractional part counts centiseconds and may be absent.
pub fn parse_time_to_ms(time: &str) -> Option<u64> {
    let t = time.trim();
    let mut parts = t.split(':');
    let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let (sec, centi) = match s.split_once('.') {
        Some((a, b)) => (a, Some(b)),
        None => (s, None),
    };

    let hours: u64 = h.trim().parse().ok()?;
    let minutes: u64 = m.trim().parse().ok()?;
    let seconds: u64 = sec.trim().parse().ok()?;
    let centis: u64 = match centi {
        Some(c) => c.trim().parse().ok()?,
        None => 0,
    };

    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes.checked_mul(60_000)?)?
        .checked_add(seconds.checked_mul(1000)?)?
        .checked_add(centis.checked_mul(10)?)
}

pub fn moment_to_ms(m: &aspasia::Moment) -> u64 {
    let h = m.hours();
    let min = m.minutes();
    let s = m.seconds();
    let ms = m.ms();
    let total = (((h * 60 + min) * 60 + s) * 1000 + ms) as i64;
    total.max(0) as u64
}

/// Re-renders an ASS timestamp in the target format's notation.
pub fn format_time(time: &str, target: TargetFormat) -> Option<String> {
    parse_time_to_ms(time).map(|ms| format_for(ms, target))
}
