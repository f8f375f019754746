use regex::Regex;
use std::sync::LazyLock;

static HEX_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[a-fA-F0-9]{2}").expect("valid hex pair pattern"));

/// Converts an ASS `&HAABBGGRR` (or `&HBBGGRR`) colour into `RRGGBB[AA]` hex.
///
/// ASS treats an alpha of `00` as "no transparency set", so it comes out as
/// fully opaque `FF` instead of invisible.
pub fn abgr_to_rgba(color: &str) -> String {
    // The `&H` prefix never forms a pair: `H` is not a hex digit.
    let mut parts: Vec<&str> = HEX_PAIR.find_iter(color).map(|m| m.as_str()).collect();
    parts.reverse();

    if parts.len() == 4 && parts[3] == "00" {
        parts[3] = "FF";
    }

    parts.concat()
}

/// Perceived brightness above 155 (of 255) counts as light.
pub fn is_light(color: &str) -> bool {
    let hex = color.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .map(u32::from)
            .unwrap_or(0)
    };
    // Weights scaled by 1000 to stay in integers.
    let brightness = channel(0) * 299 + channel(2) * 587 + channel(4) * 114;
    brightness > 155_000
}
