//! Translation of ASS style attributes into WebVTT cue CSS.
//!
//! Both `Style:` rows from the styles section and the override codes of a
//! leading `{...}` block go through the same field table; the two
//! vocabularies differ only in naming (`PrimaryColour` vs `1c`).

use crate::formats::color::{abgr_to_rgba, is_light};

/// Where a field set came from. Some border rules only apply to one side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StyleSource {
    Header,
    Inline,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Effect {
    Voice,
    FontFamily,
    FontSize,
    TextColor,
    OutlineColor,
    BackColor,
    Bold,
    Italic,
    Underline,
    StrikeOut,
    Spacing,
    BorderStyle,
    Outline,
    Shadow,
    Blur,
    MarginLeft,
    MarginRight,
    MarginBottom,
    /// Recognised, but CSS has nothing equivalent for a cue.
    Unsupported,
}

const FIELD_EFFECTS: &[(&str, Effect)] = &[
    ("Name", Effect::Voice),
    ("Fontname", Effect::FontFamily),
    ("fn", Effect::FontFamily),
    ("Fontsize", Effect::FontSize),
    ("fs", Effect::FontSize),
    ("PrimaryColour", Effect::TextColor),
    ("PrimaryColor", Effect::TextColor),
    ("c", Effect::TextColor),
    ("1c", Effect::TextColor),
    ("OutlineColour", Effect::OutlineColor),
    ("OutlineColor", Effect::OutlineColor),
    ("3c", Effect::OutlineColor),
    ("BackColour", Effect::BackColor),
    ("BackColor", Effect::BackColor),
    ("4c", Effect::BackColor),
    ("Bold", Effect::Bold),
    ("b", Effect::Bold),
    ("Italic", Effect::Italic),
    ("i", Effect::Italic),
    ("Underline", Effect::Underline),
    ("u", Effect::Underline),
    ("StrikeOut", Effect::StrikeOut),
    ("Strikeout", Effect::StrikeOut),
    ("s", Effect::StrikeOut),
    ("Spacing", Effect::Spacing),
    ("fsp", Effect::Spacing),
    ("BorderStyle", Effect::BorderStyle),
    ("Outline", Effect::Outline),
    ("bord", Effect::Outline),
    ("Shadow", Effect::Shadow),
    ("shad", Effect::Shadow),
    ("be", Effect::Blur),
    ("blur", Effect::Blur),
    ("MarginL", Effect::MarginLeft),
    ("MarginR", Effect::MarginRight),
    ("MarginV", Effect::MarginBottom),
    ("Alignment", Effect::Unsupported),
    ("SecondaryColour", Effect::Unsupported),
    ("SecondaryColor", Effect::Unsupported),
    ("2c", Effect::Unsupported),
    ("ScaleX", Effect::Unsupported),
    ("ScaleY", Effect::Unsupported),
    ("Angle", Effect::Unsupported),
    ("Encoding", Effect::Unsupported),
    ("fscx", Effect::Unsupported),
    ("fscy", Effect::Unsupported),
    ("fax", Effect::Unsupported),
    ("fay", Effect::Unsupported),
    ("frx", Effect::Unsupported),
    ("fry", Effect::Unsupported),
    ("frz", Effect::Unsupported),
    ("fe", Effect::Unsupported),
    ("pos", Effect::Unsupported),
    ("move", Effect::Unsupported),
    ("clip", Effect::Unsupported),
    ("iclip", Effect::Unsupported),
    ("xbord", Effect::Unsupported),
    ("ybord", Effect::Unsupported),
    ("xshad", Effect::Unsupported),
    ("yshad", Effect::Unsupported),
];

fn effect_for(field: &str) -> Option<Effect> {
    FIELD_EFFECTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, effect)| *effect)
}

/// Ordered `(field, value)` pairs, built by zipping a Format column list
/// with a data row, or by collecting matched override codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleFieldSet<'a> {
    fields: Vec<(&'a str, &'a str)>,
}

impl<'a> StyleFieldSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs columns with values; surplus on either side is ignored.
    pub fn zip<S: AsRef<str>>(columns: &'a [S], values: &[&'a str]) -> Self {
        Self {
            fields: columns
                .iter()
                .map(|c| c.as_ref())
                .zip(values.iter().copied())
                .collect(),
        }
    }

    pub fn push(&mut self, field: &'a str, value: &'a str) {
        self.fields.push((field, value));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// CSS produced for one field set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedStyle {
    /// Style name from a `Name` column.
    pub voice: Option<String>,
    /// `property: value;` lines, CRLF-terminated.
    pub declarations: String,
}

impl GeneratedStyle {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Wraps the declarations into a rule for `selector`.
    pub fn render(&self, selector: &str) -> String {
        format!("{selector} {{\r\n{}}}\r\n", self.declarations)
    }

    /// `::cue(v[voice="..."])` rule, when the set named a voice.
    pub fn voice_rule(&self) -> Option<String> {
        let voice = self.voice.as_deref()?;
        Some(self.render(&format!("::cue(v[voice=\"{voice}\"])")))
    }
}

/// Border-related values collected during a pass and resolved once at the end.
#[derive(Debug, Default)]
struct BorderSettings {
    back_color: Option<String>,
    outline_color: Option<String>,
    style: Option<String>,
    outline: Option<f64>,
    shadow: Option<f64>,
    blur: Option<f64>,
}

fn positive(v: Option<f64>) -> bool {
    v.is_some_and(|v| v > 0.0)
}

#[derive(Debug, Clone, Copy)]
pub struct StyleTranslator {
    /// `PlayResY` of the script, used for responsive font sizing.
    pub video_height: f64,
    pub force_contrast_outline: bool,
}

impl StyleTranslator {
    pub fn new(video_height: f64, force_contrast_outline: bool) -> Self {
        Self {
            video_height,
            force_contrast_outline,
        }
    }

    pub fn translate(&self, fields: &StyleFieldSet<'_>, source: StyleSource) -> GeneratedStyle {
        let mut out = GeneratedStyle::default();
        let mut css = String::new();
        let mut border = BorderSettings::default();
        let mut text_color: Option<String> = None;
        let mut underline: Option<bool> = None;
        let mut strike: Option<bool> = None;
        let mut recognised = false;

        for &(field, raw) in &fields.fields {
            let Some(effect) = effect_for(field.trim()) else {
                continue;
            };
            recognised = true;
            let value = raw.trim();

            match effect {
                Effect::Voice => out.voice = Some(value.to_string()),
                Effect::FontFamily => css.push_str(&format!("font-family: \"{value}\";\r\n")),
                Effect::FontSize => self.push_font_size(&mut css, value),
                Effect::TextColor => {
                    if let Some(color) = css_color(value) {
                        css.push_str(&format!("color: {color};\r\n"));
                        text_color = Some(color);
                    }
                }
                Effect::OutlineColor => border.outline_color = css_color(value),
                Effect::BackColor => border.back_color = css_color(value),
                Effect::Bold => {
                    let weight = magnitude(value);
                    if weight == 1.0 {
                        css.push_str("font-weight: bold;\r\n");
                    } else if weight > 1.0 {
                        css.push_str(&format!("font-weight: {weight};\r\n"));
                    } else {
                        css.push_str("font-weight: normal;\r\n");
                    }
                }
                Effect::Italic => {
                    if magnitude(value) == 1.0 {
                        css.push_str("font-style: italic;\r\n");
                    } else {
                        css.push_str("font-style: normal;\r\n");
                    }
                }
                Effect::Underline => underline = Some(magnitude(value) == 1.0),
                Effect::StrikeOut => strike = Some(magnitude(value) == 1.0),
                Effect::Spacing => css.push_str(&format!("letter-spacing: {value}px;\r\n")),
                Effect::BorderStyle => border.style = Some(value.to_string()),
                Effect::Outline => border.outline = number(value),
                Effect::Shadow => border.shadow = number(value),
                Effect::Blur => border.blur = number(value),
                Effect::MarginLeft => css.push_str(&format!("margin-left: {value}px;\r\n")),
                Effect::MarginRight => css.push_str(&format!("margin-right: {value}px;\r\n")),
                Effect::MarginBottom => css.push_str(&format!("margin-bottom: {value}px;\r\n")),
                Effect::Unsupported => {}
            }
        }

        if !recognised {
            return out;
        }

        if let Some(decoration) = text_decoration(underline, strike) {
            css.push_str(&format!("text-decoration: {decoration};\r\n"));
        }

        self.resolve_border(&mut css, &border, text_color.as_deref(), source);

        out.declarations = css;
        out
    }

    fn push_font_size(&self, css: &mut String, value: &str) {
        let Some(size) = number(value).filter(|s| *s > 0.0) else {
            tracing::debug!(value, "ignoring non-positive font size");
            return;
        };
        let em = round2(size / 20.0);
        let vmin = round2(self.video_height / size);
        css.push_str(&format!("font-size: {em}em;\r\n"));
        css.push_str(&format!("font-size: clamp(14px, {em}em, {vmin}vmin);\r\n"));
    }

    fn resolve_border(
        &self,
        css: &mut String,
        border: &BorderSettings,
        text_color: Option<&str>,
        source: StyleSource,
    ) {
        let inline = source == StyleSource::Inline;
        let style = border.style.as_deref();

        if style == Some("1") || inline {
            let mut layers: Vec<String> = Vec::new();

            if positive(border.outline) {
                if let Some(oc) = &border.outline_color {
                    layers.push(format!("0 0 1px {oc}"));
                }
            }
            if positive(border.shadow) {
                if let Some(bc) = &border.back_color {
                    layers.push(format!("1px 1px 0 {bc}"));
                }
            }
            if positive(border.blur) {
                match &border.outline_color {
                    Some(oc) => layers.push(format!("0 0 5px {oc}")),
                    None if inline => layers.push("0 0 5px".to_string()),
                    None => {}
                }
            }

            if !layers.is_empty() {
                if !self.force_contrast_outline {
                    css.push_str(&format!("text-shadow: {};\r\n", layers.join(", ")));
                } else if let Some(tc) = text_color {
                    let mut all = contrast_layers(tc).to_vec();
                    all.extend(layers);
                    css.push_str(&format!("text-shadow: {};\r\n", all.join(", ")));
                }
            }
            css.push_str("background-color: transparent;\r\n");
        } else if style == Some("3") {
            let fill = if positive(border.outline) {
                border.outline_color.as_ref()
            } else if positive(border.shadow) {
                border.back_color.as_ref()
            } else {
                None
            };
            if let Some(color) = fill {
                css.push_str(&format!("background-color: {color};\r\n"));
            }
        } else {
            css.push_str("background-color: transparent;\r\n");
            if self.force_contrast_outline {
                if let Some(tc) = text_color {
                    css.push_str(&format!("text-shadow: {};\r\n", contrast_layers(tc).join(", ")));
                }
            }
        }
    }
}

/// Two outline layers opposite in tone to the text colour.
fn contrast_layers(text_color: &str) -> [String; 2] {
    let c = if is_light(text_color) { "black" } else { "white" };
    [format!("0 0 1px {c}"), format!("1px 1px 0 {c}")]
}

fn text_decoration(underline: Option<bool>, strike: Option<bool>) -> Option<&'static str> {
    match (underline, strike) {
        (Some(true), Some(true)) => Some("underline line-through"),
        (Some(true), _) => Some("underline"),
        (_, Some(true)) => Some("line-through"),
        (None, None) => None,
        _ => Some("none"),
    }
}

fn css_color(value: &str) -> Option<String> {
    let hex = abgr_to_rgba(value);
    if hex.is_empty() {
        None
    } else {
        Some(format!("#{hex}"))
    }
}

fn number(value: &str) -> Option<f64> {
    value.parse().ok()
}

/// Absolute numeric value, 0 when unparsable.
fn magnitude(value: &str) -> f64 {
    number(value).map(f64::abs).unwrap_or(0.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STYLE_FORMAT: [&str; 23] = [
        "Name",
        "Fontname",
        "Fontsize",
        "PrimaryColour",
        "SecondaryColour",
        "OutlineColour",
        "BackColour",
        "Bold",
        "Italic",
        "Underline",
        "StrikeOut",
        "ScaleX",
        "ScaleY",
        "Spacing",
        "Angle",
        "BorderStyle",
        "Outline",
        "Shadow",
        "Alignment",
        "MarginL",
        "MarginR",
        "MarginV",
        "Encoding",
    ];

    fn header(row: &str, force: bool) -> GeneratedStyle {
        let values: Vec<&str> = row.split(',').collect();
        let set = StyleFieldSet::zip(&STYLE_FORMAT, &values);
        StyleTranslator::new(1080.0, force).translate(&set, StyleSource::Header)
    }

    #[test]
    fn header_style_with_outline_border() {
        let style = header(
            "Default,Arial,54,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1",
            true,
        );
        assert_eq!(style.voice.as_deref(), Some("Default"));
        assert_eq!(
            style.declarations,
            "font-family: \"Arial\";\r\n\
             font-size: 2.7em;\r\n\
             font-size: clamp(14px, 2.7em, 20vmin);\r\n\
             color: #FFFFFFFF;\r\n\
             font-weight: bold;\r\n\
             font-style: normal;\r\n\
             letter-spacing: 0px;\r\n\
             margin-left: 10px;\r\n\
             margin-right: 10px;\r\n\
             margin-bottom: 10px;\r\n\
             text-decoration: none;\r\n\
             text-shadow: 0 0 1px black, 1px 1px 0 black, 0 0 1px #000000FF, 1px 1px 0 #000000FF;\r\n\
             background-color: transparent;\r\n"
        );
        assert!(style.voice_rule().unwrap().starts_with("::cue(v[voice=\"Default\"]) {\r\n"));
        assert!(style.voice_rule().unwrap().ends_with("}\r\n"));
    }

    #[test]
    fn opaque_box_uses_outline_colour_as_background() {
        let style = header(
            "Box,Arial,20,&H00FFFFFF,&H000000FF,&H80102030,&H00000000,0,0,0,0,100,100,0,0,3,1,0,2,0,0,0,1",
            true,
        );
        assert!(style.declarations.contains("background-color: #30201080;\r\n"));
        assert!(!style.declarations.contains("text-shadow"));
    }

    #[test]
    fn unspecified_border_style_forces_contrast_shadow() {
        let style = header(
            "Dark,Arial,20,&H00000000,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,0,0,0,2,0,0,0,1",
            true,
        );
        assert!(style.declarations.ends_with(
            "background-color: transparent;\r\ntext-shadow: 0 0 1px white, 1px 1px 0 white;\r\n"
        ));
    }

    #[test]
    fn contrast_shadow_is_optional() {
        let style = header(
            "Plain,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,2,0,0,0,1",
            false,
        );
        assert!(style.declarations.contains("text-shadow: 0 0 1px #000000FF;\r\n"));
    }

    #[test]
    fn underline_and_strikeout_combine() {
        let mut set = StyleFieldSet::new();
        set.push("u", "1");
        set.push("s", "1");
        let style = StyleTranslator::new(1080.0, true).translate(&set, StyleSource::Inline);
        assert!(style.declarations.contains("text-decoration: underline line-through;\r\n"));
    }

    #[test]
    fn inline_blur_without_colour_still_shadows() {
        let mut set = StyleFieldSet::new();
        set.push("c", "&H00FFFF&");
        set.push("blur", "3");
        let style = StyleTranslator::new(720.0, true).translate(&set, StyleSource::Inline);
        assert_eq!(
            style.declarations,
            "color: #FFFF00;\r\n\
             text-shadow: 0 0 1px black, 1px 1px 0 black, 0 0 5px;\r\n\
             background-color: transparent;\r\n"
        );
    }

    #[test]
    fn shadow_without_text_colour_is_skipped_under_contrast() {
        let mut set = StyleFieldSet::new();
        set.push("3c", "&H0000FF&");
        set.push("bord", "2");
        let style = StyleTranslator::new(720.0, true).translate(&set, StyleSource::Inline);
        assert_eq!(style.declarations, "background-color: transparent;\r\n");
    }

    #[test]
    fn numeric_bold_weight() {
        let mut set = StyleFieldSet::new();
        set.push("b", "700");
        let style = StyleTranslator::new(720.0, false).translate(&set, StyleSource::Inline);
        assert!(style.declarations.starts_with("font-weight: 700;\r\n"));
    }

    #[test]
    fn only_unknown_fields_yield_nothing() {
        let mut set = StyleFieldSet::new();
        set.push("an", "8");
        set.push("k", "20");
        let style = StyleTranslator::new(720.0, true).translate(&set, StyleSource::Inline);
        assert!(style.is_empty());
    }
}
