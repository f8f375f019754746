use serde::{Deserialize, Serialize};

/// Output subtitle format of a conversion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Srt,
    Vtt,
}

impl TargetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Srt => "srt",
            TargetFormat::Vtt => "vtt",
        }
    }
}

/// Input subtitle format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Ass,
    Srt,
    Vtt,
}

impl SourceFormat {
    /// File extensions recognised for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SourceFormat::Ass => &["ass", "ssa"],
            SourceFormat::Srt => &["srt"],
            SourceFormat::Vtt => &["vtt"],
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        [SourceFormat::Ass, SourceFormat::Srt, SourceFormat::Vtt]
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Target picked when none is requested.
    pub fn default_target(self) -> TargetFormat {
        match self {
            SourceFormat::Ass | SourceFormat::Vtt => TargetFormat::Srt,
            SourceFormat::Srt => TargetFormat::Vtt,
        }
    }
}

/// Knobs of the ASS conversion engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Remove ASS override blocks from dialogue text.
    pub strip_control_codes: bool,
    /// Turn `\b`, `\i`, `\u` toggles into `<b>`, `<i>`, `<u>` tags. Only
    /// meaningful when `strip_control_codes` is set.
    pub convert_codes_to_tags: bool,
    /// Cues lasting this long or less are dropped to avoid flicker from
    /// animated ASS lines.
    pub min_duration_ms: u32,
    /// WebVTT only: always add a contrasting text-shadow outline.
    pub force_contrast_outline: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            strip_control_codes: true,
            convert_codes_to_tags: true,
            min_duration_ms: 300,
            force_contrast_outline: true,
        }
    }
}

/// One parsed `Dialogue:` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueInterval {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Start rendered for the target format.
    pub start_str: String,
    pub end_str: String,
    pub text: String,
    pub style_name: String,
    /// Declarations generated from a leading override block, or empty.
    pub inline_style_css: String,
}

impl DialogueInterval {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// 1-based, gapless.
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub start: String,
    pub end: String,
    pub text: String,
    pub voice: Option<String>,
    /// Per-cue CSS declarations, keyed off `::cue(#x<index>)` in WebVTT.
    pub inline_style: Option<String>,
}

impl Cue {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Header-level material gathered while scanning a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    /// Raw `[Script Info]` lines.
    pub metadata: Vec<String>,
    /// Rendered `::cue(v[voice=...])` rules, one per `Style:` row.
    pub voice_styles: Vec<String>,
    pub has_styles_section: bool,
}

/// The reconciled, emit-ready result of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub cues: Vec<Cue>,
    pub meta: Meta,
}

impl Transcript {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self {
            cues,
            meta: Meta::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.cues.last().map(|c| c.end_ms).unwrap_or(0)
    }
}
