//! Converts Advanced SubStation Alpha scripts to SubRip and WebVTT, and
//! moves cues between SubRip and WebVTT.

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod model;
pub mod pipeline;
pub mod timeline;

pub use convert::{convert_ass, convert_srt_to_vtt, convert_vtt_to_srt};
pub use error::{ConvertError, Result};
pub use model::{ConversionOptions, SourceFormat, TargetFormat};
