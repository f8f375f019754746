use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::model::{ConversionOptions, SourceFormat, TargetFormat};

#[derive(Debug, Parser)]
#[command(name = "assconv")]
#[command(about = "Convert ASS/SSA subtitles to SRT or WebVTT, and between SRT and WebVTT.")]
pub struct Args {
    /// Path to config TOML (defaults to ./config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a file, a directory of files, or stdin
    Convert(ConvertCmd),
    /// Print the effective default config as TOML and exit
    PrintDefaultConfig,
}

#[derive(Debug, Default, Parser)]
pub struct ConvertCmd {
    /// Input file or directory path, or '-' for stdin
    pub input: String,

    /// Output file path, or output directory when converting a directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Target format (defaults to srt for ass/vtt input, vtt for srt input)
    #[arg(long, value_enum)]
    pub to: Option<Target>,

    /// Force input format (otherwise inferred from extension; stdin defaults to ass)
    #[arg(long, value_enum)]
    pub from: Option<Source>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Allow overwriting output files
    #[arg(long)]
    pub overwrite: bool,

    /// Drop cues lasting this many milliseconds or less
    #[arg(long)]
    pub min_duration_ms: Option<u32>,

    /// Leave ASS override blocks in the text
    #[arg(long)]
    pub keep_control_codes: bool,

    /// Strip bold/italic/underline codes instead of converting them to tags
    #[arg(long)]
    pub no_tags: bool,

    /// Do not force a contrasting outline in WebVTT styles
    #[arg(long)]
    pub no_contrast_outline: bool,
}

impl ConvertCmd {
    /// Config options with command-line overrides applied.
    pub fn conversion_options(&self, base: &ConversionOptions) -> ConversionOptions {
        let mut options = base.clone();
        if let Some(ms) = self.min_duration_ms {
            options.min_duration_ms = ms;
        }
        if self.keep_control_codes {
            options.strip_control_codes = false;
        }
        if self.no_tags {
            options.convert_codes_to_tags = false;
        }
        if self.no_contrast_outline {
            options.force_contrast_outline = false;
        }
        options
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Source {
    Ass,
    Srt,
    Vtt,
}

impl From<Source> for SourceFormat {
    fn from(s: Source) -> Self {
        match s {
            Source::Ass => SourceFormat::Ass,
            Source::Srt => SourceFormat::Srt,
            Source::Vtt => SourceFormat::Vtt,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Target {
    Srt,
    Vtt,
}

impl From<Target> for TargetFormat {
    fn from(t: Target) -> Self {
        match t {
            Target::Srt => TargetFormat::Srt,
            Target::Vtt => TargetFormat::Vtt,
        }
    }
}
