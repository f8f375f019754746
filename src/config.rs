use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::model::ConversionOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: Logging,
    pub conversion: ConversionOptions,
    pub formats: Formats,
}

impl Config {
    pub fn load(path_opt: Option<&Path>) -> Result<Self> {
        let default_path = Path::new("config.toml");
        let path = if let Some(p) = path_opt {
            Some(p)
        } else if default_path.exists() {
            Some(default_path)
        } else {
            None
        };

        let mut cfg = Config::default();

        if let Some(path) = path {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed reading config file: {}", path.display()))?;
            cfg = Self::from_toml(&raw)
                .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        }

        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml_pretty(&self) -> Result<String> {
        let s = toml::to_string_pretty(self).context("failed serializing config as TOML")?;
        Ok(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
    pub debug_cue_samples: usize,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            debug_cue_samples: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Formats {
    pub srt: WrapCfg,
    pub vtt: WrapCfg,
}

/// Output line wrapping for one format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapCfg {
    /// Maximum columns per cue text line; 0 keeps lines as converted.
    pub wrap_width: usize,
}

pub fn init_tracing(logging: &Logging, cli_override_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = cli_override_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let is_json = logging.format.eq_ignore_ascii_case("json");

    // Logs go to stderr so `--stdout` output stays clean.
    if is_json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .event_format(fmt::format().json())
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .pretty()
            .init();
    }

    tracing::info!(
        level = level,
        format = logging.format.as_str(),
        "logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.conversion, ConversionOptions::default());
        assert_eq!(cfg.conversion.min_duration_ms, 300);
        assert_eq!(cfg.formats.srt.wrap_width, 0);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = Config::from_toml(
            "[conversion]\nmin_duration_ms = 0\nforce_contrast_outline = false\n\n[formats.vtt]\nwrap_width = 40\n",
        )
        .unwrap();
        assert_eq!(cfg.conversion.min_duration_ms, 0);
        assert!(!cfg.conversion.force_contrast_outline);
        assert!(cfg.conversion.strip_control_codes);
        assert_eq!(cfg.formats.vtt.wrap_width, 40);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = Config::default().to_toml_pretty().unwrap();
        assert!(text.contains("[conversion]"));
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.conversion, ConversionOptions::default());
    }
}
