use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    cli::ConvertCmd,
    config::Config,
    convert,
    model::{ConversionOptions, SourceFormat, TargetFormat, Transcript},
};

pub fn run_convert(cmd: ConvertCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("convert", input = cmd.input.as_str(), to = ?cmd.to);
    let _g = span.enter();

    let options = cmd.conversion_options(&cfg.conversion);
    tracing::debug!(?options, "conversion options");

    if cmd.input != "-" && Path::new(&cmd.input).is_dir() {
        return run_batch(&cmd, Path::new(&cmd.input), &options, cfg);
    }

    let input_format = cmd
        .from
        .map(SourceFormat::from)
        .unwrap_or_else(|| infer_format_from_path_or_dash(&cmd.input));
    let target = resolve_target(&cmd, input_format);
    tracing::info!(?input_format, ?target, "formats selected");

    let raw = read_input_to_string(&cmd.input)?;
    tracing::info!(bytes = raw.len(), "read input");

    let rendered = convert_text(&raw, input_format, target, &options, cfg)
        .with_context(|| format!("failed converting {} from {:?}", cmd.input, input_format))?;

    if cmd.stdout {
        print!("{rendered}");
        tracing::info!(mode = "stdout", "wrote output");
        return Ok(());
    }

    let out_path = derive_output_path(&cmd, target)?;
    write_output(&out_path, &rendered, cmd.overwrite)?;
    tracing::info!(path = %out_path.display(), "wrote output file");

    Ok(())
}

fn resolve_target(cmd: &ConvertCmd, from: SourceFormat) -> TargetFormat {
    cmd.to
        .map(TargetFormat::from)
        .unwrap_or_else(|| from.default_target())
}

/// Converts every file in `dir` (not recursing) whose extension matches the
/// source format.
fn run_batch(
    cmd: &ConvertCmd,
    dir: &Path,
    options: &ConversionOptions,
    cfg: &Config,
) -> Result<()> {
    if cmd.stdout {
        return Err(anyhow!("--stdout cannot be used with a directory input"));
    }

    let input_format = cmd.from.map(SourceFormat::from).unwrap_or(SourceFormat::Ass);
    let target = resolve_target(cmd, input_format);
    let out_dir = cmd
        .output
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.to_path_buf());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed creating output directory: {}", out_dir.display()))?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed listing directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && infer_format(p) == Some(input_format))
        .collect();
    inputs.sort();
    tracing::info!(files = inputs.len(), ?input_format, ?target, "batch conversion");

    let mut failed = 0usize;
    for path in &inputs {
        let result = fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))
            .and_then(|raw| {
                convert_text(&raw, input_format, target, options, cfg)
                    .with_context(|| format!("failed converting {}", path.display()))
            })
            .and_then(|rendered| {
                let out_path = out_dir.join(output_file_name(path, target)?);
                write_output(&out_path, &rendered, cmd.overwrite)?;
                tracing::info!(path = %out_path.display(), "wrote output file");
                Ok(())
            });

        if let Err(err) = result {
            tracing::error!(error = %format!("{err:#}"), "skipping file");
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{failed} of {} files failed to convert", inputs.len()));
    }
    Ok(())
}

fn convert_text(
    raw: &str,
    from: SourceFormat,
    to: TargetFormat,
    options: &ConversionOptions,
    cfg: &Config,
) -> Result<String> {
    let transcript = convert::transcript_from(raw, from, to, options)?;
    log_transcript_summary(&transcript, cfg);

    let wrap_width = match to {
        TargetFormat::Srt => cfg.formats.srt.wrap_width,
        TargetFormat::Vtt => cfg.formats.vtt.wrap_width,
    };
    Ok(convert::render(&transcript, from, to, wrap_width))
}

fn infer_format(path: &Path) -> Option<SourceFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(SourceFormat::from_extension)
}

fn infer_format_from_path_or_dash(input: &str) -> SourceFormat {
    if input == "-" {
        return SourceFormat::Ass;
    }
    infer_format(Path::new(input)).unwrap_or(SourceFormat::Ass)
}

fn read_input_to_string(input: &str) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed reading {input}"))
    }
}

fn log_transcript_summary(t: &Transcript, cfg: &Config) {
    tracing::info!(
        cues = t.cues.len(),
        duration_ms = t.duration_ms(),
        voice_styles = t.meta.voice_styles.len(),
        "transcript summary"
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        let n = cfg.logging.debug_cue_samples.min(t.cues.len());
        for c in t.cues.iter().take(n) {
            tracing::debug!(
                index = c.index,
                start_ms = c.start_ms,
                end_ms = c.end_ms,
                chars = c.text.chars().count(),
                styled = c.inline_style.is_some(),
                "cue sample"
            );
        }
    }
}

fn output_file_name(input: &Path, target: TargetFormat) -> Result<String> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad input filename: {}", input.display()))?;
    Ok(format!("{stem}.{}", target.extension()))
}

fn derive_output_path(cmd: &ConvertCmd, target: TargetFormat) -> Result<PathBuf> {
    if let Some(o) = &cmd.output {
        return Ok(PathBuf::from(o));
    }

    if cmd.input == "-" {
        return Err(anyhow!(
            "output path required when input is stdin and --stdout is not set"
        ));
    }

    let p = Path::new(&cmd.input);
    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(output_file_name(p, target)?))
}

fn write_output(path: &Path, data: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(anyhow!(
            "refusing to overwrite existing file (pass --overwrite): {}",
            path.display()
        ));
    }
    fs::write(path, data).with_context(|| format!("failed writing {}", path.display()))?;
    Ok(())
}
