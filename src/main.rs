use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use wavforge::config::{BitDepth, OutputConfig, PatternKind};
use wavforge::wav::{HEADER_LEN, PcmFormat, save_wav};

#[derive(Parser, Debug)]
#[command(name = "wavforge")]
#[command(about = "Generate PCM test-pattern WAV files")]
struct Args {
    /// Output WAV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Bit depth (e.g. "8", "16bit")
    #[arg(long)]
    bit_depth: Option<BitDepth>,

    /// Number of interleaved channels
    #[arg(long)]
    channels: Option<u16>,

    /// Total number of samples to synthesize
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Test pattern: alternating, constant, ramp
    #[arg(short, long, value_enum)]
    pattern: Option<PatternKind>,

    /// Low level for alternating/ramp patterns
    #[arg(long)]
    low: Option<u32>,

    /// High level for alternating/ramp patterns
    #[arg(long)]
    high: Option<u32>,

    /// Level for the constant pattern (defaults to the silence midpoint)
    #[arg(long)]
    level: Option<u32>,

    /// Write a JSON manifest next to the output file
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    format: Option<FormatSection>,
    pattern: Option<PatternSection>,
}

#[derive(Debug, Deserialize)]
struct FormatSection {
    sample_rate: Option<u32>,
    bit_depth: Option<String>,
    channels: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct PatternSection {
    kind: Option<String>,
    low: Option<u32>,
    high: Option<u32>,
    level: Option<u32>,
    samples: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    file: String,
    sample_rate: u32,
    bits_per_sample: u16,
    channels: u16,
    samples: usize,
    generated_at: String,
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn parse_pattern_kind(s: &str) -> Result<PatternKind> {
    match s.to_lowercase().as_str() {
        "alternating" => Ok(PatternKind::Alternating),
        "constant" => Ok(PatternKind::Constant),
        "ramp" => Ok(PatternKind::Ramp),
        other => anyhow::bail!("Unknown pattern kind: {}", other),
    }
}

/// Built-in defaults, overridden by the TOML file, overridden by CLI flags.
fn build_output_config(toml: &TomlConfig, args: &Args) -> Result<OutputConfig> {
    let mut config = OutputConfig::default();

    if let Some(ref format) = toml.format {
        if let Some(sample_rate) = format.sample_rate {
            config.format.sample_rate = sample_rate;
        }
        if let Some(ref bit_depth) = format.bit_depth {
            config.format.bit_depth = bit_depth
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid bit_depth in config file")?;
        }
        if let Some(channels) = format.channels {
            config.format.channels = channels;
        }
    }

    if let Some(ref pattern) = toml.pattern {
        if let Some(ref kind) = pattern.kind {
            config.pattern.kind = parse_pattern_kind(kind)?;
        }
        if let Some(low) = pattern.low {
            config.pattern.low = low;
        }
        if let Some(high) = pattern.high {
            config.pattern.high = high;
        }
        if let Some(level) = pattern.level {
            config.pattern.level = Some(level);
        }
        if let Some(samples) = pattern.samples {
            config.pattern.samples = samples;
        }
    }

    if let Some(ref output) = args.output {
        config.path = output.clone();
    }
    if let Some(sample_rate) = args.sample_rate {
        config.format.sample_rate = sample_rate;
    }
    if let Some(bit_depth) = args.bit_depth {
        config.format.bit_depth = bit_depth;
    }
    if let Some(channels) = args.channels {
        config.format.channels = channels;
    }
    if let Some(samples) = args.samples {
        config.pattern.samples = samples;
    }
    if let Some(pattern) = args.pattern {
        config.pattern.kind = pattern;
    }
    if let Some(low) = args.low {
        config.pattern.low = low;
    }
    if let Some(high) = args.high {
        config.pattern.high = high;
    }
    if let Some(level) = args.level {
        config.pattern.level = Some(level);
    }

    Ok(config)
}

fn write_manifest(config: &OutputConfig, format: &PcmFormat, samples: usize) -> Result<()> {
    let manifest = Manifest {
        file: config.path.display().to_string(),
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample(),
        channels: format.channels,
        samples,
        generated_at: iso8601_timestamp(),
    };

    let manifest_path = config.path.with_extension("json");
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
    eprintln!("Manifest written to: {}", manifest_path.display());
    Ok(())
}

fn iso8601_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let config = build_output_config(&toml_config, &args)?;
    let format = config.format.pcm();

    log::info!(
        "Synthesizing {} samples at {} Hz, {} channel(s), {}",
        config.pattern.samples,
        format.sample_rate,
        format.channels,
        config.format.bit_depth
    );

    let pattern = config.pattern.resolve(format.sample_width);
    let samples = pattern.generate(config.pattern.samples);

    save_wav(&config.path, &format, &samples)
        .with_context(|| format!("Failed to write {}", config.path.display()))?;

    println!(
        "Wrote {} ({} bytes)",
        config.path.display(),
        HEADER_LEN + samples.len() as u64 * format.sample_width as u64
    );

    if args.manifest {
        write_manifest(&config, &format, samples.len())?;
    }

    Ok(())
}
