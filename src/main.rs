//! Efecto CLI - offline stereo effects processing
//!
//! Runs a WAV file through the full effect chain in host-sized blocks,
//! exactly as a real-time callback would drive it.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use efecto::engine::{export_wav, import_wav, ExportFormat};
use efecto::params::{parameter_specs, ParamStore, ParameterSnapshot, Slope};
use efecto::StereoProcessor;

#[derive(Parser)]
#[command(name = "efecto", version, about = "Stereo effects processor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the effect chain
    Process {
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Gain in dB (-32 to +6)
        #[arg(long)]
        gain: Option<f32>,
        /// Dry/wet mix in percent (0 to 100)
        #[arg(long)]
        dry_wet: Option<f32>,
        /// Reverb amount in percent (0 to 100)
        #[arg(long)]
        reverb: Option<f32>,
        /// Low-cut frequency in Hz (20 to 20000)
        #[arg(long)]
        low_cut: Option<f32>,
        /// High-cut frequency in Hz (20 to 20000)
        #[arg(long)]
        high_cut: Option<f32>,
        /// Low-cut slope in dB/octave (12, 24, or 36)
        #[arg(long)]
        low_cut_slope: Option<u32>,
        /// High-cut slope in dB/octave (12, 24, or 36)
        #[arg(long)]
        high_cut_slope: Option<u32>,
        /// Load parameters from a JSON settings file (flags override)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Processing block size in samples
        #[arg(long, default_value_t = 512)]
        block_size: usize,
        /// Output bit depth (16, 24, or 32)
        #[arg(long, default_value_t = 24)]
        bit_depth: u16,
    },
    /// Print the host-facing parameter definitions as JSON
    Params,
}

fn parse_slope(db_per_octave: u32) -> anyhow::Result<Slope> {
    match db_per_octave {
        12 => Ok(Slope::Db12),
        24 => Ok(Slope::Db24),
        36 => Ok(Slope::Db36),
        other => bail!("invalid slope {} (expected 12, 24, or 36)", other),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process {
            input,
            output,
            gain,
            dry_wet,
            reverb,
            low_cut,
            high_cut,
            low_cut_slope,
            high_cut_slope,
            settings,
            block_size,
            bit_depth,
        } => {
            if block_size == 0 {
                bail!("block size must be positive");
            }

            let base = match settings {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading settings {}", path.display()))?;
                    serde_json::from_str::<ParameterSnapshot>(&json)
                        .with_context(|| format!("parsing settings {}", path.display()))?
                }
                None => ParameterSnapshot::default(),
            };

            let store = ParamStore::from_snapshot(&base);
            if let Some(db) = gain {
                store.set_gain_db(db);
            }
            if let Some(percent) = dry_wet {
                store.set_dry_wet_percent(percent);
            }
            if let Some(percent) = reverb {
                store.set_reverb_percent(percent);
            }
            if let Some(hz) = low_cut {
                store.set_low_cut_freq_hz(hz);
            }
            if let Some(hz) = high_cut {
                store.set_high_cut_freq_hz(hz);
            }
            if let Some(slope) = low_cut_slope {
                store.set_low_cut_slope(parse_slope(slope)?);
            }
            if let Some(slope) = high_cut_slope {
                store.set_high_cut_slope(parse_slope(slope)?);
            }

            let mut buffer =
                import_wav(&input).with_context(|| format!("importing {}", input.display()))?;

            let mut processor = StereoProcessor::new();
            processor.prepare(f64::from(buffer.sample_rate()), block_size);

            let (left, right) = buffer.channels_mut();
            for (left_block, right_block) in left
                .chunks_mut(block_size)
                .zip(right.chunks_mut(block_size))
            {
                // One snapshot per block, the same contract a host
                // callback honors
                let snapshot = store.snapshot();
                processor.process_block(left_block, right_block, &snapshot);
            }

            info!(
                rms_left_db = buffer.rms_db(0),
                rms_right_db = buffer.rms_db(1),
                peak_left_db = buffer.peak_db(0),
                peak_right_db = buffer.peak_db(1),
                "processing complete"
            );

            export_wav(&output, &buffer, ExportFormat { bit_depth })
                .with_context(|| format!("exporting {}", output.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
        Commands::Params => {
            let specs = parameter_specs();
            println!("{}", serde_json::to_string_pretty(&specs)?);
            Ok(())
        }
    }
}
