//! OFDM Transmit Generator
//!
//! Maps a bit stream onto each selected constellation, runs the OFDM
//! transmit chain and writes the resulting samples to disk.

mod config;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use interfaces::artifact::{ArtifactWriter, Manifest};
use phy::Transmitter;

use crate::config::TxGenConfig;

/// OFDM transmit chain generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Modulation scheme (bpsk, pi2-bpsk, qpsk, 64qam, all); overrides the file
    #[arg(short, long)]
    scheme: Option<String>,

    /// Text to repeat as the bit source
    #[arg(long)]
    text: Option<String>,

    /// Use seeded random bits instead of text
    #[arg(long)]
    random: bool,

    /// Seed for the random bit source
    #[arg(long)]
    seed: Option<u64>,

    /// Artifact output directory
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Skip writing artifacts
    #[arg(long)]
    no_artifacts: bool,
}

impl Args {
    /// Flags take precedence over file values
    fn apply(&self, config: &mut TxGenConfig) {
        if let Some(scheme) = &self.scheme {
            config.ofdm.scheme = Some(scheme.clone());
        }
        if let Some(text) = &self.text {
            config.source.text = text.clone();
            config.source.random = false;
        }
        if self.random {
            config.source.random = true;
        }
        if let Some(seed) = self.seed {
            config.source.seed = seed;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if self.no_artifacts {
            config.output.write_artifacts = false;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("Starting OFDM transmit generator");

    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            TxGenConfig::from_toml_file(path)?
        }
        None => TxGenConfig::default(),
    };
    args.apply(&mut config);

    let schemes = config.schemes()?;
    let first = *schemes
        .first()
        .ok_or_else(|| anyhow!("No modulation scheme selected"))?;
    let transmit_config = config.transmit_config(first)?;
    let bits = config.bit_source()?;

    info!("OFDM configuration:");
    info!("  Transform size: {}", transmit_config.fft_size);
    info!("  Cyclic prefix: {}", transmit_config.prefix_length);
    info!("  Normalization: {:?}", transmit_config.normalization);
    info!("  Sample rate: {} MHz", transmit_config.sample_rate() / 1e6);
    info!(
        "  Bit source: {} ({} bits)",
        if config.source.random { "random" } else { "text" },
        bits.len()
    );

    let transmitter = Transmitter::new(transmit_config.clone())?;

    let writer = if config.output.write_artifacts {
        Some(ArtifactWriter::new(&config.output.directory)?)
    } else {
        warn!("Artifact output disabled");
        None
    };

    let mut manifest = Manifest::new(&transmit_config, bits.len());
    if let Some(writer) = &writer {
        let path = writer.write_bits("bitstream", &bits)?;
        manifest.bits_file = path.file_name().map(|n| n.to_string_lossy().into_owned());
    }

    for scheme in schemes {
        let transmission = transmitter.transmit_with(&bits, scheme)?;

        if let Some(pair) = transmission.buffer().pair(0) {
            info!(
                "  {} symbol boundary at sample {} ({:.3} us), prefix regions {:?}",
                scheme,
                pair.boundary,
                pair.boundary as f64 * transmit_config.timing_unit() * 1e6,
                pair.prefix_regions
            );
        }

        if let Some(writer) = &writer {
            manifest.entries.push(writer.write_transmission(&transmission)?);
        }
    }

    if let Some(writer) = &writer {
        writer.write_manifest(&manifest)?;
        info!("Artifacts written to {}", writer.directory().display());
    }

    info!("Done");
    Ok(())
}
