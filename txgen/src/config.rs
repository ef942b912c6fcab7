//! TOML configuration for the transmit generator
//!
//! Every section and field is optional; missing values fall back to the
//! reference parameters (N = 4096, P = 2304, 60 kHz).

use anyhow::Result;
use common::types::{BitStream, ModulationScheme, SubcarrierSpacing};
use common::utils::{random_bits, repeat_to_length, slot_bit_length, text_to_bits, SYMBOLS_PER_SLOT};
use phy::config::{DEFAULT_FFT_SIZE, DEFAULT_PREFIX_LENGTH};
use phy::{FftNormalization, TransmitConfig, TruncationPolicy};
use serde::{Deserialize, Serialize};

/// Text used when no other bit source is configured
pub const DEFAULT_TEXT: &str = "WirelessCommunicationSystemsandSecurityJustinNgo";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TxGenConfig {
    /// OFDM numerology
    #[serde(default)]
    pub ofdm: OfdmConfig,
    /// Bit source
    #[serde(default)]
    pub source: SourceConfig,
    /// Artifact output
    #[serde(default)]
    pub output: OutputConfig,
}

/// OFDM configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OfdmConfig {
    /// Transform size N
    #[serde(default = "default_transform_size", alias = "fft_size")]
    pub transform_size: usize,
    /// Cyclic prefix length P
    #[serde(default = "default_prefix_length")]
    pub prefix_length: usize,
    /// Transform scaling convention
    #[serde(default)]
    pub normalization: FftNormalization,
    /// Handling of trailing bits that do not fill a symbol
    #[serde(default)]
    pub truncation: TruncationPolicy,
    /// Subcarrier spacing in kHz (15, 30, 60, 120, 240)
    #[serde(default = "default_scs_khz")]
    pub scs_khz: u32,
    /// Modulation scheme (bpsk, pi2-bpsk, qpsk, 64qam, all); all when unset
    #[serde(default, alias = "modulation_scheme")]
    pub scheme: Option<String>,
}

impl Default for OfdmConfig {
    fn default() -> Self {
        Self {
            transform_size: default_transform_size(),
            prefix_length: default_prefix_length(),
            normalization: FftNormalization::default(),
            truncation: TruncationPolicy::default(),
            scs_khz: default_scs_khz(),
            scheme: None,
        }
    }
}

fn default_transform_size() -> usize {
    DEFAULT_FFT_SIZE
}

fn default_prefix_length() -> usize {
    DEFAULT_PREFIX_LENGTH
}

fn default_scs_khz() -> u32 {
    SubcarrierSpacing::default().as_khz()
}

/// Bit source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Text repeated to fill one slot
    #[serde(default = "default_text")]
    pub text: String,
    /// OFDM symbols per slot
    #[serde(default = "default_symbols_per_slot")]
    pub symbols_per_slot: usize,
    /// Use seeded random bits instead of text
    #[serde(default)]
    pub random: bool,
    /// Seed for the random source
    #[serde(default)]
    pub seed: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            text: default_text(),
            symbols_per_slot: default_symbols_per_slot(),
            random: false,
            seed: 0,
        }
    }
}

fn default_text() -> String {
    DEFAULT_TEXT.to_string()
}

fn default_symbols_per_slot() -> usize {
    SYMBOLS_PER_SLOT
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Artifact directory
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Write sample files and manifest
    #[serde(default = "default_write_artifacts")]
    pub write_artifacts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            write_artifacts: default_write_artifacts(),
        }
    }
}

fn default_directory() -> String {
    "output".to_string()
}

fn default_write_artifacts() -> bool {
    true
}

impl TxGenConfig {
    /// Load configuration from TOML file
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TxGenConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Build the validated chain configuration for `scheme`
    pub fn transmit_config(&self, scheme: ModulationScheme) -> Result<TransmitConfig> {
        let config = TransmitConfig {
            fft_size: self.ofdm.transform_size,
            prefix_length: self.ofdm.prefix_length,
            modulation: scheme,
            normalization: self.ofdm.normalization,
            truncation: self.ofdm.truncation,
            subcarrier_spacing: SubcarrierSpacing::from_khz(self.ofdm.scs_khz)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Schemes to run, in order
    pub fn schemes(&self) -> Result<Vec<ModulationScheme>> {
        parse_schemes(self.ofdm.scheme.as_deref().unwrap_or("all"))
    }

    /// Bits in one slot of 64-QAM symbols, the densest scheme
    pub fn bit_length(&self) -> Result<usize> {
        let length = slot_bit_length(
            self.ofdm.transform_size,
            ModulationScheme::Qam64.bits_per_symbol(),
            self.source.symbols_per_slot,
        )?;
        Ok(length)
    }

    /// Produce the input bit stream
    pub fn bit_source(&self) -> Result<BitStream> {
        let length = self.bit_length()?;
        if self.source.random {
            return Ok(random_bits(length, self.source.seed));
        }

        let pattern = text_to_bits(&self.source.text);
        if pattern.is_empty() {
            return Err(anyhow::anyhow!("Source text is empty"));
        }
        Ok(repeat_to_length(&pattern, length))
    }
}

/// Parse a scheme name, or "all" for every scheme
pub fn parse_schemes(arg: &str) -> Result<Vec<ModulationScheme>> {
    if arg.eq_ignore_ascii_case("all") {
        return Ok(ModulationScheme::ALL.to_vec());
    }
    let scheme = arg
        .parse::<ModulationScheme>()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(vec![scheme])
}
