//! Transmit chain configuration

use crate::PhyError;
use common::types::{ModulationScheme, SubcarrierSpacing};
use serde::{Deserialize, Serialize};

/// Default transform size (subcarriers per OFDM symbol)
pub const DEFAULT_FFT_SIZE: usize = 4096;

/// Default cyclic prefix length in samples
pub const DEFAULT_PREFIX_LENGTH: usize = 2304;

/// Scaling convention of the inverse/forward transform pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FftNormalization {
    /// Inverse scaled by 1/N, forward unscaled
    #[default]
    Backward,
    /// Both directions scaled by 1/sqrt(N)
    Orthonormal,
}

/// What the mapper does with trailing bits that do not fill a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Drop them and log a warning
    #[default]
    Truncate,
    /// Fail with `PhyError::InvalidInputLength`
    Reject,
}

/// Transmit chain configuration, fixed for the lifetime of a run
#[derive(Debug, Clone, PartialEq)]
pub struct TransmitConfig {
    /// Transform size N
    pub fft_size: usize,
    /// Cyclic prefix length P, must satisfy P < N
    pub prefix_length: usize,
    /// Modulation scheme used by `Transmitter::transmit`
    pub modulation: ModulationScheme,
    /// Transform scaling convention
    pub normalization: FftNormalization,
    /// Trailing-bit policy of the symbol mapper
    pub truncation: TruncationPolicy,
    /// Subcarrier spacing, only used to derive timing
    pub subcarrier_spacing: SubcarrierSpacing,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            prefix_length: DEFAULT_PREFIX_LENGTH,
            modulation: ModulationScheme::Qam64,
            normalization: FftNormalization::Backward,
            truncation: TruncationPolicy::Truncate,
            subcarrier_spacing: SubcarrierSpacing::Scs60,
        }
    }
}

impl TransmitConfig {
    /// Check structural constraints on N and P
    pub fn validate(&self) -> Result<(), PhyError> {
        if self.fft_size == 0 {
            return Err(PhyError::InvalidTransformSize(self.fft_size));
        }
        if self.prefix_length >= self.fft_size {
            return Err(PhyError::InvalidPrefixLength {
                prefix_length: self.prefix_length,
                transform_size: self.fft_size,
            });
        }
        Ok(())
    }

    /// Samples per transmit symbol (N + P)
    pub fn symbol_length(&self) -> usize {
        self.fft_size + self.prefix_length
    }

    /// Sample rate in Hz (N x SCS)
    pub fn sample_rate(&self) -> f64 {
        self.subcarrier_spacing.sample_rate(self.fft_size)
    }

    /// Duration of one sample in seconds
    pub fn timing_unit(&self) -> f64 {
        1.0 / self.sample_rate()
    }

    /// Duration of one transmit symbol, prefix included, in seconds
    pub fn symbol_duration(&self) -> f64 {
        self.symbol_length() as f64 * self.timing_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransmitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.symbol_length(), 6400);
        assert_eq!(config.sample_rate(), 245_760_000.0);
        assert!((config.timing_unit() - 4.069e-9).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_transform_size() {
        let config = TransmitConfig {
            fft_size: 0,
            prefix_length: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(PhyError::InvalidTransformSize(0)));
    }

    #[test]
    fn test_invalid_prefix_length() {
        let config = TransmitConfig {
            fft_size: 64,
            prefix_length: 64,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(PhyError::InvalidPrefixLength { prefix_length: 64, transform_size: 64 })
        );

        let config = TransmitConfig {
            fft_size: 64,
            prefix_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
