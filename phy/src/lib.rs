//! OFDM Transmit Chain
//!
//! Bits -> constellation symbols -> fixed-size blocks -> IFFT -> cyclic prefix.
//! Each stage is a pure function of its input and an immutable [`TransmitConfig`].

pub mod config;
pub mod mapper;
pub mod framer;
pub mod ifft;
pub mod cyclic_prefix;
pub mod ofdm;
pub mod transmitter;

// Re-export commonly used types
pub use config::{FftNormalization, TransmitConfig, TruncationPolicy};
pub use mapper::SymbolMapper;
pub use framer::{Block, BlockFramer};
pub use ifft::{InverseTransform, TimeDomainBlock};
pub use cyclic_prefix::{CyclicPrefixInserter, TransmitSymbol};
pub use ofdm::OfdmModulator;
pub use transmitter::{SymbolPair, Transmission, TransmitBuffer, Transmitter};

use common::CommonError;
use thiserror::Error;

/// Errors raised by the transmit chain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhyError {
    #[error("Unsupported modulation scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Bit stream of {bits} bits is not a multiple of {bits_per_symbol} bits per symbol")]
    InvalidInputLength { bits: usize, bits_per_symbol: usize },

    #[error("Invalid transform size: {0}")]
    InvalidTransformSize(usize),

    #[error("Invalid prefix length {prefix_length} for transform size {transform_size}")]
    InvalidPrefixLength { prefix_length: usize, transform_size: usize },

    #[error("Expected block of {expected} samples, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<CommonError> for PhyError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::UnsupportedScheme(name) => PhyError::UnsupportedScheme(name),
            other => PhyError::InvalidConfiguration(other.to_string()),
        }
    }
}
