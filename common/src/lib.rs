//! Common Utilities and Types Library
//!
//! This crate provides shared types and utilities used across the OFDM transmit chain.

pub mod types;
pub mod utils;

use thiserror::Error;

// Re-export commonly used items
pub use types::*;
pub use utils::*;

/// Errors raised while building shared types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Unsupported modulation scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid bit value {value} at index {index}")]
    InvalidBit { index: usize, value: u8 },

    #[error("Invalid bit character {ch:?} at position {index}")]
    InvalidBitChar { index: usize, ch: char },

    #[error("Bit length overflows: {0}")]
    LengthOverflow(String),

    #[error("Invalid subcarrier spacing: {0} kHz")]
    InvalidSubcarrierSpacing(u32),
}
