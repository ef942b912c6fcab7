//! Artifact Interfaces Library
//!
//! This crate persists the products of the transmit chain: bit streams,
//! constellation symbols, transmit buffers and a JSON run manifest.

pub mod artifact;

use thiserror::Error;

/// Interface errors
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sample file {path} has {len} bytes, not a whole number of complex samples")]
    InvalidSampleFile { path: String, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
