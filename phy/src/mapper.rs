//! Symbol mapper
//!
//! Maps a bit stream onto BPSK, pi/2-BPSK, QPSK or 64-QAM constellation points.
//! All constellations are scaled to unit average power.

use crate::config::TruncationPolicy;
use crate::PhyError;
use common::types::{BitStream, ModulationScheme};
use num_complex::Complex64;
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};
use tracing::{debug, warn};

/// Maps bits to complex constellation symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMapper {
    scheme: ModulationScheme,
    truncation: TruncationPolicy,
}

impl SymbolMapper {
    /// Create a mapper for one scheme
    pub fn new(scheme: ModulationScheme, truncation: TruncationPolicy) -> Self {
        Self { scheme, truncation }
    }

    /// Modulation scheme of this mapper
    pub fn scheme(&self) -> ModulationScheme {
        self.scheme
    }

    /// Map a bit stream to symbols
    ///
    /// A trailing group shorter than the scheme's bits per symbol is either
    /// dropped or rejected, depending on the truncation policy.
    pub fn map(&self, bits: &BitStream) -> Result<Vec<Complex64>, PhyError> {
        let bits_per_symbol = self.scheme.bits_per_symbol();
        let leftover = bits.len() % bits_per_symbol;

        if leftover != 0 {
            match self.truncation {
                TruncationPolicy::Reject => {
                    return Err(PhyError::InvalidInputLength {
                        bits: bits.len(),
                        bits_per_symbol,
                    });
                }
                TruncationPolicy::Truncate => {
                    warn!(
                        "{}: dropping {} trailing bits of a {}-bit stream",
                        self.scheme,
                        leftover,
                        bits.len()
                    );
                }
            }
        }

        let bits = bits.as_slice();
        let symbols: Vec<Complex64> = match self.scheme {
            ModulationScheme::Bpsk => bits.iter().map(|&b| bpsk_symbol(b)).collect(),
            ModulationScheme::Pi2Bpsk => bits
                .iter()
                .enumerate()
                .map(|(i, &b)| pi2_bpsk_symbol(b, i))
                .collect(),
            ModulationScheme::Qpsk => bits
                .chunks_exact(2)
                .map(|pair| qpsk_symbol(pair[0], pair[1]))
                .collect(),
            ModulationScheme::Qam64 => bits.chunks_exact(6).map(qam64_symbol).collect(),
        };

        debug!(
            "Mapped {} bits to {} {} symbols",
            bits.len() - leftover,
            symbols.len(),
            self.scheme
        );

        Ok(symbols)
    }
}

/// Map bits with a one-off mapper
pub fn map_bits(
    bits: &BitStream,
    scheme: ModulationScheme,
    truncation: TruncationPolicy,
) -> Result<Vec<Complex64>, PhyError> {
    SymbolMapper::new(scheme, truncation).map(bits)
}

/// Bipolar level of a bit: 0 -> +1, 1 -> -1
#[inline]
fn level(bit: u8) -> f64 {
    1.0 - 2.0 * bit as f64
}

/// BPSK: 0 -> +1, 1 -> -1
fn bpsk_symbol(bit: u8) -> Complex64 {
    Complex64::new(level(bit), 0.0)
}

/// pi/2-BPSK: phase (pi/2)*index on top of the base point
///
/// Bit 0 sits at exp(j(pi + rot)), bit 1 at exp(j*rot). The rotation keeps
/// growing with the index and is not wrapped.
fn pi2_bpsk_symbol(bit: u8, index: usize) -> Complex64 {
    let rotation = FRAC_PI_2 * index as f64;
    if bit == 0 {
        Complex64::from_polar(1.0, PI + rotation)
    } else {
        Complex64::from_polar(1.0, rotation)
    }
}

/// QPSK: 00 -> (1+j), 01 -> (1-j), 10 -> (-1+j), 11 -> (-1-j), over sqrt(2)
fn qpsk_symbol(b0: u8, b1: u8) -> Complex64 {
    Complex64::new(level(b0), level(b1)) / SQRT_2
}

/// 64-QAM from bits b0..b5, scaled by 1/sqrt(42)
///
/// I = (1-2b0)(4-(1-2b2)(2-(1-2b4))), Q uses b1, b3, b5.
fn qam64_symbol(bits: &[u8]) -> Complex64 {
    let re = level(bits[0]) * (4.0 - level(bits[2]) * (2.0 - level(bits[4])));
    let im = level(bits[1]) * (4.0 - level(bits[3]) * (2.0 - level(bits[5])));
    Complex64::new(re, im) / 42.0_f64.sqrt()
}
