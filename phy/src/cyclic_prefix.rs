//! Cyclic prefix insertion

use crate::ifft::TimeDomainBlock;
use crate::PhyError;
use num_complex::Complex64;

/// One transmittable OFDM symbol: P prefix samples followed by N body samples
#[derive(Debug, Clone, PartialEq)]
pub struct TransmitSymbol {
    samples: Vec<Complex64>,
    prefix_len: usize,
}

impl TransmitSymbol {
    /// All N+P samples in transmission order
    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    /// Total length N+P
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Prefix length P
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Body length N
    pub fn body_len(&self) -> usize {
        self.samples.len() - self.prefix_len
    }

    /// The P prefix samples
    pub fn prefix(&self) -> &[Complex64] {
        &self.samples[..self.prefix_len]
    }

    /// The N samples of the time-domain block
    pub fn body(&self) -> &[Complex64] {
        &self.samples[self.prefix_len..]
    }
}

/// Prepends the last P samples of each time-domain block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicPrefixInserter {
    prefix_len: usize,
    fft_size: usize,
}

impl CyclicPrefixInserter {
    /// Create an inserter; requires 0 <= P < N
    pub fn new(prefix_len: usize, fft_size: usize) -> Result<Self, PhyError> {
        if fft_size == 0 {
            return Err(PhyError::InvalidTransformSize(fft_size));
        }
        if prefix_len >= fft_size {
            return Err(PhyError::InvalidPrefixLength {
                prefix_length: prefix_len,
                transform_size: fft_size,
            });
        }
        Ok(Self { prefix_len, fft_size })
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Samples per transmit symbol (N + P)
    pub fn symbol_length(&self) -> usize {
        self.fft_size + self.prefix_len
    }

    /// Build the transmit symbol for one block
    pub fn insert(&self, block: &TimeDomainBlock) -> Result<TransmitSymbol, PhyError> {
        if block.len() != self.fft_size {
            return Err(PhyError::InvalidBlockLength {
                expected: self.fft_size,
                actual: block.len(),
            });
        }

        let body = block.samples();
        let mut samples = Vec::with_capacity(self.symbol_length());

        // Copy last cp_len samples as CP
        samples.extend_from_slice(&body[self.fft_size - self.prefix_len..]);
        // Copy all samples
        samples.extend_from_slice(body);

        Ok(TransmitSymbol {
            samples,
            prefix_len: self.prefix_len,
        })
    }
}
