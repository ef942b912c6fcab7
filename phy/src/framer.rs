//! Block framer (serial-to-parallel conversion)
//!
//! Splits the symbol stream into blocks of exactly N symbols, padding the
//! last block with complex zeros.

use crate::PhyError;
use num_complex::Complex64;
use num_traits::Zero;
use tracing::debug;

/// N frequency-domain symbols feeding one IFFT
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    samples: Vec<Complex64>,
    padding: usize,
}

impl Block {
    /// Wrap a fully populated block
    pub fn from_samples(samples: Vec<Complex64>) -> Self {
        Self { samples, padding: 0 }
    }

    /// Samples, padding included
    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    /// Block length (always N)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True for a zero-length block
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of zero symbols appended at the tail
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Number of symbols taken from the input stream
    pub fn data_len(&self) -> usize {
        self.samples.len() - self.padding
    }
}

/// Frames a symbol stream into blocks of `block_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFramer {
    block_size: usize,
}

impl BlockFramer {
    /// Create a framer; the block size must be positive
    pub fn new(block_size: usize) -> Result<Self, PhyError> {
        if block_size == 0 {
            return Err(PhyError::InvalidTransformSize(block_size));
        }
        Ok(Self { block_size })
    }

    /// Block size N
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Split `symbols` into ceil(M/N) blocks, zero-padding the last one
    pub fn frame(&self, symbols: &[Complex64]) -> Vec<Block> {
        let blocks: Vec<Block> = symbols
            .chunks(self.block_size)
            .map(|chunk| {
                let padding = self.block_size - chunk.len();
                let mut samples = Vec::with_capacity(self.block_size);
                samples.extend_from_slice(chunk);
                samples.resize(self.block_size, Complex64::zero());
                Block { samples, padding }
            })
            .collect();

        debug!(
            "Framed {} symbols into {} blocks of {} ({} padding)",
            symbols.len(),
            blocks.len(),
            self.block_size,
            padding_length(symbols.len(), self.block_size)
        );

        blocks
    }
}

/// Number of blocks needed for `num_symbols` symbols: ceil(M/N)
pub fn block_count(num_symbols: usize, block_size: usize) -> usize {
    num_symbols.div_ceil(block_size)
}

/// Zero symbols appended to the last block: N*ceil(M/N) - M
pub fn padding_length(num_symbols: usize, block_size: usize) -> usize {
    block_count(num_symbols, block_size) * block_size - num_symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<Complex64> {
        (0..len).map(|i| Complex64::new(i as f64, -(i as f64))).collect()
    }

    #[test]
    fn test_zero_block_size() {
        assert_eq!(BlockFramer::new(0), Err(PhyError::InvalidTransformSize(0)));
    }

    #[test]
    fn test_empty_input() {
        let framer = BlockFramer::new(8).unwrap();
        assert!(framer.frame(&[]).is_empty());
        assert_eq!(block_count(0, 8), 0);
        assert_eq!(padding_length(0, 8), 0);
    }

    #[test]
    fn test_exact_fit() {
        let framer = BlockFramer::new(4).unwrap();
        let blocks = framer.frame(&ramp(8));
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 4 && b.padding() == 0));
        assert_eq!(blocks[1].samples()[0], Complex64::new(4.0, -4.0));
    }

    #[test]
    fn test_last_block_padded() {
        let framer = BlockFramer::new(4).unwrap();
        let symbols = ramp(10);
        let blocks = framer.frame(&symbols);

        assert_eq!(blocks.len(), 3);
        let last = &blocks[2];
        assert_eq!(last.len(), 4);
        assert_eq!(last.padding(), 2);
        assert_eq!(last.data_len(), 2);
        assert_eq!(&last.samples()[..2], &symbols[8..10]);
        assert!(last.samples()[2..].iter().all(|s| s.is_zero()));
    }

    #[test]
    fn test_order_preserved() {
        let framer = BlockFramer::new(3).unwrap();
        let symbols = ramp(7);
        let flattened: Vec<Complex64> = framer
            .frame(&symbols)
            .iter()
            .flat_map(|b| b.samples()[..b.data_len()].to_vec())
            .collect();
        assert_eq!(flattened, symbols);
    }

    #[test]
    fn test_padding_invariant() {
        for &(m, n) in &[(1, 4096), (4095, 4096), (4096, 4096), (4097, 4096), (57_344, 4096), (10, 3)] {
            let framer = BlockFramer::new(n).unwrap();
            let blocks = framer.frame(&vec![Complex64::new(1.0, 0.0); m]);
            assert_eq!(blocks.len(), (m + n - 1) / n);
            assert_eq!(blocks.len(), block_count(m, n));

            let padding: usize = blocks.iter().map(|b| b.padding()).sum();
            assert_eq!(padding, n * blocks.len() - m);
            assert_eq!(padding, padding_length(m, n));
            assert_eq!(blocks.last().map(|b| b.padding()), Some(padding));
        }
    }
}
