//! OFDM Modulation
//!
//! Runs the inverse transform and cyclic prefix insertion over a sequence of
//! blocks. Blocks are independent, so with the `parallel` feature they are
//! processed with Rayon; results are collected by position so the output
//! order never depends on completion order.

use crate::config::FftNormalization;
use crate::cyclic_prefix::{CyclicPrefixInserter, TransmitSymbol};
use crate::framer::Block;
use crate::ifft::InverseTransform;
use crate::PhyError;
use num_complex::Complex64;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// OFDM modulator: IFFT followed by cyclic prefix insertion
#[derive(Clone)]
pub struct OfdmModulator {
    /// Inverse transform (planned once)
    transform: InverseTransform,
    /// Cyclic prefix framer
    cyclic_prefix: CyclicPrefixInserter,
}

impl OfdmModulator {
    /// Create a new OFDM modulator
    pub fn new(
        fft_size: usize,
        prefix_len: usize,
        normalization: FftNormalization,
    ) -> Result<Self, PhyError> {
        let transform = InverseTransform::new(fft_size, normalization)?;
        let cyclic_prefix = CyclicPrefixInserter::new(prefix_len, fft_size)?;

        debug!(
            "Created OFDM modulator: fft_size={}, cp_len={}, normalization={:?}",
            fft_size, prefix_len, normalization
        );

        Ok(Self {
            transform,
            cyclic_prefix,
        })
    }

    /// Modulate one block into one transmit symbol
    pub fn modulate(&self, block: &Block) -> Result<TransmitSymbol, PhyError> {
        let time_block = self.transform.process(block)?;
        self.cyclic_prefix.insert(&time_block)
    }

    /// Modulate all blocks, preserving their order
    #[cfg(not(feature = "parallel"))]
    pub fn modulate_blocks(&self, blocks: &[Block]) -> Result<Vec<TransmitSymbol>, PhyError> {
        self.modulate_blocks_sequential(blocks)
    }

    /// Modulate all blocks, preserving their order
    #[cfg(feature = "parallel")]
    pub fn modulate_blocks(&self, blocks: &[Block]) -> Result<Vec<TransmitSymbol>, PhyError> {
        self.modulate_blocks_parallel(blocks)
    }

    #[cfg_attr(feature = "parallel", allow(dead_code))]
    fn modulate_blocks_sequential(&self, blocks: &[Block]) -> Result<Vec<TransmitSymbol>, PhyError> {
        let mut scratch = self.transform.make_scratch();
        blocks
            .iter()
            .enumerate()
            .map(|(index, block)| {
                trace!("Modulating block {}", index);
                self.modulate_with_scratch(block, &mut scratch)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn modulate_blocks_parallel(&self, blocks: &[Block]) -> Result<Vec<TransmitSymbol>, PhyError> {
        trace!("Modulating {} blocks in parallel", blocks.len());
        // One scratch buffer per worker
        blocks
            .par_iter()
            .map_init(
                || self.transform.make_scratch(),
                |scratch, block| self.modulate_with_scratch(block, scratch),
            )
            .collect()
    }

    fn modulate_with_scratch(
        &self,
        block: &Block,
        scratch: &mut Vec<Complex64>,
    ) -> Result<TransmitSymbol, PhyError> {
        let time_block = self.transform.process_with_scratch(block, scratch)?;
        self.cyclic_prefix.insert(&time_block)
    }

    /// Get total samples per symbol including CP
    pub fn symbol_length(&self) -> usize {
        self.cyclic_prefix.symbol_length()
    }

    pub fn fft_size(&self) -> usize {
        self.transform.fft_size()
    }

    pub fn prefix_len(&self) -> usize {
        self.cyclic_prefix.prefix_len()
    }

    /// Transform pair, for callers that want the forward direction
    pub fn transform(&self) -> &InverseTransform {
        &self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(count: usize, fft_size: usize) -> Vec<Block> {
        (0..count)
            .map(|b| {
                Block::from_samples(
                    (0..fft_size)
                        .map(|k| Complex64::new(((b + k) % 3) as f64 - 1.0, ((b * k) % 5) as f64 - 2.0))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_ofdm_modulator() {
        let modulator = OfdmModulator::new(2048, 144, FftNormalization::Backward).unwrap();
        assert_eq!(modulator.fft_size(), 2048);
        assert_eq!(modulator.prefix_len(), 144);
        assert_eq!(modulator.symbol_length(), 2192);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            OfdmModulator::new(0, 0, FftNormalization::Backward),
            Err(PhyError::InvalidTransformSize(0))
        ));
        assert!(matches!(
            OfdmModulator::new(64, 64, FftNormalization::Backward),
            Err(PhyError::InvalidPrefixLength { .. })
        ));
    }

    #[test]
    fn test_modulate_blocks_in_order() {
        let modulator = OfdmModulator::new(64, 16, FftNormalization::Backward).unwrap();
        let input = blocks(5, 64);

        let symbols = modulator.modulate_blocks(&input).unwrap();
        assert_eq!(symbols.len(), 5);

        for (block, symbol) in input.iter().zip(&symbols) {
            assert_eq!(symbol, &modulator.modulate(block).unwrap());
            assert_eq!(symbol.len(), 80);
            assert_eq!(&symbol.samples()[..16], &symbol.samples()[64..80]);
        }
    }

    #[test]
    fn test_modulate_blocks_error() {
        let modulator = OfdmModulator::new(64, 16, FftNormalization::Backward).unwrap();
        let mut input = blocks(3, 64);
        input.push(Block::from_samples(vec![Complex64::new(0.0, 0.0); 10]));

        assert_eq!(
            modulator.modulate_blocks(&input).unwrap_err(),
            PhyError::InvalidBlockLength { expected: 64, actual: 10 }
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let modulator = OfdmModulator::new(256, 32, FftNormalization::Backward).unwrap();
        let input = blocks(16, 256);

        let parallel = modulator.modulate_blocks_parallel(&input).unwrap();
        let sequential = modulator.modulate_blocks_sequential(&input).unwrap();
        assert_eq!(parallel, sequential);
    }
}
