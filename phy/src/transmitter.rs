//! Transmit chain
//!
//! Composes the four stages: symbol mapping, block framing, IFFT and cyclic
//! prefix insertion. One call to [`Transmitter::transmit`] is one stateless
//! pass over a bit stream.

use crate::config::TransmitConfig;
use crate::cyclic_prefix::TransmitSymbol;
use crate::framer::{Block, BlockFramer};
use crate::mapper::SymbolMapper;
use crate::ofdm::OfdmModulator;
use crate::PhyError;
use common::types::{BitStream, ModulationScheme};
use num_complex::Complex64;
use std::ops::Range;
use tracing::{debug, info};

/// Ordered transmit symbols of one transmission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransmitBuffer {
    symbols: Vec<TransmitSymbol>,
}

impl TransmitBuffer {
    pub fn new(symbols: Vec<TransmitSymbol>) -> Self {
        Self { symbols }
    }

    /// Number of transmit symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[TransmitSymbol] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransmitSymbol> {
        self.symbols.iter()
    }

    /// Total number of samples across all symbols
    pub fn total_samples(&self) -> usize {
        self.symbols.iter().map(|s| s.len()).sum()
    }

    /// Serial sample stream in transmission order
    pub fn to_samples(&self) -> Vec<Complex64> {
        let mut samples = Vec::with_capacity(self.total_samples());
        for symbol in &self.symbols {
            samples.extend_from_slice(symbol.samples());
        }
        samples
    }

    /// Symbols `index` and `index + 1` back to back, annotated for plotting
    pub fn pair(&self, index: usize) -> Option<SymbolPair> {
        let first = self.symbols.get(index)?;
        let second = self.symbols.get(index.checked_add(1)?)?;

        let boundary = first.len();
        let mut samples = Vec::with_capacity(first.len() + second.len());
        samples.extend_from_slice(first.samples());
        samples.extend_from_slice(second.samples());

        Some(SymbolPair {
            samples,
            prefix_regions: [
                0..first.prefix_len(),
                boundary..boundary + second.prefix_len(),
            ],
            boundary,
        })
    }
}

impl<'a> IntoIterator for &'a TransmitBuffer {
    type Item = &'a TransmitSymbol;
    type IntoIter = std::slice::Iter<'a, TransmitSymbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Two consecutive transmit symbols with prefix regions and boundary marked
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPair {
    /// Concatenated samples of both symbols
    pub samples: Vec<Complex64>,
    /// Sample ranges holding each symbol's cyclic prefix
    pub prefix_regions: [Range<usize>; 2],
    /// Index of the first sample of the second symbol
    pub boundary: usize,
}

impl SymbolPair {
    /// Sample instants in seconds
    pub fn time_axis(&self, sample_rate: f64) -> Vec<f64> {
        (0..self.samples.len()).map(|n| n as f64 / sample_rate).collect()
    }
}

/// Result of one pass through the transmit chain
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    scheme: ModulationScheme,
    symbols: Vec<Complex64>,
    padding: usize,
    buffer: TransmitBuffer,
}

impl Transmission {
    pub fn scheme(&self) -> ModulationScheme {
        self.scheme
    }

    /// Constellation symbols before framing
    pub fn symbols(&self) -> &[Complex64] {
        &self.symbols
    }

    /// Zero symbols appended to the last block
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Number of OFDM blocks
    pub fn block_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &TransmitBuffer {
        &self.buffer
    }
}

/// OFDM transmitter
#[derive(Clone)]
pub struct Transmitter {
    config: TransmitConfig,
    framer: BlockFramer,
    modulator: OfdmModulator,
}

impl Transmitter {
    /// Validate the configuration and plan the transform
    pub fn new(config: TransmitConfig) -> Result<Self, PhyError> {
        config.validate()?;

        let framer = BlockFramer::new(config.fft_size)?;
        let modulator = OfdmModulator::new(config.fft_size, config.prefix_length, config.normalization)?;

        info!(
            "Transmitter ready: N={}, P={}, scheme={}, {:.2} MHz sample rate",
            config.fft_size,
            config.prefix_length,
            config.modulation,
            config.sample_rate() / 1e6
        );

        Ok(Self {
            config,
            framer,
            modulator,
        })
    }

    pub fn config(&self) -> &TransmitConfig {
        &self.config
    }

    pub fn modulator(&self) -> &OfdmModulator {
        &self.modulator
    }

    /// Run the chain with the configured modulation scheme
    pub fn transmit(&self, bits: &BitStream) -> Result<Transmission, PhyError> {
        self.transmit_with(bits, self.config.modulation)
    }

    /// Run the chain with an explicit modulation scheme
    pub fn transmit_with(
        &self,
        bits: &BitStream,
        scheme: ModulationScheme,
    ) -> Result<Transmission, PhyError> {
        let symbols = self.map_symbols(bits, scheme)?;
        let blocks = self.frame(&symbols);
        let padding = blocks.last().map_or(0, Block::padding);
        let buffer = self.modulate(&blocks)?;

        info!(
            "{}: {} bits -> {} symbols -> {} OFDM symbols ({} padding, {} samples)",
            scheme,
            bits.len(),
            symbols.len(),
            buffer.len(),
            padding,
            buffer.total_samples()
        );

        Ok(Transmission {
            scheme,
            symbols,
            padding,
            buffer,
        })
    }

    /// Stage 1: bits to constellation symbols
    pub fn map_symbols(
        &self,
        bits: &BitStream,
        scheme: ModulationScheme,
    ) -> Result<Vec<Complex64>, PhyError> {
        SymbolMapper::new(scheme, self.config.truncation).map(bits)
    }

    /// Stage 2: symbols to zero-padded blocks of N
    pub fn frame(&self, symbols: &[Complex64]) -> Vec<Block> {
        self.framer.frame(symbols)
    }

    /// Stages 3 and 4: IFFT and cyclic prefix for every block
    pub fn modulate(&self, blocks: &[Block]) -> Result<TransmitBuffer, PhyError> {
        let symbols = self.modulator.modulate_blocks(blocks)?;
        debug!("Modulated {} blocks", symbols.len());
        Ok(TransmitBuffer::new(symbols))
    }
}
