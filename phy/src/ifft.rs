//! Inverse transform stage
//!
//! Converts each frequency-domain block into a time-domain block of the same
//! length using rustfft. The matching forward transform is provided for
//! analysis and round-trip checks.
//!
//! Scaling follows [`FftNormalization`]:
//! - `Backward`: inverse scaled by 1/N, forward unscaled
//! - `Orthonormal`: both directions scaled by 1/sqrt(N)

use crate::config::FftNormalization;
use crate::framer::Block;
use crate::PhyError;
use num_complex::Complex64;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use tracing::{debug, trace};

/// Time-domain samples of one OFDM symbol before the cyclic prefix
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDomainBlock {
    samples: Vec<Complex64>,
}

impl TimeDomainBlock {
    /// Wrap time-domain samples
    pub fn from_samples(samples: Vec<Complex64>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sum of |x|^2 over the block
    pub fn energy(&self) -> f64 {
        self.samples.iter().map(|s| s.norm_sqr()).sum()
    }
}

/// Planned inverse/forward FFT pair of a fixed size
#[derive(Clone)]
pub struct InverseTransform {
    fft_size: usize,
    normalization: FftNormalization,
    /// IFFT processor
    ifft: Arc<dyn Fft<f64>>,
    /// FFT processor for analysis
    fft: Arc<dyn Fft<f64>>,
}

impl InverseTransform {
    /// Plan transforms of `fft_size` points
    pub fn new(fft_size: usize, normalization: FftNormalization) -> Result<Self, PhyError> {
        if fft_size == 0 {
            return Err(PhyError::InvalidTransformSize(fft_size));
        }

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(fft_size);
        let fft = planner.plan_fft_forward(fft_size);

        if !fft_size.is_power_of_two() {
            debug!("Transform size {} is not a power of two, using mixed-radix plan", fft_size);
        }

        Ok(Self {
            fft_size,
            normalization,
            ifft,
            fft,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn normalization(&self) -> FftNormalization {
        self.normalization
    }

    /// Scale applied after the raw (unnormalized) inverse FFT
    pub fn inverse_scale(&self) -> f64 {
        match self.normalization {
            FftNormalization::Backward => 1.0 / self.fft_size as f64,
            FftNormalization::Orthonormal => 1.0 / (self.fft_size as f64).sqrt(),
        }
    }

    /// Scale applied after the raw (unnormalized) forward FFT
    pub fn forward_scale(&self) -> f64 {
        match self.normalization {
            FftNormalization::Backward => 1.0,
            FftNormalization::Orthonormal => 1.0 / (self.fft_size as f64).sqrt(),
        }
    }

    /// Scratch length that covers both directions
    pub fn scratch_len(&self) -> usize {
        self.ifft
            .get_inplace_scratch_len()
            .max(self.fft.get_inplace_scratch_len())
    }

    /// Scratch buffer sized for this transform, reusable across blocks
    pub fn make_scratch(&self) -> Vec<Complex64> {
        vec![Complex64::zero(); self.scratch_len()]
    }

    /// Inverse transform one block
    pub fn process(&self, block: &Block) -> Result<TimeDomainBlock, PhyError> {
        let mut scratch = self.make_scratch();
        self.process_with_scratch(block, &mut scratch)
    }

    /// Inverse transform one block using caller-owned scratch
    ///
    /// The scratch buffer is grown if it is too short.
    pub fn process_with_scratch(
        &self,
        block: &Block,
        scratch: &mut Vec<Complex64>,
    ) -> Result<TimeDomainBlock, PhyError> {
        let samples = self.run(&self.ifft, block.samples(), self.inverse_scale(), scratch)?;
        let time_block = TimeDomainBlock { samples };
        trace!("IFFT: {} samples, energy {:.6}", time_block.len(), time_block.energy());
        Ok(time_block)
    }

    /// Forward transform of time-domain samples back to the frequency domain
    pub fn forward(&self, samples: &[Complex64]) -> Result<Vec<Complex64>, PhyError> {
        let mut scratch = self.make_scratch();
        self.run(&self.fft, samples, self.forward_scale(), &mut scratch)
    }

    fn run(
        &self,
        plan: &Arc<dyn Fft<f64>>,
        input: &[Complex64],
        scale: f64,
        scratch: &mut Vec<Complex64>,
    ) -> Result<Vec<Complex64>, PhyError> {
        if input.len() != self.fft_size {
            return Err(PhyError::InvalidBlockLength {
                expected: self.fft_size,
                actual: input.len(),
            });
        }

        let needed = plan.get_inplace_scratch_len();
        if scratch.len() < needed {
            scratch.resize(needed, Complex64::zero());
        }

        let mut buffer = input.to_vec();
        plan.process_with_scratch(&mut buffer, &mut scratch[..needed]);

        for sample in buffer.iter_mut() {
            *sample *= scale;
        }

        Ok(buffer)
    }
}
