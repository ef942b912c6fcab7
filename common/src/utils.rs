//! Common Utilities
//!
//! Bit-stream sources and bit packing helpers used by the CLI and the artifact sink

use crate::types::BitStream;
use crate::CommonError;
use bytes::{BufMut, Bytes, BytesMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Number of OFDM symbols in one slot
pub const SYMBOLS_PER_SLOT: usize = 14;

/// Pack bits into bytes (MSB first); the last byte is zero-filled on the right
pub fn pack_bits(bits: &[u8]) -> Bytes {
    let mut bytes = BytesMut::with_capacity((bits.len() + 7) / 8);

    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit != 0 {
                byte |= 1 << (7 - i);
            }
        }
        bytes.put_u8(byte);
    }

    bytes.freeze()
}

/// Unpack bytes into bits (MSB first)
pub fn unpack_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);

    for &byte in bytes {
        for i in 0..8 {
            bits.push((byte >> (7 - i)) & 1);
        }
    }

    bits
}

/// Convert text to bits, 8 bits per byte of its UTF-8 encoding, MSB first
pub fn text_to_bits(text: &str) -> BitStream {
    BitStream::from_validated(unpack_bits(text.as_bytes()))
}

/// Repeat `pattern` until exactly `length` bits are produced
///
/// An empty pattern yields an empty stream.
pub fn repeat_to_length(pattern: &BitStream, length: usize) -> BitStream {
    if pattern.is_empty() {
        return BitStream::default();
    }

    let bits: Vec<u8> = pattern.as_slice().iter().copied().cycle().take(length).collect();
    trace!(
        "Repeated {}-bit pattern {:.2} times to {} bits",
        pattern.len(),
        length as f64 / pattern.len() as f64,
        length
    );

    BitStream::from_validated(bits)
}

/// Uniformly random bits from a seeded generator
pub fn random_bits(length: usize, seed: u64) -> BitStream {
    let mut rng = StdRng::seed_from_u64(seed);
    let bits: Vec<bool> = (0..length).map(|_| rng.gen::<bool>()).collect();
    BitStream::from_bools(&bits)
}

/// Bits needed to fill one slot of fully loaded OFDM symbols
pub fn slot_bit_length(
    fft_size: usize,
    bits_per_symbol: usize,
    symbols_per_slot: usize,
) -> Result<usize, CommonError> {
    fft_size
        .checked_mul(bits_per_symbol)
        .and_then(|n| n.checked_mul(symbols_per_slot))
        .ok_or_else(|| {
            CommonError::LengthOverflow(format!(
                "{} x {} x {}",
                fft_size, bits_per_symbol, symbols_per_slot
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_packing() {
        let bits = vec![1, 0, 1, 0, 1, 0, 1, 0];
        let packed = pack_bits(&bits);
        assert_eq!(packed[0], 0xAA); // 10101010

        let unpacked = unpack_bits(&packed);
        assert_eq!(unpacked[..8], bits[..]);
    }

    #[test]
    fn test_partial_byte_packing() {
        let packed = pack_bits(&[1, 1, 1]);
        assert_eq!(packed.len(), 1);
        assert_eq!(packed[0], 0xE0);
    }

    #[test]
    fn test_text_to_bits() {
        // 'W' = 0x57 = 01010111
        let bits = text_to_bits("W");
        assert_eq!(bits.to_string(), "01010111");

        let bits = text_to_bits("Wi");
        assert_eq!(bits.len(), 16);
    }

    #[test]
    fn test_repeat_to_length() {
        let pattern: BitStream = "101".parse().unwrap();
        let repeated = repeat_to_length(&pattern, 7);
        assert_eq!(repeated.to_string(), "1011011");

        let truncated = repeat_to_length(&pattern, 2);
        assert_eq!(truncated.to_string(), "10");

        assert!(repeat_to_length(&BitStream::default(), 10).is_empty());
    }

    #[test]
    fn test_random_bits_deterministic() {
        let a = random_bits(256, 42);
        let b = random_bits(256, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 256);

        let ones = a.iter().filter(|&b| b == 1).count();
        assert!(ones > 64 && ones < 192);
    }

    #[test]
    fn test_slot_bit_length() {
        // One slot of 64-QAM symbols over 4096 subcarriers
        assert_eq!(slot_bit_length(4096, 6, SYMBOLS_PER_SLOT), Ok(344_064));
        assert!(matches!(
            slot_bit_length(usize::MAX / 4, 6, SYMBOLS_PER_SLOT),
            Err(CommonError::LengthOverflow(_))
        ));
    }
}
