//! Common Types for the OFDM transmit chain
//!
//! Defines fundamental types shared by the PHY, the artifact sink and the CLI

use crate::CommonError;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Modulation schemes supported by the symbol mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModulationScheme {
    /// Binary phase shift keying, 1 bit per symbol
    Bpsk,
    /// pi/2-BPSK: BPSK with a (pi/2)*i phase rotation, 1 bit per symbol
    Pi2Bpsk,
    /// Quadrature phase shift keying, 2 bits per symbol
    Qpsk,
    /// 64-point quadrature amplitude modulation, 6 bits per symbol
    Qam64,
}

impl ModulationScheme {
    /// All schemes in the order the driver runs them
    pub const ALL: [ModulationScheme; 4] = [
        ModulationScheme::Bpsk,
        ModulationScheme::Pi2Bpsk,
        ModulationScheme::Qpsk,
        ModulationScheme::Qam64,
    ];

    /// Number of input bits consumed per constellation symbol
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            ModulationScheme::Bpsk => 1,
            ModulationScheme::Pi2Bpsk => 1,
            ModulationScheme::Qpsk => 2,
            ModulationScheme::Qam64 => 6,
        }
    }

    /// Canonical identifier, also used for artifact file names
    pub fn name(&self) -> &'static str {
        match self {
            ModulationScheme::Bpsk => "BPSK",
            ModulationScheme::Pi2Bpsk => "Pi_by_2_BPSK",
            ModulationScheme::Qpsk => "QPSK",
            ModulationScheme::Qam64 => "64QAM",
        }
    }
}

impl fmt::Display for ModulationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModulationScheme {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Separators and case are not significant: "Pi_by_2_BPSK" == "pi-by-2-bpsk"
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "bpsk" => Ok(ModulationScheme::Bpsk),
            "pi2bpsk" | "piby2bpsk" | "pi/2bpsk" | "rotatedbpsk" => Ok(ModulationScheme::Pi2Bpsk),
            "qpsk" => Ok(ModulationScheme::Qpsk),
            "64qam" | "qam64" => Ok(ModulationScheme::Qam64),
            _ => Err(CommonError::UnsupportedScheme(s.to_string())),
        }
    }
}

impl TryFrom<String> for ModulationScheme {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModulationScheme> for String {
    fn from(scheme: ModulationScheme) -> Self {
        scheme.name().to_string()
    }
}

/// Subcarrier spacing values in kHz
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum SubcarrierSpacing {
    /// 15 kHz
    Scs15 = 15,
    /// 30 kHz
    Scs30 = 30,
    /// 60 kHz
    Scs60 = 60,
    /// 120 kHz
    Scs120 = 120,
    /// 240 kHz
    Scs240 = 240,
}

impl SubcarrierSpacing {
    /// Parse a spacing given in kHz
    pub fn from_khz(khz: u32) -> Result<Self, CommonError> {
        Self::from_u32(khz).ok_or(CommonError::InvalidSubcarrierSpacing(khz))
    }

    /// Spacing in kHz
    pub fn as_khz(&self) -> u32 {
        // Discriminants are the kHz values
        self.to_u32().unwrap_or(0)
    }

    /// Spacing in Hz
    pub fn as_hz(&self) -> f64 {
        self.as_khz() as f64 * 1e3
    }

    /// Sample rate of an OFDM symbol with `fft_size` subcarriers
    pub fn sample_rate(&self, fft_size: usize) -> f64 {
        fft_size as f64 * self.as_hz()
    }
}

impl Default for SubcarrierSpacing {
    fn default() -> Self {
        SubcarrierSpacing::Scs60
    }
}

/// Ordered, immutable sequence of bits (each element 0 or 1)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    bits: Vec<u8>,
}

impl BitStream {
    /// Create a bit stream, rejecting any element that is not 0 or 1
    pub fn new(bits: Vec<u8>) -> Result<Self, CommonError> {
        if let Some((index, &value)) = bits.iter().enumerate().find(|&(_, &b)| b > 1) {
            return Err(CommonError::InvalidBit { index, value });
        }
        Ok(Self { bits })
    }

    /// Wrap bits already known to be 0 or 1
    pub(crate) fn from_validated(bits: Vec<u8>) -> Self {
        Self { bits }
    }

    /// Create a bit stream from booleans
    pub fn from_bools(bits: &[bool]) -> Self {
        Self {
            bits: bits.iter().map(|&b| b as u8).collect(),
        }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when the stream holds no bits
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Borrow the bits
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    /// Iterate over the bits
    pub fn iter(&self) -> impl Iterator<Item = u8> + Clone + '_ {
        self.bits.iter().copied()
    }
}

impl FromStr for BitStream {
    type Err = CommonError;

    /// Parse a string of '0'/'1' characters; whitespace is ignored
    ///
    /// Errors report the offending character and its position in `s`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for (index, c) in s.chars().enumerate() {
            match c {
                '0' => bits.push(0),
                '1' => bits.push(1),
                c if c.is_whitespace() => {}
                other => return Err(CommonError::InvalidBitChar { index, ch: other }),
            }
        }
        Ok(Self { bits })
    }
}

impl fmt::Display for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("BPSK".parse::<ModulationScheme>().unwrap(), ModulationScheme::Bpsk);
        assert_eq!("Pi_by_2_BPSK".parse::<ModulationScheme>().unwrap(), ModulationScheme::Pi2Bpsk);
        assert_eq!("pi2-bpsk".parse::<ModulationScheme>().unwrap(), ModulationScheme::Pi2Bpsk);
        assert_eq!("qpsk".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qpsk);
        assert_eq!("64QAM".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qam64);
        assert_eq!("qam64".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qam64);

        assert_eq!(
            "16QAM".parse::<ModulationScheme>(),
            Err(CommonError::UnsupportedScheme("16QAM".to_string()))
        );
    }

    #[test]
    fn test_bits_per_symbol() {
        assert_eq!(ModulationScheme::Bpsk.bits_per_symbol(), 1);
        assert_eq!(ModulationScheme::Pi2Bpsk.bits_per_symbol(), 1);
        assert_eq!(ModulationScheme::Qpsk.bits_per_symbol(), 2);
        assert_eq!(ModulationScheme::Qam64.bits_per_symbol(), 6);
    }

    #[test]
    fn test_scheme_name_roundtrip() {
        for scheme in ModulationScheme::ALL {
            assert_eq!(scheme.name().parse::<ModulationScheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn test_subcarrier_spacing() {
        assert_eq!(SubcarrierSpacing::from_khz(60).unwrap(), SubcarrierSpacing::Scs60);
        assert_eq!(
            SubcarrierSpacing::from_khz(45),
            Err(CommonError::InvalidSubcarrierSpacing(45))
        );
        assert_eq!(SubcarrierSpacing::Scs60.as_hz(), 60_000.0);
        // 4096 subcarriers at 60 kHz -> 245.76 MHz
        assert_eq!(SubcarrierSpacing::Scs60.sample_rate(4096), 245_760_000.0);
    }

    #[test]
    fn test_bitstream_validation() {
        assert!(BitStream::new(vec![0, 1, 1, 0]).is_ok());
        assert_eq!(
            BitStream::new(vec![0, 1, 2]),
            Err(CommonError::InvalidBit { index: 2, value: 2 })
        );
    }

    #[test]
    fn test_bitstream_parsing() {
        let bits: BitStream = "01 10".parse().unwrap();
        assert_eq!(bits.as_slice(), &[0, 1, 1, 0]);
        assert_eq!(bits.to_string(), "0110");

        let bit_iter = bits.iter();
        assert_eq!(bit_iter.clone().cycle().take(6).collect::<Vec<_>>(), vec![0, 1, 1, 0, 0, 1]);
        assert_eq!(bit_iter.count(), 4);

        assert!("012".parse::<BitStream>().is_err());
    }

    #[test]
    fn test_bitstream_parse_error_position() {
        assert_eq!(
            "012".parse::<BitStream>(),
            Err(CommonError::InvalidBitChar { index: 2, ch: '2' })
        );
        // Position counts whitespace in the raw string
        assert_eq!(
            "0 1é".parse::<BitStream>(),
            Err(CommonError::InvalidBitChar { index: 3, ch: 'é' })
        );
    }
}
