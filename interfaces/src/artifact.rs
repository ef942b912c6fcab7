//! Artifact sink for transmit chain products
//!
//! Complex samples are stored as raw interleaved little-endian f64 pairs
//! (re, im), 16 bytes per sample. Bit streams are packed MSB first. A JSON
//! manifest describes every scheme written in a run.

use crate::InterfaceError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::Utc;
use common::types::{BitStream, ModulationScheme};
use common::utils::pack_bits;
use num_complex::Complex64;
use phy::{FftNormalization, Transmission, TransmitBuffer, TransmitConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bytes per complex sample (two little-endian f64)
pub const SAMPLE_BYTES: usize = 16;

/// Extension of raw complex sample files
pub const SAMPLE_EXTENSION: &str = "cf64";

/// Manifest file name inside the artifact directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Description of one run, written as `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Generation time, RFC 3339
    pub generated_at: String,
    pub fft_size: usize,
    pub prefix_length: usize,
    pub sample_rate_hz: f64,
    pub normalization: FftNormalization,
    /// Length of the input bit stream
    pub bit_count: usize,
    /// Packed bit stream file, if written
    pub bits_file: Option<String>,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(config: &TransmitConfig, bit_count: usize) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            fft_size: config.fft_size,
            prefix_length: config.prefix_length,
            sample_rate_hz: config.sample_rate(),
            normalization: config.normalization,
            bit_count,
            bits_file: None,
            entries: Vec::new(),
        }
    }
}

/// Per-scheme record in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub scheme: ModulationScheme,
    pub symbol_count: usize,
    pub block_count: usize,
    pub padding: usize,
    pub samples_per_symbol: usize,
    pub total_samples: usize,
    /// Constellation symbols before framing
    pub symbols_file: String,
    /// Serial transmit buffer
    pub transmit_file: String,
}

/// Writes artifacts below one directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    directory: PathBuf,
}

impl ArtifactWriter {
    /// Create the writer, creating the directory if needed
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, InterfaceError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        debug!("Artifact directory: {}", directory.display());
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write a bit stream packed 8 bits per byte, MSB first
    pub fn write_bits(&self, name: &str, bits: &BitStream) -> Result<PathBuf, InterfaceError> {
        let path = self.path_for(name, "bits")?;
        fs::write(&path, pack_bits(bits.as_slice()))?;
        debug!("Wrote {} bits to {}", bits.len(), path.display());
        Ok(path)
    }

    /// Write complex samples as raw interleaved f64
    pub fn write_symbols(&self, name: &str, samples: &[Complex64]) -> Result<PathBuf, InterfaceError> {
        let path = self.path_for(name, SAMPLE_EXTENSION)?;
        fs::write(&path, samples_to_bytes(samples))?;
        debug!("Wrote {} samples to {}", samples.len(), path.display());
        Ok(path)
    }

    /// Write a transmit buffer as one serial sample stream
    pub fn write_buffer(&self, name: &str, buffer: &TransmitBuffer) -> Result<PathBuf, InterfaceError> {
        self.write_symbols(&format!("{}_tx", name), &buffer.to_samples())
    }

    /// Write constellation symbols and transmit buffer of one transmission
    pub fn write_transmission(&self, transmission: &Transmission) -> Result<ManifestEntry, InterfaceError> {
        let name = transmission.scheme().name();
        let buffer = transmission.buffer();

        let symbols_path = self.write_symbols(name, transmission.symbols())?;
        let transmit_path = self.write_buffer(name, buffer)?;

        Ok(ManifestEntry {
            scheme: transmission.scheme(),
            symbol_count: transmission.symbols().len(),
            block_count: transmission.block_count(),
            padding: transmission.padding(),
            samples_per_symbol: buffer.symbols().first().map_or(0, |s| s.len()),
            total_samples: buffer.total_samples(),
            symbols_file: file_name(&symbols_path),
            transmit_file: file_name(&transmit_path),
        })
    }

    /// Write the run manifest
    pub fn write_manifest(&self, manifest: &Manifest) -> Result<PathBuf, InterfaceError> {
        let path = self.directory.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
        info!(
            "Wrote manifest with {} entries to {}",
            manifest.entries.len(),
            path.display()
        );
        Ok(path)
    }

    fn path_for(&self, name: &str, extension: &str) -> Result<PathBuf, InterfaceError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(InterfaceError::InvalidConfig(format!("Invalid artifact name: {:?}", name)));
        }
        Ok(self.directory.join(format!("{}.{}", name, extension)))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert complex samples to raw bytes (little-endian f64 pairs)
pub fn samples_to_bytes(samples: &[Complex64]) -> Bytes {
    let mut bytes = BytesMut::with_capacity(samples.len() * SAMPLE_BYTES);
    for sample in samples {
        bytes.put_f64_le(sample.re);
        bytes.put_f64_le(sample.im);
    }
    bytes.freeze()
}

/// Convert raw bytes back to complex samples; a trailing partial sample is ignored
pub fn bytes_to_samples(mut bytes: &[u8]) -> Vec<Complex64> {
    let mut samples = Vec::with_capacity(bytes.len() / SAMPLE_BYTES);
    while bytes.remaining() >= SAMPLE_BYTES {
        let re = bytes.get_f64_le();
        let im = bytes.get_f64_le();
        samples.push(Complex64::new(re, im));
    }
    samples
}

/// Read a raw sample file
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<Complex64>, InterfaceError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    if bytes.len() % SAMPLE_BYTES != 0 {
        return Err(InterfaceError::InvalidSampleFile {
            path: path.display().to_string(),
            len: bytes.len(),
        });
    }
    Ok(bytes_to_samples(&bytes))
}

/// Read a manifest written by [`ArtifactWriter::write_manifest`]
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Manifest, InterfaceError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::utils::random_bits;
    use phy::Transmitter;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ofdm-artifacts-{}-{}", std::process::id(), tag));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_sample_bytes_layout() {
        let bytes = samples_to_bytes(&[Complex64::new(1.0, -2.0)]);
        assert_eq!(bytes.len(), SAMPLE_BYTES);
        assert_eq!(&bytes[..8], &1.0f64.to_le_bytes());
        assert_eq!(&bytes[8..], &(-2.0f64).to_le_bytes());
    }

    #[test]
    fn test_invalid_sample_file() {
        let dir = scratch_dir("truncated");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("short.cf64");
        fs::write(&path, [0u8; 20]).unwrap();

        assert!(matches!(
            read_samples(&path),
            Err(InterfaceError::InvalidSampleFile { len: 20, .. })
        ));
        assert_eq!(bytes_to_samples(&[0u8; 20]).len(), 1);
        assert!(bytes_to_samples(&[]).is_empty());
    }

    #[test]
    fn test_invalid_artifact_name() {
        let writer = ArtifactWriter::new(scratch_dir("names")).unwrap();
        for name in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                writer.write_symbols(name, &[]),
                Err(InterfaceError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_write_bits() {
        let writer = ArtifactWriter::new(scratch_dir("bits")).unwrap();
        let bits: BitStream = "1010101011".parse().unwrap();
        let path = writer.write_bits("bitstream", &bits).unwrap();
        assert_eq!(fs::read(path).unwrap(), vec![0xAA, 0xC0]);
    }

    #[test]
    fn test_write_transmission_and_manifest() {
        let dir = scratch_dir("transmission");
        let writer = ArtifactWriter::new(&dir).unwrap();

        let config = TransmitConfig {
            fft_size: 64,
            prefix_length: 16,
            ..Default::default()
        };
        let transmitter = Transmitter::new(config.clone()).unwrap();
        let bits = random_bits(64 * 6 + 60, 9);
        let transmission = transmitter.transmit(&bits).unwrap();

        let entry = writer.write_transmission(&transmission).unwrap();
        assert_eq!(entry.scheme, ModulationScheme::Qam64);
        assert_eq!(entry.symbol_count, 74);
        assert_eq!(entry.block_count, 2);
        assert_eq!(entry.padding, 54);
        assert_eq!(entry.samples_per_symbol, 80);
        assert_eq!(entry.total_samples, 160);
        assert_eq!(entry.symbols_file, "64QAM.cf64");
        assert_eq!(entry.transmit_file, "64QAM_tx.cf64");

        let symbols = read_samples(dir.join(&entry.symbols_file)).unwrap();
        assert_eq!(symbols, transmission.symbols());

        let serial = read_samples(dir.join(&entry.transmit_file)).unwrap();
        assert_eq!(serial, transmission.buffer().to_samples());

        let mut manifest = Manifest::new(&config, bits.len());
        manifest.entries.push(entry);
        let path = writer.write_manifest(&manifest).unwrap();

        let loaded = read_manifest(path).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.sample_rate_hz, 3_840_000.0);
    }
}
