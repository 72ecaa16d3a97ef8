//! Reference gzip codec.
//!
//! [`GzipOracle`] delegates to `flate2`, which the harness trusts: whatever it
//! decodes defines the expected output, and whatever it encodes is by
//! definition a valid test input. A failure here is never blamed on the
//! subject; it surfaces as [`HarnessError::Environment`].

use std::io::{Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::config::ORACLE_LEVEL_DEFAULT;
use crate::error::HarnessError;

/// Trusted compress/decompress capability.
pub trait Oracle {
    /// Decode a complete gzip stream (all members).
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, HarnessError>;

    /// Encode `data` as a single-member gzip stream.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, HarnessError>;
}

/// `flate2`-backed oracle.
///
/// Headers carry a zero modification time, so equal payloads always compress
/// to equal bytes.
#[derive(Debug, Clone, Copy)]
pub struct GzipOracle {
    level: Compression,
}

impl GzipOracle {
    /// Oracle compressing at `level` (clamped to 0..=9).
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for GzipOracle {
    fn default() -> Self {
        Self::new(ORACLE_LEVEL_DEFAULT)
    }
}

impl Oracle for GzipOracle {
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, HarnessError> {
        let mut out = Vec::new();
        MultiGzDecoder::new(input)
            .read_to_end(&mut out)
            .map_err(|source| HarnessError::Environment {
                operation: "decompress",
                source,
            })?;
        Ok(out)
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, HarnessError> {
        let wrap = |source| HarnessError::Environment {
            operation: "compress",
            source,
        };
        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 64), self.level);
        encoder.write_all(data).map_err(wrap)?;
        encoder.finish().map_err(wrap)
    }
}
