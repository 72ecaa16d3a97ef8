//! Test case generation.
//!
//! Three sources, one per bundle:
//!
//! | Source             | Input                         | Expected output          |
//! |--------------------|-------------------------------|--------------------------|
//! | [`load_static_case`] | corpus file, verbatim       | oracle decompression     |
//! | [`RandomPayloads`] (small) | oracle compression of random bytes | the random bytes |
//! | [`RandomPayloads`] (big)   | oracle compression of a tiled random block | the tiled bytes |
//!
//! Random payloads come from [`PyRandom`], so a given [`RandomCaseSpec`]
//! always yields the same byte sequence.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HarnessError;
use crate::oracle::Oracle;
use crate::random::PyRandom;

/// Shape of a random bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomCaseSpec {
    /// Seed handed to [`PyRandom::new`].
    pub seed: u64,
    /// Number of cases.
    pub count: usize,
    /// Bytes drawn from the generator per case.
    pub block_len: usize,
    /// How many times the drawn block is tiled to form the payload.
    pub repeat: usize,
}

impl RandomCaseSpec {
    /// Uncompressed size of every payload.
    pub fn payload_len(&self) -> usize {
        self.block_len * self.repeat
    }

    /// Payload iterator for this spec, starting from a fresh seed.
    pub fn payloads(&self) -> RandomPayloads {
        RandomPayloads::new(*self)
    }
}

/// Uncompressed random payloads for a [`RandomCaseSpec`], in case order.
#[derive(Debug, Clone)]
pub struct RandomPayloads {
    rng: PyRandom,
    spec: RandomCaseSpec,
    produced: usize,
}

impl RandomPayloads {
    pub fn new(spec: RandomCaseSpec) -> Self {
        Self {
            rng: PyRandom::new(spec.seed),
            spec,
            produced: 0,
        }
    }
}

impl Iterator for RandomPayloads {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.produced >= self.spec.count {
            return None;
        }
        self.produced += 1;
        let block = self.rng.bytes(self.spec.block_len);
        if self.spec.repeat == 1 {
            Some(block)
        } else {
            Some(block.repeat(self.spec.repeat))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.spec.count - self.produced;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RandomPayloads {}

/// A corpus file paired with what the oracle makes of it.
#[derive(Debug, Clone)]
pub struct StaticCase {
    pub path: PathBuf,
    pub input: Vec<u8>,
    pub expected: Vec<u8>,
}

/// Read one corpus file and decode it with the oracle.
pub fn load_static_case(path: &Path, oracle: &dyn Oracle) -> Result<StaticCase, HarnessError> {
    let input = fs::read(path).map_err(|source| HarnessError::Corpus {
        path: path.to_path_buf(),
        source,
    })?;
    let expected = oracle.decompress(&input)?;
    Ok(StaticCase {
        path: path.to_path_buf(),
        input,
        expected,
    })
}

/// A generated payload and its compressed form.
#[derive(Debug, Clone)]
pub struct RandomCase {
    /// 1-based position within the bundle.
    pub number: usize,
    pub input: Vec<u8>,
    pub expected: Vec<u8>,
}

impl RandomCase {
    /// Compress `payload` with the oracle; the payload itself is the
    /// expected output.
    pub fn compress(number: usize, payload: Vec<u8>, oracle: &dyn Oracle) -> Result<Self, HarnessError> {
        let input = oracle.compress(&payload)?;
        Ok(Self {
            number,
            input,
            expected: payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::GzipOracle;

    const TINY: RandomCaseSpec = RandomCaseSpec {
        seed: 99,
        count: 3,
        block_len: 16,
        repeat: 4,
    };

    #[test]
    fn yields_count_payloads_of_payload_len() {
        let payloads: Vec<Vec<u8>> = TINY.payloads().collect();
        assert_eq!(payloads.len(), 3);
        assert!(payloads.iter().all(|p| p.len() == TINY.payload_len()));
        assert_eq!(TINY.payloads().len(), 3);
    }

    #[test]
    fn tiled_payload_repeats_first_block() {
        let payload = TINY.payloads().next().unwrap();
        for chunk in payload.chunks(16) {
            assert_eq!(chunk, &payload[..16]);
        }
    }

    #[test]
    fn cases_draw_fresh_blocks() {
        let payloads: Vec<Vec<u8>> = TINY.payloads().collect();
        assert_ne!(payloads[0], payloads[1]);
        assert_ne!(payloads[1], payloads[2]);
    }

    #[test]
    fn tiling_consumes_one_block_of_randomness() {
        // The generator draws block_len bytes per case regardless of repeat.
        let untiled = RandomCaseSpec { repeat: 1, ..TINY };
        let a: Vec<Vec<u8>> = TINY.payloads().collect();
        let b: Vec<Vec<u8>> = untiled.payloads().collect();
        for (tiled, block) in a.iter().zip(&b) {
            assert_eq!(&tiled[..16], &block[..]);
        }
    }

    #[test]
    fn zero_count_is_empty() {
        let spec = RandomCaseSpec { count: 0, ..TINY };
        assert_eq!(spec.payloads().count(), 0);
    }

    #[test]
    fn random_case_keeps_payload_as_expected() {
        let oracle = GzipOracle::default();
        let payload = TINY.payloads().next().unwrap();
        let case = RandomCase::compress(1, payload.clone(), &oracle).unwrap();
        assert_eq!(case.number, 1);
        assert_eq!(case.expected, payload);
        assert_eq!(oracle.decompress(&case.input).unwrap(), payload);
    }
}
