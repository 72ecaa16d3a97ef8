//! Comparison against the oracle and failure capture.
//!
//! [`Checker::check`] runs the subject once and demands byte equality with
//! the expected output. When built with a [`FailureDump`], a failing input is
//! written to the dump file before the failure is returned, unchanged, to the
//! caller. There is no retry and no aggregation: the first failure ends the
//! bundle.

use std::fs;
use std::path::{Path, PathBuf};

use xxhash_rust::xxh64::xxh64;

use crate::displaylevel;
use crate::error::HarnessError;
use crate::subject::{BinaryVariant, Subject};

/// Compare `actual` with `expected` byte for byte.
pub fn compare(expected: &[u8], actual: &[u8]) -> Result<(), HarnessError> {
    if expected == actual {
        return Ok(());
    }
    let first_difference = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| Some(expected.len().min(actual.len())));
    Err(HarnessError::OutputMismatch {
        expected_len: expected.len(),
        actual_len: actual.len(),
        first_difference,
    })
}

/// xxh64 fingerprint used to tell failing inputs apart in diagnostics.
pub fn fingerprint(data: &[u8]) -> u64 {
    xxh64(data, 0)
}

/// Fixed-path file holding the most recent failing input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDump {
    path: PathBuf,
}

impl FailureDump {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the dump file with `input`.
    pub fn write(&self, input: &[u8]) -> Result<(), HarnessError> {
        fs::write(&self.path, input).map_err(|source| HarnessError::Dump {
            path: self.path.clone(),
            source,
        })
    }
}

/// Runs cases against a subject.
pub struct Checker<'a> {
    subject: &'a dyn Subject,
    dump: Option<&'a FailureDump>,
}

impl<'a> Checker<'a> {
    /// Checker without failure capture.
    pub fn new(subject: &'a dyn Subject) -> Self {
        Self { subject, dump: None }
    }

    /// Capture failing inputs in `dump`.
    pub fn with_dump(mut self, dump: &'a FailureDump) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Decompress `input` with the subject and require `expected` back.
    ///
    /// `label` names the case in diagnostics.
    pub fn check(
        &self,
        label: &str,
        input: &[u8],
        expected: &[u8],
        variant: BinaryVariant,
    ) -> Result<(), HarnessError> {
        displaylevel!(
            4,
            "{}: {} input bytes (xxh64 {:016x}), {} expected bytes\n",
            label,
            input.len(),
            fingerprint(input),
            expected.len()
        );
        let result = self
            .subject
            .decompress(input, variant)
            .and_then(|actual| compare(expected, &actual));

        if let (Err(err), Some(dump)) = (&result, self.dump) {
            displaylevel!(1, "{}: check failed: {}\n", label, err);
            self.capture(dump, input);
        }
        result
    }

    fn capture(&self, dump: &FailureDump, input: &[u8]) {
        match dump.write(input) {
            Ok(()) => displaylevel!(
                1,
                "check failed, wrote problematic data to {} ({} bytes, xxh64 {:016x})\n",
                dump.path().display(),
                input.len(),
                fingerprint(input)
            ),
            // The subject failure stays the reported error.
            Err(err) => displaylevel!(1, "{:#}\n", anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Echo;

    impl Subject for Echo {
        fn decompress(&self, input: &[u8], _: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
            Ok(input.to_vec())
        }
    }

    struct Crashing(Cell<usize>);

    impl Subject for Crashing {
        fn decompress(&self, _: &[u8], _: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
            self.0.set(self.0.get() + 1);
            Err(HarnessError::SubjectCrashed {
                code: Some(101),
                stderr: "panicked".into(),
            })
        }
    }

    #[test]
    fn compare_equal() {
        assert!(compare(b"abc", b"abc").is_ok());
        assert!(compare(b"", b"").is_ok());
    }

    #[test]
    fn compare_reports_first_difference() {
        match compare(b"abcdef", b"abXdef").unwrap_err() {
            HarnessError::OutputMismatch {
                expected_len,
                actual_len,
                first_difference,
            } => {
                assert_eq!((expected_len, actual_len), (6, 6));
                assert_eq!(first_difference, Some(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn compare_length_mismatch_points_past_common_prefix() {
        match compare(b"abc", b"abcd").unwrap_err() {
            HarnessError::OutputMismatch { first_difference, .. } => {
                assert_eq!(first_difference, Some(3))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(compare(b"abc", b"").is_err());
    }

    #[test]
    fn passing_case_leaves_no_dump() {
        let dir = tempfile::tempdir().unwrap();
        let dump = FailureDump::new(dir.path().join("dump.gz"));
        let checker = Checker::new(&Echo).with_dump(&dump);
        checker.check("case #1", b"same", b"same", BinaryVariant::Release).unwrap();
        assert!(!dump.path().exists());
    }

    #[test]
    fn crash_is_dumped_and_returned() {
        let dir = tempfile::tempdir().unwrap();
        let dump = FailureDump::new(dir.path().join("dump.gz"));
        let subject = Crashing(Cell::new(0));
        let checker = Checker::new(&subject).with_dump(&dump);
        let err = checker
            .check("case #7", b"\x1f\x8b input", b"out", BinaryVariant::Release)
            .unwrap_err();
        assert!(matches!(err, HarnessError::SubjectCrashed { code: Some(101), .. }));
        assert_eq!(subject.0.get(), 1, "no retries");
        assert_eq!(fs::read(dump.path()).unwrap(), b"\x1f\x8b input");
    }

    #[test]
    fn unwritable_dump_keeps_subject_error() {
        let dir = tempfile::tempdir().unwrap();
        let dump = FailureDump::new(dir.path().join("missing-dir").join("dump.gz"));
        let checker = Checker::new(&Echo).with_dump(&dump);
        let err = checker.check("c", b"in", b"other", BinaryVariant::Release).unwrap_err();
        assert!(matches!(err, HarnessError::OutputMismatch { .. }));
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
    }
}
