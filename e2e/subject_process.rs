// e2e/subject_process.rs: ProcessSubject against the real `ref-gunzip` binary
//
// Exercises the child-process plumbing: stdin feeding, stdout collection for
// large outputs, exit-status mapping and stderr capture.

use std::fs;
use std::path::PathBuf;

use gzcheck::config::SMALL_RANDOM;
use gzcheck::util::list_corpus;
use gzcheck::{BinaryVariant, GzipOracle, HarnessError, Oracle, ProcessSubject, Subject, SubjectPaths};
use tempfile::TempDir;

fn ref_gunzip() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ref-gunzip"))
}

fn subject() -> ProcessSubject {
    ProcessSubject::new(SubjectPaths::single(ref_gunzip()))
}

// ── 1. Round trips ───────────────────────────────────────────────────────────

#[test]
fn test_subject_text_roundtrip() {
    let payload = "Hello, gzip!\n".repeat(300);
    let input = GzipOracle::default().compress(payload.as_bytes()).unwrap();
    let out = subject().decompress(&input, BinaryVariant::Release).unwrap();
    assert_eq!(out, payload.as_bytes());
}

#[test]
fn test_subject_empty_payload() {
    let input = GzipOracle::default().compress(b"").unwrap();
    let out = subject().decompress(&input, BinaryVariant::Debug).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_subject_canonical_small_case() {
    let payload = SMALL_RANDOM.payloads().next().unwrap();
    let input = GzipOracle::default().compress(&payload).unwrap();
    let out = subject().decompress(&input, BinaryVariant::Release).unwrap();
    assert_eq!(out, payload);
}

// ── 2. Large output does not deadlock the pipes ──────────────────────────────

#[test]
fn test_subject_ten_megabyte_output() {
    let block: Vec<u8> = (0..10_000u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
    let payload = block.repeat(1000);
    let input = GzipOracle::new(1).compress(&payload).unwrap();
    let out = subject().decompress(&input, BinaryVariant::Release).unwrap();
    assert_eq!(out.len(), 10_000_000);
    assert!(out == payload, "10 MB output differs");
}

// ── 3. Multi-member streams ──────────────────────────────────────────────────

#[test]
fn test_subject_concatenated_members() {
    let oracle = GzipOracle::default();
    let mut input = oracle.compress(b"first member, ").unwrap();
    input.extend(oracle.compress(b"second member").unwrap());
    let out = subject().decompress(&input, BinaryVariant::Release).unwrap();
    assert_eq!(out, b"first member, second member");
}

// ── 4. Failure mapping ───────────────────────────────────────────────────────

#[test]
fn test_subject_corrupt_input_is_a_crash() {
    let mut input = GzipOracle::default().compress(b"some payload to damage").unwrap();
    let n = input.len();
    // Break the CRC32 trailer.
    input[n - 8] ^= 0xff;
    let err = subject().decompress(&input, BinaryVariant::Release).unwrap_err();
    match err {
        HarnessError::SubjectCrashed { code, stderr } => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("ref-gunzip"), "stderr: {stderr}");
        }
        other => panic!("expected SubjectCrashed, got {other:?}"),
    }
}

#[test]
fn test_subject_not_gzip_is_a_crash() {
    let err = subject()
        .decompress(b"this is not gzip", BinaryVariant::Release)
        .unwrap_err();
    assert!(matches!(err, HarnessError::SubjectCrashed { .. }), "{err:?}");
    assert!(err.is_subject_failure());
}

#[test]
fn test_subject_variant_selects_binary() {
    let paths = SubjectPaths {
        debug: PathBuf::from("/nonexistent/debug/ref-gunzip"),
        release: ref_gunzip(),
    };
    let subject = ProcessSubject::new(paths);
    let input = GzipOracle::default().compress(b"x").unwrap();
    assert_eq!(subject.decompress(&input, BinaryVariant::Release).unwrap(), b"x");
    assert!(matches!(
        subject.decompress(&input, BinaryVariant::Debug),
        Err(HarnessError::SubjectIo { .. })
    ));
}

// ── 5. Corpus files ──────────────────────────────────────────────────────────

#[test]
fn test_subject_matches_oracle_on_corpus() {
    let dir = TempDir::new().unwrap();
    let oracle = GzipOracle::new(6);
    let payloads: [&[u8]; 3] = [b"", b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", b"The quick brown fox"];
    for (i, payload) in payloads.iter().enumerate() {
        fs::write(dir.path().join(format!("{i}.gz")), oracle.compress(payload).unwrap()).unwrap();
    }

    let files = list_corpus(dir.path()).unwrap();
    assert_eq!(files.len(), 3);
    for path in files {
        let input = fs::read(&path).unwrap();
        let expected = oracle.decompress(&input).unwrap();
        let actual = subject().decompress(&input, BinaryVariant::Release).unwrap();
        assert_eq!(actual, expected, "{}", path.display());
    }
}
