// Dispatcher behavior with in-process subjects.
//
// Random bundles are shrunk to a handful of small payloads so every test runs
// in milliseconds; seeds stay canonical.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;

use gzcheck::config::{BIG_RANDOM, SMALL_RANDOM};
use gzcheck::{
    BinaryVariant, Bundle, GzipOracle, Harness, HarnessConfig, HarnessError, Oracle, RandomCaseSpec,
    Selection, Subject,
};
use tempfile::TempDir;

// ─────────────────────────────────────────────────────────────────────────────
// Fake subjects
// ─────────────────────────────────────────────────────────────────────────────

/// Decodes correctly, recording every call's variant.
#[derive(Default)]
struct Correct {
    variants: RefCell<Vec<BinaryVariant>>,
}

impl Subject for Correct {
    fn decompress(&self, input: &[u8], variant: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
        self.variants.borrow_mut().push(variant);
        GzipOracle::default().decompress(input)
    }
}

/// Decodes correctly except on the `fail_on`-th call (1-based), where the
/// last output byte is flipped.
struct FailsOnCall {
    fail_on: usize,
    calls: Cell<usize>,
}

impl FailsOnCall {
    fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Cell::new(0),
        }
    }
}

impl Subject for FailsOnCall {
    fn decompress(&self, input: &[u8], _variant: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
        let n = self.calls.get() + 1;
        self.calls.set(n);
        let mut out = GzipOracle::default().decompress(input)?;
        if n == self.fail_on {
            if let Some(last) = out.last_mut() {
                *last ^= 0xff;
            }
        }
        Ok(out)
    }
}

struct Crashing;

impl Subject for Crashing {
    fn decompress(&self, _input: &[u8], _variant: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
        Err(HarnessError::SubjectCrashed {
            code: Some(101),
            stderr: "panicked at 'bad block type'".into(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

const TINY_SMALL: RandomCaseSpec = RandomCaseSpec {
    count: 5,
    block_len: 64,
    ..SMALL_RANDOM
};

const TINY_BIG: RandomCaseSpec = RandomCaseSpec {
    count: 2,
    block_len: 32,
    repeat: 4,
    ..BIG_RANDOM
};

fn project_with_corpus(files: &[(&str, &str)]) -> (TempDir, HarnessConfig) {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("data").join("ok");
    fs::create_dir_all(&corpus).unwrap();
    let oracle = GzipOracle::default();
    for (name, payload) in files {
        fs::write(corpus.join(name), oracle.compress(payload.as_bytes()).unwrap()).unwrap();
    }
    let mut config = HarnessConfig::new(tmp.path(), &tmp.path().join("target"));
    config.small_random = TINY_SMALL;
    config.big_random = TINY_BIG;
    (tmp, config)
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ─────────────────────────────────────────────────────────────────────────────
// Static bundle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn static_bundle_checks_every_corpus_file() {
    let (_tmp, config) = project_with_corpus(&[("a.gz", "alpha"), ("b.gz", ""), ("c.gz", "gamma gamma")]);
    let oracle = GzipOracle::default();
    let subject = Correct::default();
    let harness = Harness::new(&config, &oracle, &subject);

    let reports = harness.run(Selection::One(Bundle::StaticCorpus)).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].bundle, Bundle::StaticCorpus);
    assert_eq!(reports[0].cases, 3);
    assert_eq!(subject.variants.borrow().len(), 3);
}

#[test]
fn static_failure_names_file_and_writes_no_dump() {
    let (tmp, config) = project_with_corpus(&[("a.gz", "alpha"), ("b.gz", "beta")]);
    let oracle = GzipOracle::default();
    let subject = FailsOnCall::new(2);
    let harness = Harness::new(&config, &oracle, &subject);

    let err = harness.run(Selection::One(Bundle::StaticCorpus)).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("tests bundle #1 (static cases) failed"), "{chain}");
    assert!(chain.contains("b.gz"), "{chain}");
    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::OutputMismatch {
            expected_len: 4,
            actual_len: 4,
            first_difference: Some(3)
        })
    ));
    assert!(!config.dump_path.exists());
    assert_eq!(entries(tmp.path()), ["data"]);
}

#[test]
fn empty_corpus_passes_with_zero_cases() {
    let (_tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let subject = Crashing;
    let harness = Harness::new(&config, &oracle, &subject);

    let report = harness.run_bundle(Bundle::StaticCorpus).unwrap();
    assert_eq!(report.cases, 0);
}

#[test]
fn missing_corpus_is_an_environment_failure() {
    let tmp = TempDir::new().unwrap();
    let config = HarnessConfig::new(tmp.path(), tmp.path());
    let oracle = GzipOracle::default();
    let subject = Correct::default();
    let harness = Harness::new(&config, &oracle, &subject);

    let err = harness.run_bundle(Bundle::StaticCorpus).unwrap_err();
    let inner = err.downcast_ref::<HarnessError>().unwrap();
    assert!(matches!(inner, HarnessError::Corpus { .. }));
    assert!(!inner.is_subject_failure());
}

// ─────────────────────────────────────────────────────────────────────────────
// Random bundles
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn small_random_passes_all_cases_without_dump() {
    let (tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let subject = Correct::default();
    let harness = Harness::new(&config, &oracle, &subject);

    let report = harness.run_bundle(Bundle::SmallRandom).unwrap();
    assert_eq!(report.cases, 5);
    assert_eq!(entries(tmp.path()), ["data"]);
}

#[test]
fn small_random_failure_dumps_the_failing_input() {
    let (tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let subject = FailsOnCall::new(3);
    let harness = Harness::new(&config, &oracle, &subject);

    let err = harness.run_bundle(Bundle::SmallRandom).unwrap_err();
    assert_eq!(subject.calls.get(), 3, "stops at the first failing case");

    let chain = format!("{err:#}");
    assert!(chain.contains("small random case #3"), "{chain}");
    assert!(chain.contains("seed 23546262367"), "{chain}");

    let third = TINY_SMALL.payloads().nth(2).unwrap();
    let dumped = fs::read(&config.dump_path).unwrap();
    assert_eq!(dumped, oracle.compress(&third).unwrap());
    assert_eq!(oracle.decompress(&dumped).unwrap(), third);
    assert_eq!(entries(tmp.path()), ["data", "dump.gz"]);
}

#[test]
fn dump_is_overwritten_by_later_failures() {
    let (_tmp, config) = project_with_corpus(&[]);
    fs::write(&config.dump_path, b"stale").unwrap();
    let oracle = GzipOracle::default();
    let subject = FailsOnCall::new(1);
    let harness = Harness::new(&config, &oracle, &subject);

    harness.run_bundle(Bundle::SmallRandom).unwrap_err();
    let first = TINY_SMALL.payloads().next().unwrap();
    assert_eq!(fs::read(&config.dump_path).unwrap(), oracle.compress(&first).unwrap());
}

#[test]
fn crash_is_reported_with_subject_stderr() {
    let (_tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let harness = Harness::new(&config, &oracle, &Crashing);

    let err = harness.run_bundle(Bundle::BigRandom).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("big random case #1"), "{chain}");
    assert!(chain.contains("exit code 101"), "{chain}");
    assert!(chain.contains("bad block type"), "{chain}");
    assert!(config.dump_path.exists());
}

#[test]
fn big_random_always_uses_release_build() {
    let (_tmp, mut config) = project_with_corpus(&[("a.gz", "alpha")]);
    config.variant = BinaryVariant::Debug;
    let oracle = GzipOracle::default();
    let subject = Correct::default();
    let harness = Harness::new(&config, &oracle, &subject);

    harness.run(Selection::All).unwrap();
    let variants = subject.variants.borrow();
    // 1 static + 5 small on debug, then 2 big on release.
    assert_eq!(variants.len(), 8);
    assert!(variants[..6].iter().all(|v| *v == BinaryVariant::Debug));
    assert!(variants[6..].iter().all(|v| *v == BinaryVariant::Release));
}

#[test]
fn big_payloads_are_tiled_blocks() {
    let (_tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let seen = RefCell::new(Vec::new());

    struct Capture<'a>(&'a RefCell<Vec<Vec<u8>>>);
    impl Subject for Capture<'_> {
        fn decompress(&self, input: &[u8], _variant: BinaryVariant) -> Result<Vec<u8>, HarnessError> {
            let out = GzipOracle::default().decompress(input)?;
            self.0.borrow_mut().push(out.clone());
            Ok(out)
        }
    }

    let subject = Capture(&seen);
    Harness::new(&config, &oracle, &subject)
        .run_bundle(Bundle::BigRandom)
        .unwrap();
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    for payload in seen.iter() {
        assert_eq!(payload.len(), 128);
        assert!(payload.chunks(32).all(|c| c == &payload[..32]));
    }
    assert_ne!(seen[0], seen[1]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Run-all and replay
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn run_all_reports_each_bundle_in_order() {
    let (_tmp, config) = project_with_corpus(&[("a.gz", "alpha"), ("b.gz", "beta")]);
    let oracle = GzipOracle::default();
    let subject = Correct::default();
    let harness = Harness::new(&config, &oracle, &subject);

    let reports = harness.run(Selection::All).unwrap();
    let summary: Vec<(Bundle, usize)> = reports.iter().map(|r| (r.bundle, r.cases)).collect();
    assert_eq!(
        summary,
        [
            (Bundle::StaticCorpus, 2),
            (Bundle::SmallRandom, 5),
            (Bundle::BigRandom, 2)
        ]
    );
}

#[test]
fn run_all_stops_at_first_failing_bundle() {
    let (_tmp, config) = project_with_corpus(&[("a.gz", "alpha")]);
    let oracle = GzipOracle::default();
    let subject = FailsOnCall::new(1);
    let harness = Harness::new(&config, &oracle, &subject);

    let err = harness.run(Selection::All).unwrap_err();
    assert!(format!("{err:#}").contains("tests bundle #1"));
    assert_eq!(subject.calls.get(), 1);
    assert!(!config.dump_path.exists());
}

#[test]
fn replay_checks_one_file_without_dumping() {
    let (tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let input = tmp.path().join("case.gz");
    fs::write(&input, oracle.compress(b"replayed payload").unwrap()).unwrap();

    let good = Correct::default();
    Harness::new(&config, &oracle, &good).replay(&input).unwrap();

    let bad = FailsOnCall::new(1);
    let err = Harness::new(&config, &oracle, &bad).replay(&input).unwrap_err();
    assert!(format!("{err:#}").contains("replay of"));
    assert!(!config.dump_path.exists());
}

#[test]
fn replay_of_missing_file_fails() {
    let (tmp, config) = project_with_corpus(&[]);
    let oracle = GzipOracle::default();
    let subject = Correct::default();
    let err = Harness::new(&config, &oracle, &subject)
        .replay(&tmp.path().join("absent.gz"))
        .unwrap_err();
    assert!(format!("{err:#}").contains("cannot read"));
    assert!(subject.variants.borrow().is_empty());
}
