// e2e/harness_cli.rs: `gzcheck` as a black-box CLI
//
// Each test builds a throwaway project root (data/ok plus whatever the case
// needs) and points the harness at `ref-gunzip` or at a system tool standing
// in for a broken decompressor. Covers bundle selection, exit codes, progress
// lines and dump handling.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use gzcheck::config::SMALL_RANDOM;
use gzcheck::{GzipOracle, Oracle};
use tempfile::TempDir;

fn gzcheck_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gzcheck"))
}

fn ref_gunzip() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ref-gunzip"))
}

/// Project root with the given `(name, payload)` pairs gzipped into data/ok.
fn make_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("data").join("ok");
    fs::create_dir_all(&corpus).unwrap();
    let oracle = GzipOracle::default();
    for (name, payload) in files {
        fs::write(corpus.join(name), oracle.compress(payload.as_bytes()).unwrap()).unwrap();
    }
    dir
}

fn run_gzcheck(root: &Path, subject: &Path, extra: &[&str]) -> Output {
    Command::new(gzcheck_bin())
        .arg("--root")
        .arg(root)
        .arg("--release-binary")
        .arg(subject)
        .args(extra)
        .env_remove("GZCHECK_CLEVEL")
        .output()
        .expect("failed to run gzcheck")
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── 1. Passing runs ──────────────────────────────────────────────────────────

#[test]
fn test_cli_static_bundle_passes() {
    let dir = make_project(&[("b.gz", "beta"), ("a.gz", "alpha"), ("c.gz", "")]);
    let out = run_gzcheck(dir.path(), &ref_gunzip(), &["1"]);
    let err = stderr_of(&out);
    assert!(out.status.success(), "stderr: {err}");

    let checked: Vec<&str> = err.lines().filter(|l| l.starts_with("checking file")).collect();
    assert_eq!(checked.len(), 3, "stderr: {err}");
    assert!(checked[0].ends_with("a.gz'"));
    assert!(checked[1].ends_with("b.gz'"));
    assert!(checked[2].ends_with("c.gz'"));
    assert!(err.contains("all checks passed: 1 bundle(s), 3 case(s)"), "stderr: {err}");
    assert!(!err.contains("Running tests bundle"), "single bundle has no banner");
}

#[test]
fn test_cli_small_random_bundle_passes() {
    let dir = make_project(&[]);
    let out = run_gzcheck(dir.path(), &ref_gunzip(), &["2"]);
    let err = stderr_of(&out);
    assert!(out.status.success(), "stderr: {err}");
    assert!(err.contains("testing small random data, case #1\n"));
    assert!(err.contains("testing small random data, case #100\n"));
    assert!(!err.contains("case #101"));
    assert!(!dir.path().join("dump.gz").exists());
}

#[test]
fn test_cli_quiet_suppresses_progress() {
    let dir = make_project(&[("a.gz", "alpha")]);
    let out = run_gzcheck(dir.path(), &ref_gunzip(), &["1", "-q"]);
    assert!(out.status.success());
    assert!(!stderr_of(&out).contains("checking file"));
}

#[test]
fn test_cli_replay_passes() {
    let dir = make_project(&[]);
    let case = dir.path().join("case.gz");
    fs::write(&case, GzipOracle::default().compress(b"replay me").unwrap()).unwrap();
    let out = run_gzcheck(dir.path(), &ref_gunzip(), &["--replay", case.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stderr_of(&out).contains("replay passed"));
}

#[test]
fn test_cli_help_exits_zero() {
    let out = Command::new(gzcheck_bin()).arg("--help").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("--replay"));
    assert!(text.contains("BUNDLE"));
}

#[test]
fn test_cli_unknown_flag_is_usage_error() {
    let out = Command::new(gzcheck_bin()).arg("--no-such-flag").output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

// ── 2. Failing runs ──────────────────────────────────────────────────────────

#[test]
fn test_cli_missing_subject_fails() {
    let dir = make_project(&[("a.gz", "alpha")]);
    let missing = dir.path().join("no-such-subject");
    let out = run_gzcheck(dir.path(), &missing, &["1"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr_of(&out);
    assert!(err.contains("gzcheck: subject failure:"), "stderr: {err}");
    assert!(err.contains("cannot communicate with subject"), "stderr: {err}");
}

#[test]
fn test_cli_missing_corpus_is_harness_error() {
    let dir = TempDir::new().unwrap();
    let out = run_gzcheck(dir.path(), &ref_gunzip(), &["1"]);
    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(1), "stderr: {err}");
    assert!(err.contains("gzcheck: harness error:"), "stderr: {err}");
    assert!(err.contains("cannot read corpus entry"), "stderr: {err}");
}

#[cfg(unix)]
#[test]
fn test_cli_crashing_subject_dumps_first_case() {
    let dir = make_project(&[]);
    let out = run_gzcheck(dir.path(), Path::new("false"), &["2"]);
    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(1), "stderr: {err}");
    assert!(err.contains("subject crashed"), "stderr: {err}");
    assert!(err.contains("wrote problematic data to"), "stderr: {err}");
    assert!(err.contains("small random case #1"), "stderr: {err}");

    let first = SMALL_RANDOM.payloads().next().unwrap();
    let dumped = fs::read(dir.path().join("dump.gz")).unwrap();
    assert_eq!(dumped, GzipOracle::default().compress(&first).unwrap());
    assert_eq!(entries(dir.path()), ["data", "dump.gz"]);
}

#[cfg(unix)]
#[test]
fn test_cli_wrong_output_is_mismatch() {
    // `echo -d` ignores stdin and prints "-d".
    let dir = make_project(&[]);
    let out = run_gzcheck(dir.path(), Path::new("echo"), &["2"]);
    let err = stderr_of(&out);
    assert_eq!(out.status.code(), Some(1), "stderr: {err}");
    assert!(err.contains("incorrect output"), "stderr: {err}");
    assert!(dir.path().join("dump.gz").exists());
}

#[cfg(unix)]
#[test]
fn test_cli_static_failure_writes_no_dump() {
    let dir = make_project(&[("a.gz", "alpha")]);
    let out = run_gzcheck(dir.path(), Path::new("false"), &["1"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("a.gz"));
    assert!(!dir.path().join("dump.gz").exists());
}

#[cfg(unix)]
#[test]
fn test_cli_run_all_stops_at_first_failing_bundle() {
    for selector in [None, Some("7"), Some("-1")] {
        let dir = make_project(&[("a.gz", "alpha")]);
        let extra: Vec<&str> = selector.into_iter().collect();
        let out = run_gzcheck(dir.path(), Path::new("false"), &extra);
        let err = stderr_of(&out);
        assert_eq!(out.status.code(), Some(1), "stderr: {err}");
        assert!(err.contains("Running tests bundle #1"), "stderr: {err}");
        assert!(!err.contains("Running tests bundle #2"), "stderr: {err}");
    }
}

#[cfg(unix)]
#[test]
fn test_cli_custom_dump_path() {
    let dir = make_project(&[]);
    let dump = dir.path().join("failures").join("latest.gz");
    fs::create_dir_all(dump.parent().unwrap()).unwrap();
    let out = run_gzcheck(dir.path(), Path::new("false"), &["2", "--dump", dump.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(dump.exists());
    assert!(!dir.path().join("dump.gz").exists());
}
