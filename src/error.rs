use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the harness.
///
/// `Environment`, `Corpus` and `Dump` point at the harness setup; the
/// `Subject*` and `OutputMismatch` variants are failures of the tool under
/// test for the current case.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The reference codec rejected data the harness produced or loaded.
    #[error("reference codec failed while trying to {operation}")]
    Environment {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// A corpus directory or file could not be read.
    #[error("cannot read corpus entry {}", .path.display())]
    Corpus {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The subject exited unsuccessfully.
    #[error("subject crashed ({}){}", describe_exit(.code), describe_stderr(.stderr))]
    SubjectCrashed { code: Option<i32>, stderr: String },

    /// The subject could not be spawned, fed, or drained.
    #[error("cannot communicate with subject {}", .path.display())]
    SubjectIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The subject produced bytes different from the expected output.
    #[error(
        "incorrect output: expected {expected_len} bytes, got {actual_len} bytes{}",
        describe_offset(.first_difference)
    )]
    OutputMismatch {
        expected_len: usize,
        actual_len: usize,
        first_difference: Option<usize>,
    },

    /// The failing input could not be written to the dump file.
    #[error("cannot write dump file {}", .path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    /// `true` for failures attributable to the subject rather than the harness.
    pub fn is_subject_failure(&self) -> bool {
        matches!(
            self,
            HarnessError::SubjectCrashed { .. }
                | HarnessError::SubjectIo { .. }
                | HarnessError::OutputMismatch { .. }
        )
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

fn describe_offset(offset: &Option<usize>) -> String {
    match *offset {
        Some(offset) => format!(", first difference at offset {offset}"),
        None => String::new(),
    }
}
