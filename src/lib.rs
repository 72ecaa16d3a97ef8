// gzcheck: differential test harness for gzip decompressors

pub mod cli;
pub mod config;
pub mod error;
pub mod util;
pub mod random;
pub mod oracle;
pub mod subject;
pub mod generate;
pub mod check;
pub mod bundle;

pub use bundle::{failure_kind, Bundle, BundleReport, Harness, Selection};
pub use check::{compare, Checker, FailureDump};
pub use config::HarnessConfig;
pub use error::HarnessError;
pub use generate::{RandomCase, RandomCaseSpec, RandomPayloads, StaticCase};
pub use oracle::{GzipOracle, Oracle};
pub use random::PyRandom;
pub use subject::{BinaryVariant, ProcessSubject, Subject, SubjectPaths};

pub const GZCHECK_VERSION_STRING: &str = env!("CARGO_PKG_VERSION");
