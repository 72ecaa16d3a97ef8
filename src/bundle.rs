//! Test bundles and the dispatcher that runs them.
//!
//! The three bundles form a fixed, 1-based list:
//!
//! 1. [`Bundle::StaticCorpus`]: every file of the corpus directory;
//! 2. [`Bundle::SmallRandom`]: small random payloads, failures dumped;
//! 3. [`Bundle::BigRandom`]: large tiled payloads on the release build,
//!    failures dumped.
//!
//! [`Harness::run`] executes one of them or all of them in order and stops at
//! the first failing case.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::check::{Checker, FailureDump};
use crate::config::HarnessConfig;
use crate::displaylevel;
use crate::error::HarnessError;
use crate::generate::{load_static_case, RandomCase, RandomCaseSpec};
use crate::oracle::Oracle;
use crate::subject::{BinaryVariant, Subject};
use crate::util::list_corpus;

/// One selectable group of test cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bundle {
    StaticCorpus,
    SmallRandom,
    BigRandom,
}

impl Bundle {
    /// All bundles in run order.
    pub const ALL: [Bundle; 3] = [Bundle::StaticCorpus, Bundle::SmallRandom, Bundle::BigRandom];

    /// 1-based position in [`Bundle::ALL`].
    pub fn ordinal(self) -> usize {
        match self {
            Bundle::StaticCorpus => 1,
            Bundle::SmallRandom => 2,
            Bundle::BigRandom => 3,
        }
    }

    pub fn from_ordinal(n: usize) -> Option<Bundle> {
        n.checked_sub(1).and_then(|i| Bundle::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Bundle::StaticCorpus => "static cases",
            Bundle::SmallRandom => "small random cases",
            Bundle::BigRandom => "big random cases",
        }
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.ordinal(), self.name())
    }
}

/// Which bundles a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    One(Bundle),
    All,
}

impl Selection {
    /// Interpret the optional positional argument: `1`..`3` pick a bundle,
    /// anything else (including nothing) selects all of them.
    pub fn from_arg(arg: Option<&str>) -> Selection {
        arg.and_then(|s| s.trim().parse::<usize>().ok())
            .and_then(Bundle::from_ordinal)
            .map_or(Selection::All, Selection::One)
    }

    pub fn bundles(self) -> Vec<Bundle> {
        match self {
            Selection::One(bundle) => vec![bundle],
            Selection::All => Bundle::ALL.to_vec(),
        }
    }
}

/// Outcome of one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleReport {
    pub bundle: Bundle,
    /// Cases that were checked and passed.
    pub cases: usize,
}

/// Short label for a failed run: whether the subject misbehaved or the
/// harness itself could not set the case up.
pub fn failure_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<HarnessError>() {
        Some(e) if e.is_subject_failure() => "subject failure",
        _ => "harness error",
    }
}

/// Binds configuration, oracle and subject together.
pub struct Harness<'a> {
    config: &'a HarnessConfig,
    oracle: &'a dyn Oracle,
    subject: &'a dyn Subject,
}

impl<'a> Harness<'a> {
    pub fn new(config: &'a HarnessConfig, oracle: &'a dyn Oracle, subject: &'a dyn Subject) -> Self {
        Self {
            config,
            oracle,
            subject,
        }
    }

    /// Run the selected bundles in order, stopping at the first failure.
    pub fn run(&self, selection: Selection) -> anyhow::Result<Vec<BundleReport>> {
        let mut reports = Vec::new();
        for bundle in selection.bundles() {
            if selection == Selection::All {
                displaylevel!(2, "Running tests bundle #{}\n", bundle.ordinal());
            }
            reports.push(self.run_bundle(bundle)?);
        }
        Ok(reports)
    }

    /// Run a single bundle.
    pub fn run_bundle(&self, bundle: Bundle) -> anyhow::Result<BundleReport> {
        let cases = match bundle {
            Bundle::StaticCorpus => self.static_cases(),
            Bundle::SmallRandom => self.random_cases("small", &self.config.small_random, self.config.variant),
            // Large payloads are only meaningful against an optimised build.
            Bundle::BigRandom => self.random_cases("big", &self.config.big_random, BinaryVariant::Release),
        }
        .with_context(|| format!("tests bundle {bundle} failed"))?;
        Ok(BundleReport { bundle, cases })
    }

    fn static_cases(&self) -> anyhow::Result<usize> {
        let checker = Checker::new(self.subject);
        let files = list_corpus(&self.config.ok_corpus_dir)?;
        for path in &files {
            displaylevel!(2, "checking file '{}'\n", path.display());
            let case = load_static_case(path, self.oracle)?;
            checker
                .check(&path.display().to_string(), &case.input, &case.expected, self.config.variant)
                .with_context(|| format!("file '{}'", path.display()))?;
        }
        Ok(files.len())
    }

    fn random_cases(&self, size: &str, spec: &RandomCaseSpec, variant: BinaryVariant) -> anyhow::Result<usize> {
        let dump = FailureDump::new(&self.config.dump_path);
        let checker = Checker::new(self.subject).with_dump(&dump);
        for (i, payload) in spec.payloads().enumerate() {
            let number = i + 1;
            displaylevel!(2, "testing {} random data, case #{}\n", size, number);
            let case = RandomCase::compress(number, payload, self.oracle)?;
            let label = format!("{size} random case #{number}");
            checker
                .check(&label, &case.input, &case.expected, variant)
                .with_context(|| format!("{label} (seed {})", spec.seed))?;
        }
        Ok(spec.count)
    }

    /// Check a single gzip file against the subject, with the oracle's
    /// decoding as expected output. Nothing is dumped.
    pub fn replay(&self, path: &Path) -> anyhow::Result<()> {
        displaylevel!(2, "replaying '{}'\n", path.display());
        let input = fs::read(path).with_context(|| format!("cannot read '{}'", path.display()))?;
        let expected = self.oracle.decompress(&input)?;
        Checker::new(self.subject)
            .check(&path.display().to_string(), &input, &expected, self.config.variant)
            .with_context(|| format!("replay of '{}' failed", path.display()))?;
        Ok(())
    }
}
