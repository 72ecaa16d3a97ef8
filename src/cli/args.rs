//! Command-line argument parsing for `gzcheck`.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit argument list, suitable for
//! unit-testing). [`ParsedArgs::config`] turns the parsed options into a
//! [`HarnessConfig`], applying environment overrides.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::bundle::Selection;
use crate::cli::constants::display_level_from_counts;
use crate::config::{init_oracle_level_from, init_target_dir_from, HarnessConfig, ENV_CLEVEL, ENV_TARGET_DIR};
use crate::subject::{BinaryVariant, SubjectPaths};

/// Differential tester for gzip decompressors.
///
/// Runs the subject (`<target>/release/ripgzip -d` by default) on the static
/// corpus and on seeded random payloads, comparing its output with a
/// reference gzip implementation.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gzcheck", version)]
pub struct ParsedArgs {
    /// Bundle to run: 1 = static corpus, 2 = small random, 3 = big random.
    /// Any other value, or none, runs all bundles.
    #[arg(value_name = "BUNDLE", allow_negative_numbers = true)]
    pub bundle: Option<String>,

    /// Project directory holding data/ok, data/corrupted and dump.gz.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Directory holding the debug/ and release/ subject builds
    /// [default: $CARGO_TARGET_DIR, else ROOT/../../../target].
    #[arg(long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// File name of the subject executable.
    #[arg(long, value_name = "NAME", default_value = crate::config::SUBJECT_NAME_DEFAULT)]
    pub subject_name: String,

    /// Explicit path of the release subject build.
    #[arg(long, value_name = "PATH")]
    pub release_binary: Option<PathBuf>,

    /// Explicit path of the debug subject build.
    #[arg(long, value_name = "PATH")]
    pub debug_binary: Option<PathBuf>,

    /// Check static and small random cases against the debug build.
    #[arg(long)]
    pub debug: bool,

    /// Where to write the input of a failing random case [default: ROOT/dump.gz].
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,

    /// Check a single gzip file instead of running bundles.
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// More output (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl ParsedArgs {
    /// Display level implied by `-v` / `-q`.
    pub fn display_level(&self) -> u32 {
        display_level_from_counts(self.verbose, self.quiet)
    }

    /// Bundles selected by the positional argument.
    pub fn selection(&self) -> Selection {
        Selection::from_arg(self.bundle.as_deref())
    }

    /// Resolve the configuration, reading `CARGO_TARGET_DIR` and
    /// `GZCHECK_CLEVEL` from the environment.
    pub fn config(&self) -> HarnessConfig {
        self.config_from(
            std::env::var(ENV_TARGET_DIR).ok().as_deref(),
            std::env::var(ENV_CLEVEL).ok().as_deref(),
        )
    }

    /// Testable core of [`ParsedArgs::config`].
    pub fn config_from(&self, env_target_dir: Option<&str>, env_clevel: Option<&str>) -> HarnessConfig {
        let target_dir = match &self.target_dir {
            Some(dir) => dir.clone(),
            None => init_target_dir_from(env_target_dir, &self.root),
        };
        let mut config = HarnessConfig::new(&self.root, &target_dir);

        let defaults = SubjectPaths::in_target_dir(&target_dir, &self.subject_name);
        config.subject = SubjectPaths {
            debug: self.debug_binary.clone().unwrap_or(defaults.debug),
            release: self.release_binary.clone().unwrap_or(defaults.release),
        };
        config.variant = BinaryVariant::from_debug_flag(self.debug);
        if let Some(dump) = &self.dump {
            config.dump_path = dump.clone();
        }
        config.oracle_level = init_oracle_level_from(env_clevel);
        config
    }
}

/// Parse `std::env::args()`; exits with a usage message on bad input.
pub fn parse_args() -> ParsedArgs {
    ParsedArgs::parse()
}

/// Parse an explicit argument list (first element is the program name).
pub fn parse_args_from<I, T>(args: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    ParsedArgs::try_parse_from(args)
}
