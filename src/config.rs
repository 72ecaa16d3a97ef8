// config.rs: Defaults for subject location, corpus layout, dump path and the
// random case generators, plus the environment overrides read at startup.

use std::path::{Path, PathBuf};

use crate::displaylevel;
use crate::generate::RandomCaseSpec;
use crate::subject::{BinaryVariant, SubjectPaths};

// Name of the subject executable inside `<target>/{debug,release}/`.
pub const SUBJECT_NAME_DEFAULT: &str = "ripgzip";

// Only flag passed to the subject; selects decompression.
pub const DECOMPRESS_FLAG: &str = "-d";

// Corpus of valid gzip files, relative to the project root.
pub const OK_CORPUS_DIR: &str = "data/ok";

// Deliberately broken inputs, relative to the project root. Declared for
// completeness; no bundle reads it.
pub const CORRUPTED_CORPUS_DIR: &str = "data/corrupted";

// Latest failing random input, relative to the project root.
pub const DUMP_FILE: &str = "dump.gz";

// Target directory relative to the project root when CARGO_TARGET_DIR is unset.
// Problems live three levels below the workspace that owns `target/`.
pub const TARGET_DIR_FROM_ROOT: &str = "../../../target";

// Oracle compression level; matches `gzip.compress` (9).
// Overridden by the GZCHECK_CLEVEL environment variable.
pub const ORACLE_LEVEL_DEFAULT: u32 = 9;

pub const ENV_TARGET_DIR: &str = "CARGO_TARGET_DIR";
pub const ENV_CLEVEL: &str = "GZCHECK_CLEVEL";

// Small random bundle: 100 independent 10 000-byte buffers.
pub const SMALL_RANDOM: RandomCaseSpec = RandomCaseSpec {
    seed: 23_546_262_367,
    count: 100,
    block_len: 10_000,
    repeat: 1,
};

// Big random bundle: 10 buffers of one 10 000-byte block tiled 1000 times.
pub const BIG_RANDOM: RandomCaseSpec = RandomCaseSpec {
    seed: 326_623_662,
    count: 10,
    block_len: 10_000,
    repeat: 1000,
};

/// Everything a harness run needs to know about its surroundings.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub ok_corpus_dir: PathBuf,
    pub corrupted_corpus_dir: PathBuf,
    pub dump_path: PathBuf,
    pub subject: SubjectPaths,
    /// Variant used by the static and small random bundles.
    pub variant: BinaryVariant,
    pub oracle_level: u32,
    pub small_random: RandomCaseSpec,
    pub big_random: RandomCaseSpec,
}

impl HarnessConfig {
    /// Default layout for a project rooted at `root`, with subject builds
    /// under `target_dir`.
    pub fn new(root: &Path, target_dir: &Path) -> Self {
        Self {
            ok_corpus_dir: root.join(OK_CORPUS_DIR),
            corrupted_corpus_dir: root.join(CORRUPTED_CORPUS_DIR),
            dump_path: root.join(DUMP_FILE),
            subject: SubjectPaths::in_target_dir(target_dir, SUBJECT_NAME_DEFAULT),
            variant: BinaryVariant::default(),
            oracle_level: ORACLE_LEVEL_DEFAULT,
            small_random: SMALL_RANDOM,
            big_random: BIG_RANDOM,
        }
    }

    /// Print the resolved configuration at display level 3.
    pub fn describe(&self) {
        displaylevel!(3, "corpus          : {}\n", self.ok_corpus_dir.display());
        displaylevel!(3, "corrupted corpus: {} (unused)\n", self.corrupted_corpus_dir.display());
        displaylevel!(3, "dump file       : {}\n", self.dump_path.display());
        displaylevel!(3, "debug binary    : {}\n", self.subject.debug.display());
        displaylevel!(3, "release binary  : {}\n", self.subject.release.display());
        displaylevel!(3, "variant         : {}\n", self.variant);
    }
}

/// Resolve the subject target directory from the `CARGO_TARGET_DIR` value,
/// falling back to [`TARGET_DIR_FROM_ROOT`] under `root`.
pub fn init_target_dir_from(env_val: Option<&str>, root: &Path) -> PathBuf {
    match env_val {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => root.join(TARGET_DIR_FROM_ROOT),
    }
}

/// Oracle compression level from the `GZCHECK_CLEVEL` value. Values outside 0..=9 or
/// non-numeric values are ignored with a warning.
pub fn init_oracle_level_from(env_val: Option<&str>) -> u32 {
    if let Some(env) = env_val {
        match env.trim().parse::<u32>() {
            Ok(level) if level <= 9 => return level,
            _ => {
                displaylevel!(
                    2,
                    "Ignore environment variable setting {}={}: not a compression level (0-9)\n",
                    ENV_CLEVEL,
                    env
                );
            }
        }
    }
    ORACLE_LEVEL_DEFAULT
}
