//! Binary entry point for the `gzcheck` harness.
//!
//! # Control flow
//!
//! 1. [`parse_args`] processes all flags and builds a [`ParsedArgs`] value.
//! 2. The display level is set from `-v` / `-q`.
//! 3. [`run`] resolves the configuration and either replays one file or
//!    dispatches the selected bundles, returning the process exit code.

use gzcheck::cli::args::{parse_args, ParsedArgs};
use gzcheck::cli::constants::{set_display_level, PROGRAM_NAME};
use gzcheck::{failure_kind, GzipOracle, Harness, ProcessSubject, GZCHECK_VERSION_STRING};

/// Execute the run described by `args`.
///
/// Returns the process exit code (0 = every case passed, 1 = a failure).
fn run(args: ParsedArgs) -> i32 {
    gzcheck::displaylevel!(3, "*** {} v{} ***\n", PROGRAM_NAME, GZCHECK_VERSION_STRING);
    let config = args.config();
    config.describe();

    let oracle = GzipOracle::new(config.oracle_level);
    gzcheck::displaylevel!(3, "oracle level    : {}\n", oracle.level());
    let subject = ProcessSubject::new(config.subject.clone());
    let harness = Harness::new(&config, &oracle, &subject);

    if let Some(path) = &args.replay {
        return match harness.replay(path) {
            Ok(()) => {
                gzcheck::displaylevel!(2, "replay passed\n");
                0
            }
            Err(e) => {
                gzcheck::displaylevel!(1, "{}: {}: {:#}\n", PROGRAM_NAME, failure_kind(&e), e);
                1
            }
        };
    }

    match harness.run(args.selection()) {
        Ok(reports) => {
            let cases: usize = reports.iter().map(|r| r.cases).sum();
            gzcheck::displaylevel!(
                2,
                "all checks passed: {} bundle(s), {} case(s)\n",
                reports.len(),
                cases
            );
            0
        }
        Err(e) => {
            gzcheck::displaylevel!(1, "{}: {}: {:#}\n", PROGRAM_NAME, failure_kind(&e), e);
            1
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let args = parse_args();
    set_display_level(args.display_level());

    let exit_code = run(args);
    std::process::exit(exit_code);
}
