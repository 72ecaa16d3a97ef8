//! Command-line interface for the `gzcheck` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`constants`] | Program name, the global display level, and the `displaylevel!` macro. |
//! | [`args`]      | `ParsedArgs`: clap-derived options, bundle selection and configuration resolution. |
//!
//! Typical call sequence: `parse_args` → `ParsedArgs::config` → `Harness::run`.

pub mod constants;
pub mod args;
