//! Filesystem helpers.
//!
//! - [`file_list`]: deterministic corpus enumeration

pub mod file_list;

pub use file_list::list_corpus;
