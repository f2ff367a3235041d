//! Unified diff parsing and path filtering.
//!
//! Turns `git diff` / `git show` output into [`stackpulse_core::DiffFile`]
//! values with per-hunk added and deleted lines, and drops vendored,
//! minified, or explicitly skipped files before extraction.

pub mod filter;
pub mod parser;
