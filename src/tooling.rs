//! CLI Tooling
//!
//! Command-line surface for all Lamina operations.

pub mod cli;
pub mod pager;
