//! Parsing Strategy Module
//!
//! - Parallel: batch parsing of independent documents on the Rayon pool

pub mod parallel;

pub use parallel::parse_parallel;
