//! # csprobe
//!
//! Exploratory tools for reverse-engineering Logic Pro's controller
//! assignment file (`com.apple.logic.pro.cs`). The format is undocumented;
//! these utilities surface structural markers, readable strings and OSC
//! control paths, diff two snapshots of the file byte by byte, and capture
//! snapshots while the file is being edited.
//!
//! Everything here is heuristic. Unrelated binaries are processed without
//! error and simply yield few matches.

pub mod analyzer;
pub mod config;
pub mod decoder;
pub mod diff;
pub mod error;
pub mod hexdump;
pub mod input;
pub mod markers;
pub mod monitor;
pub mod strings;

#[cfg(test)]
mod tests;

pub use config::ProbeConfig;
pub use diff::{structural_diff, DiffOptions, DiffReport, DifferenceBlock};
pub use error::{ConfigError, ProbeError, ProbeResult};
pub use strings::StringMatch;
