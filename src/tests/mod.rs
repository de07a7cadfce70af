//! Unit tests for csprobe modules
//!
//! Tests are organized by module and functionality.

pub mod decoder_tests;
pub mod monitor_tests;
