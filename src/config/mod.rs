//! Application configuration and constants.
//!
//! This module provides:
//! - Policy thresholds and scan column names
//! - The library `Config` passed into the pipeline
//! - CLI option types and parsing

mod constants;
mod types;

pub use constants::*;
pub use types::{Command, Config, ExportScopeArg, InputPaths, LogFormat, LogLevel, Opt};
