//! parleyctl - command line front end for the Parley engines.
//!
//! The binary only parses arguments; handlers live here so tests can call
//! them directly.

pub mod commands;
pub mod logging;

pub use commands::{ChatOutput, CheckReport, ClassifyOutput, Context};
