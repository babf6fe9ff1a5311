//! # ALLOTMENT
//!
//! File pipeline around [`allotment_core`]: configuration, JSON wire formats
//! and the `allocate` / `verify` commands behind the `allotment` binary.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod config;
pub mod wire;

pub use config::{AllotmentConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use wire::{AllocationFile, WireError};
