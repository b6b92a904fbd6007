//! skyauth CLI library
//!
//! Shared between the `skyauth` binary and its integration tests.

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod flags;

pub use flags::{augment, collect, FlagSet};

/// Service name used to locate config files
pub const SERVICE_NAME: &str = "skyauth";
