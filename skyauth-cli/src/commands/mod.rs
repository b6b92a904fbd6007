//! CLI command implementations

pub mod connectors;
pub mod resolve;
pub mod team;

pub use connectors::ConnectorsCommand;
pub use resolve::ResolveCommand;
pub use team::TeamCommand;

use std::path::Path;

use anyhow::{Context, Result};
use skyauth::config::{MapSource, SkyAuthConfig};
use skyauth_cli_lib::SERVICE_NAME;

/// Load `path` if given, otherwise the XDG search path for the service
fn load_config(path: Option<&Path>) -> Result<SkyAuthConfig> {
    match path {
        Some(path) => SkyAuthConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => SkyAuthConfig::load_for_service(SERVICE_NAME).context("Failed to load config"),
    }
}

/// Config file section overlaid with command-line flags
fn overlay(mut base: MapSource, flags: Option<&MapSource>) -> MapSource {
    if let Some(flags) = flags {
        base.merge(flags.clone());
    }
    base
}
