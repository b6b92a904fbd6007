//! Team whitelist command

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use skyauth::config::MapSource;
use skyauth::connectors::{ConnectorRegistry, TeamAuth};

use super::{load_config, overlay};

/// Build a team's whitelist across connectors
#[derive(Debug, Args)]
pub struct TeamCommand {
    /// Team name
    name: String,

    /// Config file to load instead of the default search path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TeamCommand {
    /// Execute the team command
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config cannot be loaded
    /// - A whitelist value is malformed
    /// - No connector whitelists any user or group for the team
    pub fn execute(
        &self,
        registry: &ConnectorRegistry,
        flags: &BTreeMap<String, MapSource>,
    ) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        let roles = TeamAuth::new(registry)
            .resolve(&self.name, |id| {
                overlay(config.team_source(&self.name, id), flags.get(id))
            })
            .with_context(|| format!("Failed to configure team '{}'", self.name))?;

        println!("{}", serde_json::to_string_pretty(&roles)?);
        Ok(())
    }
}
