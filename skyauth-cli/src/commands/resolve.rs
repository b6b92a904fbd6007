//! Connector resolution command
//!
//! Runs the same startup pass a server would and prints the connector
//! payloads as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use skyauth::config::MapSource;
use skyauth::connectors::{ConnectorRegistry, ConnectorResolver, Resolution};

use super::{load_config, overlay};

/// Resolve enabled connectors into connector payloads
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Config file to load instead of the default search path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Externally reachable URL of the server
    #[arg(long)]
    external_url: Option<String>,

    /// Connector to enable (repeatable); defaults to every configured connector
    #[arg(long = "connector", value_name = "ID")]
    connectors: Vec<String>,

    /// Fail if any requested connector cannot be enabled
    #[arg(long)]
    strict: bool,
}

#[derive(Serialize)]
struct ResolvedOutput<'a> {
    id: &'a str,
    name: &'a str,
    config: serde_json::Value,
}

impl ResolveCommand {
    /// Execute the resolve command
    ///
    /// `flags` holds the per-connector settings given on the command line;
    /// they override the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config cannot be loaded
    /// - No requested connector could be enabled
    /// - `--strict` is set and any connector failed
    pub fn execute(
        &self,
        registry: &ConnectorRegistry,
        flags: &BTreeMap<String, MapSource>,
    ) -> Result<()> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(url) = &self.external_url {
            config.server.external_url.clone_from(url);
        }

        let ids = if self.connectors.is_empty() {
            let mut ids = config.enabled_connectors();
            for id in flags.keys() {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
            ids
        } else {
            self.connectors.clone()
        };

        if ids.is_empty() {
            bail!("No connectors configured. Pass --connector or connector flags such as --google-client-id");
        }
        tracing::debug!(connectors = ?ids, callback = %config.callback_address(), "resolving connectors");

        let resolver = ConnectorResolver::new(registry, config.callback_address());
        let resolution = resolver.resolve(&ids, |id| {
            overlay(config.connector_source(id), flags.get(id))
        });

        Self::print(&resolution)?;
        Self::report_failures(&resolution);

        if resolution.connectors.is_empty() {
            bail!("No connectors could be enabled");
        }
        if self.strict && !resolution.is_complete() {
            bail!("{} connector(s) failed to resolve", resolution.failures.len());
        }
        Ok(())
    }

    fn print(resolution: &Resolution) -> Result<()> {
        let output = resolution
            .connectors
            .iter()
            .map(|connector| -> Result<ResolvedOutput<'_>> {
                Ok(ResolvedOutput {
                    id: &connector.id,
                    name: &connector.name,
                    config: serde_json::from_slice(&connector.config)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn report_failures(resolution: &Resolution) {
        for failure in &resolution.failures {
            eprintln!(
                "{} {}: {}",
                style("✗").red().bold(),
                style(&failure.id).bold(),
                failure.error.to_string().trim_end()
            );
        }
    }
}
