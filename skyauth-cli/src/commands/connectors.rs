//! Connector listing command

use anyhow::Result;
use clap::Args;
use console::style;
use skyauth::connectors::{Connector, ConnectorRegistry};
use skyauth::schema::{FieldKind, FieldSpec};
use skyauth_cli_lib::flags::flag_name;

/// List registered connectors and their flags
#[derive(Debug, Args)]
pub struct ConnectorsCommand {
    /// Only show this connector
    #[arg(long, value_name = "ID")]
    id: Option<String>,
}

impl ConnectorsCommand {
    /// Print each connector, its default display name and its flags
    ///
    /// # Errors
    ///
    /// Returns an error if `--id` names an unregistered connector
    pub fn execute(&self, registry: &ConnectorRegistry) -> Result<()> {
        match &self.id {
            Some(id) => Self::print_connector(registry.get(id)?),
            None => registry.iter().for_each(Self::print_connector),
        }
        Ok(())
    }

    fn print_connector(connector: &Connector) {
        let config = connector.new_config();
        println!(
            "\n{} {}",
            style(connector.id()).green().bold(),
            style(format!("({})", config.name())).dim()
        );

        println!("  {}", style("settings").cyan());
        for field in config.schema() {
            Self::print_field(connector.id(), field);
        }

        println!("  {}", style("team whitelist").cyan());
        for field in connector.new_team_config().schema() {
            Self::print_field(connector.id(), field);
        }
    }

    fn print_field(connector_id: &str, field: &FieldSpec) {
        let repeat = match field.kind {
            FieldKind::Text => "",
            FieldKind::List => "...",
        };
        let required = if field.required {
            style(" (required)").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "    --{}{repeat}{required}  {}",
            flag_name(connector_id, field),
            style(field.description).dim()
        );
    }
}
