//! Command-line flags generated from connector schemas
//!
//! Every registered connector contributes `--<connector>-<field>` flags, for
//! example `--google-client-id` or `--github-team`. Nothing here knows about
//! individual providers; the flag set follows whatever the registry holds.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction, ArgMatches, Command};
use skyauth::config::MapSource;
use skyauth::connectors::{Connector, ConnectorRegistry};
use skyauth::schema::{FieldKind, FieldSpec};

/// Which schema of each connector to expose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSet {
    /// Provider settings (`client-id`, `client-secret`, ...)
    Provider,
    /// Team whitelist settings (`user`, `group`, ...)
    Team,
}

impl FlagSet {
    fn schema(self, connector: &Connector) -> &'static [FieldSpec] {
        match self {
            Self::Provider => connector.new_config().schema(),
            Self::Team => connector.new_team_config().schema(),
        }
    }

    fn heading(self, connector: &Connector) -> String {
        match self {
            Self::Provider => format!("{} connector", connector.id()),
            Self::Team => format!("{} team whitelist", connector.id()),
        }
    }
}

/// Flag name of `field` for `connector_id`
#[must_use]
pub fn flag_name(connector_id: &str, field: &FieldSpec) -> String {
    format!("{connector_id}-{}", field.name)
}

/// Add the flags of every registered connector to `command`
#[must_use]
pub fn augment(command: Command, registry: &ConnectorRegistry, set: FlagSet) -> Command {
    registry.iter().fold(command, |command, connector| {
        let heading = set.heading(connector);
        set.schema(connector).iter().fold(command, |command, field| {
            command.arg(field_arg(connector.id(), field, &heading))
        })
    })
}

fn field_arg(connector_id: &str, field: &FieldSpec, heading: &str) -> Arg {
    let name = flag_name(connector_id, field);
    let arg = Arg::new(name.clone())
        .long(name)
        .help(field.description)
        .help_heading(heading.to_string());

    let arg = match field.value_name {
        Some(value_name) => arg.value_name(value_name),
        None => arg,
    };

    match field.kind {
        FieldKind::Text => arg.action(ArgAction::Set),
        FieldKind::List => arg.action(ArgAction::Append),
    }
}

/// Read connector flags back out of parsed matches
///
/// Values are stored under each field's source key, so the result merges
/// directly over config file sections. Connectors without any flag given are
/// absent from the map.
#[must_use]
pub fn collect(
    matches: &ArgMatches,
    registry: &ConnectorRegistry,
    set: FlagSet,
) -> BTreeMap<String, MapSource> {
    let mut sources = BTreeMap::new();

    for connector in registry.iter() {
        let mut source = MapSource::new();

        for field in set.schema(connector) {
            let name = flag_name(connector.id(), field);
            match field.kind {
                FieldKind::Text => {
                    if let Some(value) = matches.get_one::<String>(&name) {
                        source.set_text(field.key, value.clone());
                    }
                }
                FieldKind::List => {
                    for value in matches.get_many::<String>(&name).into_iter().flatten() {
                        source.push(field.key, value.clone());
                    }
                }
            }
        }

        if !source.is_empty() {
            sources.insert(connector.id().to_string(), source);
        }
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyauth::config::ConfigSource;

    #[test]
    fn test_flag_name() {
        let field = FieldSpec::text("client-id");
        assert_eq!(flag_name("google", &field), "google-client-id");
    }

    #[test]
    fn test_augment_adds_every_field() {
        let registry = ConnectorRegistry::builtin();
        let command = augment(Command::new("resolve"), &registry, FlagSet::Provider);

        let longs: Vec<_> = command
            .get_arguments()
            .filter_map(Arg::get_long)
            .collect();

        assert!(longs.contains(&"google-client-id"));
        assert!(longs.contains(&"github-ca-cert"));
        assert!(longs.contains(&"oidc-issuer"));
        assert!(!longs.contains(&"google-user"));
    }

    #[test]
    fn test_team_flags_use_team_schema() {
        let registry = ConnectorRegistry::builtin();
        let command = augment(Command::new("team"), &registry, FlagSet::Team);

        let matches = command
            .try_get_matches_from(["team", "--github-team", "org:devs", "--google-user", "alice"])
            .unwrap();
        let sources = collect(&matches, &registry, FlagSet::Team);

        assert_eq!(sources.len(), 2);
        assert!(sources["github"].lookup("teams").is_some());
        assert!(sources["google"].lookup("users").is_some());
    }
}
