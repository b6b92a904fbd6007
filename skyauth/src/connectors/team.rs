//! Team authorization across connectors
//!
//! A team is authorized through whitelists held by each connector's
//! [`TeamProviderConfig`]. The authorization layer wants a single flat view,
//! so entries are prefixed with the connector identifier and lowercased:
//! `google:alice@example.com`, `github:concourse:maintainers`.

use serde::{Deserialize, Serialize};

use super::{ConnectorRegistry, TeamProviderConfig};
use crate::config::MapSource;
use crate::error::ConnectorError;
use crate::schema::bind;

/// Flattened whitelist of one team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoles {
    /// `<connector>:<user>` entries
    pub users: Vec<String>,
    /// `<connector>:<group>` entries
    pub groups: Vec<String>,
}

impl TeamRoles {
    /// Append one connector's whitelist
    pub fn extend_from(&mut self, connector_id: &str, config: &dyn TeamProviderConfig) {
        let prefixed = |value: &String| format!("{connector_id}:{}", value.to_lowercase());
        self.users.extend(config.users().iter().map(prefixed));
        self.groups.extend(config.groups().iter().map(prefixed));
    }

    /// Whether no connector whitelists anyone
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

/// Builds [`TeamRoles`] from per-connector team settings
#[derive(Debug, Clone, Copy)]
pub struct TeamAuth<'a> {
    registry: &'a ConnectorRegistry,
}

impl<'a> TeamAuth<'a> {
    /// Use the connectors of `registry`
    #[must_use]
    pub const fn new(registry: &'a ConnectorRegistry) -> Self {
        Self { registry }
    }

    /// Collect the whitelists of `team` from every registered connector
    ///
    /// `source_for` returns the team settings for a connector identifier;
    /// connectors without settings contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns a binding error for malformed settings, or
    /// [`ConnectorError::NoTeamAuth`] when nobody is whitelisted.
    pub fn resolve<F>(&self, team: &str, source_for: F) -> Result<TeamRoles, ConnectorError>
    where
        F: Fn(&str) -> MapSource,
    {
        let mut roles = TeamRoles::default();

        for connector in self.registry.iter() {
            let source = source_for(connector.id());
            if source.is_empty() {
                continue;
            }

            let mut config = connector.new_team_config();
            let fields = bind(config.schema(), &source)?;
            config.populate(&fields);
            roles.extend_from(connector.id(), config.as_ref());
        }

        if roles.is_empty() {
            return Err(ConnectorError::NoTeamAuth(team.to_string()));
        }

        tracing::debug!(
            team,
            users = roles.users.len(),
            groups = roles.groups.len(),
            "resolved team auth"
        );
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::providers::GoogleTeamConfig;

    #[test]
    fn test_extend_prefixes_and_lowercases() {
        let google = GoogleTeamConfig {
            users: vec!["Alice@Example.com".into()],
            groups: vec!["Eng".into()],
        };

        let mut roles = TeamRoles::default();
        roles.extend_from("google", &google);

        assert_eq!(roles.users, vec!["google:alice@example.com"]);
        assert_eq!(roles.groups, vec!["google:eng"]);
    }

    #[test]
    fn test_resolve_across_connectors() {
        let registry = ConnectorRegistry::builtin();

        let roles = TeamAuth::new(&registry)
            .resolve("main", |id| {
                let mut source = MapSource::new();
                match id {
                    "github" => {
                        source.push("orgs", "concourse");
                        source.push("users", "octocat");
                    }
                    "google" => source.push("users", "alice@example.com"),
                    _ => {}
                }
                source
            })
            .unwrap();

        assert_eq!(roles.users, vec!["github:octocat", "google:alice@example.com"]);
        assert_eq!(roles.groups, vec!["github:concourse"]);
    }

    #[test]
    fn test_resolve_without_whitelist_fails() {
        let registry = ConnectorRegistry::builtin();
        let err = TeamAuth::new(&registry)
            .resolve("main", |_| MapSource::new())
            .unwrap_err();

        assert!(matches!(err, ConnectorError::NoTeamAuth(team) if team == "main"));
    }

    #[test]
    fn test_roles_serialize_as_users_and_groups() {
        let roles = TeamRoles {
            users: vec!["google:alice".into()],
            groups: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&roles).unwrap(),
            serde_json::json!({"users": ["google:alice"], "groups": []})
        );
    }
}
