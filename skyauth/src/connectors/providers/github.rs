//! GitHub connector
//!
//! Works against github.com or a GitHub Enterprise host. Team whitelists can
//! name users, whole organizations, or `org:team` pairs.

use serde::Serialize;

use crate::connectors::{display_name, encode_validated, ProviderConfig, TeamProviderConfig};
use crate::error::{ConnectorError, ValidationErrors};
use crate::schema::{BoundFields, FieldSpec};

/// Registry identifier
pub const ID: &str = "github";

const DEFAULT_NAME: &str = "GitHub";

const SCHEMA: &[FieldSpec] = &[
    FieldSpec::text("display-name")
        .describe("The auth provider name displayed to users on the login page"),
    FieldSpec::text("client-id").required().describe("(Required) Client id"),
    FieldSpec::text("client-secret")
        .required()
        .describe("(Required) Client secret"),
    FieldSpec::text("host")
        .describe("Hostname of GitHub Enterprise deployment (No scheme, No trailing slash)"),
    FieldSpec::text("ca-cert").describe("CA certificate of GitHub Enterprise deployment"),
];

const TEAM_SCHEMA: &[FieldSpec] = &[
    FieldSpec::list("user")
        .keyed("users")
        .value_name("USERNAME")
        .describe("A whitelisted GitHub user"),
    FieldSpec::list("org")
        .keyed("orgs")
        .value_name("ORG_NAME")
        .describe("A whitelisted GitHub org"),
    FieldSpec::list("team")
        .keyed("teams")
        .value_name("ORG_NAME:TEAM_NAME")
        .describe("A whitelisted GitHub team"),
];

/// GitHub provider settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubConfig {
    /// Login page label
    pub display_name: String,
    /// OAuth2 client id (required)
    pub client_id: String,
    /// OAuth2 client secret (required)
    pub client_secret: String,
    /// GitHub Enterprise hostname; empty means github.com
    pub host: String,
    /// CA certificate path for GitHub Enterprise
    pub ca_cert: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GitHubPayload<'a> {
    #[serde(rename = "clientID")]
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(rename = "redirectURI")]
    redirect_uri: &'a str,
    host_name: &'a str,
    #[serde(rename = "rootCA")]
    root_ca: &'a str,
    team_name_field: &'static str,
    load_all_groups: bool,
    #[serde(rename = "useLoginAsID")]
    use_login_as_id: bool,
}

impl ProviderConfig for GitHubConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        SCHEMA
    }

    fn populate(&mut self, fields: &BoundFields) {
        self.display_name = fields.text("display-name");
        self.client_id = fields.text("client-id");
        self.client_secret = fields.text("client-secret");
        self.host = fields.text("host");
        self.ca_cert = fields.text("ca-cert");
    }

    fn name(&self) -> &str {
        display_name(&self.display_name, DEFAULT_NAME)
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("client-id", &self.client_id);
        errors.require("client-secret", &self.client_secret);
        errors.into_result()
    }

    fn serialize(&self, redirect_uri: &str) -> Result<Vec<u8>, ConnectorError> {
        encode_validated(self.validate(), || GitHubPayload {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri,
            host_name: &self.host,
            root_ca: &self.ca_cert,
            team_name_field: "slug",
            load_all_groups: true,
            use_login_as_id: true,
        })
    }
}

/// GitHub team whitelist
///
/// Groups are the whitelisted orgs followed by the whitelisted teams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitHubTeamConfig {
    users: Vec<String>,
    orgs: Vec<String>,
    teams: Vec<String>,
    groups: Vec<String>,
}

impl GitHubTeamConfig {
    /// Build a whitelist from users, orgs and `org:team` entries
    #[must_use]
    pub fn new(users: Vec<String>, orgs: Vec<String>, teams: Vec<String>) -> Self {
        let groups = orgs.iter().chain(&teams).cloned().collect();
        Self {
            users,
            orgs,
            teams,
            groups,
        }
    }

    /// Whitelisted organizations
    #[must_use]
    pub fn orgs(&self) -> &[String] {
        &self.orgs
    }

    /// Whitelisted `org:team` pairs
    #[must_use]
    pub fn teams(&self) -> &[String] {
        &self.teams
    }
}

impl TeamProviderConfig for GitHubTeamConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        TEAM_SCHEMA
    }

    fn populate(&mut self, fields: &BoundFields) {
        *self = Self::new(fields.list("user"), fields.list("org"), fields.list("team"));
    }

    fn users(&self) -> &[String] {
        &self.users
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

/// Empty GitHub config, for registration
#[must_use]
pub fn new_config() -> Box<dyn ProviderConfig> {
    Box::<GitHubConfig>::default()
}

/// Empty GitHub team config, for registration
#[must_use]
pub fn new_team_config() -> Box<dyn TeamProviderConfig> {
    Box::<GitHubTeamConfig>::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSource;
    use crate::schema::bind;
    use serde_json::Value;

    #[test]
    fn test_default_name() {
        assert_eq!(GitHubConfig::default().name(), "GitHub");
    }

    #[test]
    fn test_enterprise_payload() {
        let config = GitHubConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            host: "github.example.com".into(),
            ca_cert: "/etc/ssl/ghe.pem".into(),
            ..GitHubConfig::default()
        };

        let payload: Value =
            serde_json::from_slice(&config.serialize("https://ci/cb").unwrap()).unwrap();

        assert_eq!(payload["clientID"], "id");
        assert_eq!(payload["redirectURI"], "https://ci/cb");
        assert_eq!(payload["hostName"], "github.example.com");
        assert_eq!(payload["rootCA"], "/etc/ssl/ghe.pem");
        assert_eq!(payload["teamNameField"], "slug");
        assert_eq!(payload["loadAllGroups"], true);
        assert_eq!(payload["useLoginAsID"], true);
    }

    #[test]
    fn test_missing_secret() {
        let config = GitHubConfig {
            client_id: "id".into(),
            ..GitHubConfig::default()
        };
        let err = config.serialize("https://ci/cb").unwrap_err();
        let validation = err.validation().unwrap();

        assert!(validation.has_field_error("client-secret"));
        assert!(!validation.has_field_error("client-id"));
    }

    #[test]
    fn test_team_groups_are_orgs_then_teams() {
        let mut source = MapSource::new();
        source.push("orgs", "concourse");
        source.push("teams", "concourse:maintainers");
        source.push("users", "octocat");

        let mut team = GitHubTeamConfig::default();
        team.populate(&bind(team.schema(), &source).unwrap());

        assert_eq!(team.users(), ["octocat"]);
        assert_eq!(team.orgs(), ["concourse"]);
        assert_eq!(team.teams(), ["concourse:maintainers"]);
        assert_eq!(team.groups(), ["concourse", "concourse:maintainers"]);
    }
}
