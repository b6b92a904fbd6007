//! Connector resolution integration tests
//!
//! Exercises the full startup path: config file -> registry lookup -> bind ->
//! validate -> serialize, plus registration of a connector defined outside
//! the crate.

use std::io::Write;

use serde_json::Value;
use skyauth::prelude::*;

#[derive(Debug, Default)]
struct StaticTokenConfig {
    token: String,
}

const STATIC_SCHEMA: &[FieldSpec] = &[FieldSpec::text("token").required()];

impl ProviderConfig for StaticTokenConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        STATIC_SCHEMA
    }

    fn populate(&mut self, fields: &BoundFields) {
        self.token = fields.text("token");
    }

    fn name(&self) -> &str {
        "Static Token"
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("token", &self.token);
        errors.into_result()
    }

    fn serialize(&self, redirect_uri: &str) -> Result<Vec<u8>, ConnectorError> {
        self.validate()?;
        Ok(serde_json::to_vec(&serde_json::json!({
            "token": self.token,
            "redirectURI": redirect_uri,
        }))?)
    }
}

#[derive(Debug, Default)]
struct NoTeamConfig;

impl TeamProviderConfig for NoTeamConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        &[]
    }

    fn populate(&mut self, _fields: &BoundFields) {}

    fn users(&self) -> &[String] {
        &[]
    }

    fn groups(&self) -> &[String] {
        &[]
    }
}

fn new_static_config() -> Box<dyn ProviderConfig> {
    Box::<StaticTokenConfig>::default()
}

fn new_no_team_config() -> Box<dyn TeamProviderConfig> {
    Box::new(NoTeamConfig)
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_to_payloads() {
    let file = write_config(
        r#"
enabled = ["google", "oidc"]

[server]
external_url = "https://ci.example.com/"

[connectors.google]
client_id = "google-id"
client_secret = "google-secret"
display_name = "Corp Google"
hosted_domains = ["example.com"]

[connectors.oidc]
client_id = "sso-id"
"#,
    );

    let config = SkyAuthConfig::load_from(file.path()).unwrap();
    let registry = ConnectorRegistry::builtin();
    let resolver = ConnectorResolver::new(&registry, config.callback_address());

    let resolution = resolver.resolve_config(&config);

    assert_eq!(resolution.connectors.len(), 1);
    let google = &resolution.connectors[0];
    assert_eq!(google.name, "Corp Google");

    let payload: Value = serde_json::from_slice(&google.config).unwrap();
    assert_eq!(payload["clientID"], "google-id");
    assert_eq!(
        payload["redirectURI"],
        "https://ci.example.com/sky/issuer/callback"
    );
    assert_eq!(payload["hostedDomains"], serde_json::json!(["example.com"]));

    assert_eq!(resolution.failures.len(), 1);
    let oidc = &resolution.failures[0];
    assert_eq!(oidc.id, "oidc");
    let message = oidc.error.to_string();
    assert!(message.contains("Missing issuer"));
    assert!(message.contains("Missing client-secret"));
    assert!(!message.contains("Missing client-id"));
}

#[test]
fn test_list_given_for_text_field_is_reported() {
    let file = write_config(
        r#"
[connectors.google]
client_id = ["a", "b"]
client_secret = "secret"
"#,
    );

    let config = SkyAuthConfig::load_from(file.path()).unwrap();
    let registry = ConnectorRegistry::builtin();
    let resolution = ConnectorResolver::new(&registry, config.callback_address()).resolve_config(&config);

    assert!(resolution.connectors.is_empty());
    assert!(matches!(
        &resolution.failures[0].error,
        ConnectorError::InvalidField { field, .. } if field == "client-id"
    ));
}

#[test]
fn test_team_auth_from_config_file() {
    let file = write_config(
        r#"
[teams.main.google]
users = ["Alice@Example.com"]
groups = ["eng"]

[teams.main.github]
teams = ["concourse:maintainers"]
"#,
    );

    let config = SkyAuthConfig::load_from(file.path()).unwrap();
    let registry = ConnectorRegistry::builtin();

    let roles = TeamAuth::new(&registry)
        .resolve("main", |id| config.team_source("main", id))
        .unwrap();

    assert_eq!(roles.users, vec!["google:alice@example.com"]);
    assert_eq!(
        roles.groups,
        vec!["github:concourse:maintainers", "google:eng"]
    );

    assert!(matches!(
        TeamAuth::new(&registry).resolve("empty", |id| config.team_source("empty", id)),
        Err(ConnectorError::NoTeamAuth(_))
    ));
}

#[test]
fn test_custom_connector_registration() {
    let registry = ConnectorRegistry::builder()
        .register("static", new_static_config, new_no_team_config)
        .build();

    let resolver = ConnectorResolver::new(&registry, "https://host/cb");

    let mut source = MapSource::new();
    source.set_text("token", "t0k3n");
    let resolved = resolver.resolve_one("static", &source).unwrap();
    assert_eq!(resolved.name, "Static Token");

    let payload: Value = serde_json::from_slice(&resolved.config).unwrap();
    assert_eq!(payload["redirectURI"], "https://host/cb");

    let missing = resolver.resolve_one("static", &MapSource::new()).unwrap_err();
    assert!(missing.to_string().contains("Missing token"));

    assert!(matches!(
        resolver.resolve_one("google", &source),
        Err(ConnectorError::UnsupportedProvider(_))
    ));
}

#[test]
fn test_duplicate_registration_is_reported() {
    let result = ConnectorRegistry::builder()
        .register("static", new_static_config, new_no_team_config)
        .try_register("static", new_static_config, new_no_team_config);

    assert!(matches!(
        result,
        Err(ConnectorError::RegistrationConflict(id)) if id == "static"
    ));
}
