//! Google connector
//!
//! Google sign-in with optional hosted-domain and group restrictions. Group
//! membership lookups go through the admin directory API, which needs a
//! service account impersonating a super user; both settings are only used
//! when `groups` is non-empty.

use serde::Serialize;

use crate::connectors::{display_name, encode_validated, ProviderConfig, TeamProviderConfig};
use crate::error::{ConnectorError, ValidationErrors};
use crate::schema::{BoundFields, FieldSpec};

/// Registry identifier
pub const ID: &str = "google";

const DEFAULT_NAME: &str = "Google";

const SCHEMA: &[FieldSpec] = &[
    FieldSpec::text("display-name")
        .describe("The auth provider name displayed to users on the login page"),
    FieldSpec::text("client-id").required().describe("(Required) Client id"),
    FieldSpec::text("client-secret")
        .required()
        .describe("(Required) Client secret"),
    FieldSpec::list("scope").keyed("scopes").describe(
        "Any additional scopes that need to be requested during authorization. Default to [profile, email].",
    ),
    FieldSpec::list("hosted-domains").describe(
        "List of whitelisted domains, only users from a listed domain will be allowed to log in",
    ),
    FieldSpec::list("groups")
        .describe("If this field is nonempty, only users from a listed group will be allowed to log in"),
    FieldSpec::text("service-account-file-path").describe(
        "If nonempty, and groups claim is made, will use authentication from file to check groups with the admin directory api",
    ),
    FieldSpec::text("admin-email").describe(
        "The email of a GSuite super user which the service account will impersonate when listing groups",
    ),
];

const TEAM_SCHEMA: &[FieldSpec] = &[
    FieldSpec::list("user")
        .keyed("users")
        .value_name("USERNAME")
        .describe("A whitelisted Google user"),
    FieldSpec::list("group")
        .keyed("groups")
        .value_name("GROUP_NAME")
        .describe("A whitelisted Google group"),
];

/// Google provider settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleConfig {
    /// Login page label
    pub display_name: String,
    /// OAuth2 client id (required)
    pub client_id: String,
    /// OAuth2 client secret (required)
    pub client_secret: String,
    /// Extra scopes; the connector defaults to `profile` and `email`
    pub scopes: Vec<String>,
    /// Allowed G Suite domains
    pub hosted_domains: Vec<String>,
    /// Allowed groups
    pub groups: Vec<String>,
    /// Service account credentials used for group lookups
    pub service_account_file_path: String,
    /// Super user the service account impersonates
    pub admin_email: String,
}

/// Wire shape expected by the Google connector factory
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GooglePayload<'a> {
    #[serde(rename = "clientID")]
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(rename = "redirectURI")]
    redirect_uri: &'a str,
    scopes: &'a [String],
    hosted_domains: &'a [String],
    groups: &'a [String],
    service_account_file_path: &'a str,
    admin_email: &'a str,
}

impl ProviderConfig for GoogleConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        SCHEMA
    }

    fn populate(&mut self, fields: &BoundFields) {
        self.display_name = fields.text("display-name");
        self.client_id = fields.text("client-id");
        self.client_secret = fields.text("client-secret");
        self.scopes = fields.list("scope");
        self.hosted_domains = fields.list("hosted-domains");
        self.groups = fields.list("groups");
        self.service_account_file_path = fields.text("service-account-file-path");
        self.admin_email = fields.text("admin-email");
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
        encode_validated(self.validate(), || GooglePayload {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri,
            scopes: &self.scopes,
            hosted_domains: &self.hosted_domains,
            groups: &self.groups,
            service_account_file_path: &self.service_account_file_path,
            admin_email: &self.admin_email,
        })
    }
}

/// Google team whitelist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoogleTeamConfig {
    /// Whitelisted users
    pub users: Vec<String>,
    /// Whitelisted groups
    pub groups: Vec<String>,
}

impl TeamProviderConfig for GoogleTeamConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        TEAM_SCHEMA
    }

    fn populate(&mut self, fields: &BoundFields) {
        self.users = fields.list("user");
        self.groups = fields.list("group");
    }

    fn users(&self) -> &[String] {
        &self.users
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }
}

/// Empty Google config, for registration
#[must_use]
pub fn new_config() -> Box<dyn ProviderConfig> {
    Box::<GoogleConfig>::default()
}

/// Empty Google team config, for registration
#[must_use]
pub fn new_team_config() -> Box<dyn TeamProviderConfig> {
    Box::<GoogleTeamConfig>::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSource;
    use crate::schema::bind;
    use proptest::prelude::*;
    use serde_json::Value;

    fn config(client_id: &str, client_secret: &str) -> GoogleConfig {
        GoogleConfig {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            ..GoogleConfig::default()
        }
    }

    #[test]
    fn test_missing_client_id_only() {
        let err = config("", "s").validate().unwrap_err();
        let message = err.to_string();

        assert!(message.contains("Missing client-id"));
        assert!(!message.contains("Missing client-secret"));
    }

    #[test]
    fn test_missing_both_reports_both() {
        let err = config("", "").validate().unwrap_err();
        assert_eq!(err.count(), 2);
        assert!(err.has_field_error("client-id"));
        assert!(err.has_field_error("client-secret"));
    }

    #[test]
    fn test_serialize_returns_validation_error_unchanged() {
        let config = config("id", "");
        let validation = config.validate().unwrap_err();

        let err = config.serialize("https://host/cb").unwrap_err();
        assert_eq!(err.validation(), Some(&validation));
    }

    #[test]
    fn test_serialize_payload_shape() {
        let config = GoogleConfig {
            groups: vec!["eng".to_string()],
            ..config("id", "secret")
        };

        let payload: Value =
            serde_json::from_slice(&config.serialize("https://host/cb").unwrap()).unwrap();

        assert_eq!(payload["clientID"], "id");
        assert_eq!(payload["clientSecret"], "secret");
        assert_eq!(payload["redirectURI"], "https://host/cb");
        assert_eq!(payload["groups"], serde_json::json!(["eng"]));
        assert_eq!(payload["scopes"], serde_json::json!([]));
        assert_eq!(payload["serviceAccountFilePath"], "");
        assert_eq!(payload["adminEmail"], "");
        assert!(payload.get("hostedDomains").is_some());
    }

    #[test]
    fn test_populate_from_source() {
        let mut source = MapSource::new();
        source.set_text("client_id", "id");
        source.set_text("client_secret", "secret");
        source.push("scopes", "openid");
        source.set_text("hosted_domains", "example.com");
        source.set_text("service_account_file_path", "/etc/sa.json");
        source.set_text("admin_email", "root@example.com");

        let mut google = GoogleConfig::default();
        google.populate(&bind(google.schema(), &source).unwrap());

        assert_eq!(google.client_id, "id");
        assert_eq!(google.scopes, vec!["openid"]);
        assert_eq!(google.hosted_domains, vec!["example.com"]);
        assert_eq!(google.service_account_file_path, "/etc/sa.json");
        assert_eq!(google.admin_email, "root@example.com");
        assert!(google.validate().is_ok());
    }

    #[test]
    fn test_team_config_accessors() {
        let mut source = MapSource::new();
        source.push("users", "bob@example.com");
        source.push("users", "alice@example.com");

        let mut team = GoogleTeamConfig::default();
        team.populate(&bind(team.schema(), &source).unwrap());

        assert_eq!(team.users(), ["bob@example.com", "alice@example.com"]);
        assert!(team.groups().is_empty());
    }

    proptest! {
        #[test]
        fn prop_name_falls_back_to_default(display in "[A-Za-z ]{0,12}") {
            let google = GoogleConfig { display_name: display.clone(), ..GoogleConfig::default() };
            if display.is_empty() {
                prop_assert_eq!(google.name(), "Google");
            } else {
                prop_assert_eq!(google.name(), display.as_str());
            }
        }

        #[test]
        fn prop_validation_matches_required_fields(id in "[a-z0-9]{0,4}", secret in "[a-z0-9]{0,4}") {
            let google = config(&id, &secret);
            match google.validate() {
                Ok(()) => prop_assert!(!id.is_empty() && !secret.is_empty()),
                Err(errors) => {
                    prop_assert_eq!(errors.has_field_error("client-id"), id.is_empty());
                    prop_assert_eq!(errors.has_field_error("client-secret"), secret.is_empty());
                    prop_assert!(google.serialize("https://host/cb").is_err());
                }
            }
        }

        #[test]
        fn prop_redirect_uri_embedded_verbatim(uri in "https://[a-z]{1,10}\\.example/[a-z/]{0,10}") {
            let payload: Value = serde_json::from_slice(&config("id", "secret").serialize(&uri).unwrap()).unwrap();
            prop_assert_eq!(payload["redirectURI"].as_str(), Some(uri.as_str()));
        }

        #[test]
        fn prop_team_lists_preserved(users in proptest::collection::vec("[a-z]{1,6}", 0..5), groups in proptest::collection::vec("[a-z]{1,6}", 0..5)) {
            let team = GoogleTeamConfig { users: users.clone(), groups: groups.clone() };
            prop_assert_eq!(team.users(), users.as_slice());
            prop_assert_eq!(team.groups(), groups.as_slice());
        }
    }
}
