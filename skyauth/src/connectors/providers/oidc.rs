//! Generic OpenID Connect connector
//!
//! Any issuer supporting discovery. Unlike the fixed providers, the issuer
//! URL is required and the claims carrying the user name and the groups are
//! configurable.

use serde::Serialize;

use crate::connectors::{display_name, encode_validated, ProviderConfig, TeamProviderConfig};
use crate::error::{ConnectorError, ValidationErrors};
use crate::schema::{BoundFields, FieldSpec};

/// Registry identifier
pub const ID: &str = "oidc";

const DEFAULT_NAME: &str = "Single Sign-On";

const SCHEMA: &[FieldSpec] = &[
    FieldSpec::text("display-name")
        .describe("The auth provider name displayed to users on the login page"),
    FieldSpec::text("issuer")
        .required()
        .describe("(Required) An OIDC issuer URL that will be used to discover provider configuration using the .well-known/openid-configuration"),
    FieldSpec::text("client-id").required().describe("(Required) Client id"),
    FieldSpec::text("client-secret")
        .required()
        .describe("(Required) Client secret"),
    FieldSpec::list("scope")
        .keyed("scopes")
        .describe("Any additional scopes of [openid] that need to be requested during authorization"),
    FieldSpec::text("groups-key")
        .with_default("groups")
        .describe("The groups key indicates which claim to use to map external groups to Concourse teams."),
    FieldSpec::text("user-name-key")
        .with_default("username")
        .describe("The user name key indicates which claim to use to map an external user name to a Concourse user name."),
    FieldSpec::list("hosted-domains").describe(
        "List of whitelisted domains when using Google, only users from a listed domain will be allowed to log in",
    ),
    FieldSpec::list("ca-cert")
        .keyed("ca-certs")
        .describe("CA Certificate"),
];

const TEAM_SCHEMA: &[FieldSpec] = &[
    FieldSpec::list("user")
        .keyed("users")
        .value_name("USERNAME")
        .describe("A whitelisted OIDC user"),
    FieldSpec::list("group")
        .keyed("groups")
        .value_name("GROUP_NAME")
        .describe("A whitelisted OIDC group"),
];

/// Generic OIDC provider settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcConfig {
    /// Login page label
    pub display_name: String,
    /// Issuer URL used for discovery (required)
    pub issuer: String,
    /// OAuth2 client id (required)
    pub client_id: String,
    /// OAuth2 client secret (required)
    pub client_secret: String,
    /// Scopes requested in addition to `openid`
    pub scopes: Vec<String>,
    /// Claim holding group memberships
    pub groups_key: String,
    /// Claim holding the user name
    pub user_name_key: String,
    /// Allowed hosted domains
    pub hosted_domains: Vec<String>,
    /// CA certificate paths trusted for the issuer
    pub ca_certs: Vec<String>,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            issuer: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: Vec::new(),
            groups_key: "groups".to_string(),
            user_name_key: "username".to_string(),
            hosted_domains: Vec::new(),
            ca_certs: Vec::new(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OidcPayload<'a> {
    issuer: &'a str,
    #[serde(rename = "clientID")]
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(rename = "redirectURI")]
    redirect_uri: &'a str,
    scopes: &'a [String],
    hosted_domains: &'a [String],
    #[serde(rename = "rootCAs")]
    root_cas: &'a [String],
    user_name_key: &'a str,
    insecure_enable_groups: bool,
    claim_mapping: ClaimMapping<'a>,
}

#[derive(Serialize)]
struct ClaimMapping<'a> {
    groups: &'a str,
}

impl ProviderConfig for OidcConfig {
    fn schema(&self) -> &'static [FieldSpec] {
        SCHEMA
    }

    fn populate(&mut self, fields: &BoundFields) {
        self.display_name = fields.text("display-name");
        self.issuer = fields.text("issuer");
        self.client_id = fields.text("client-id");
        self.client_secret = fields.text("client-secret");
        self.scopes = fields.list("scope");
        self.groups_key = fields.text("groups-key");
        self.user_name_key = fields.text("user-name-key");
        self.hosted_domains = fields.list("hosted-domains");
        self.ca_certs = fields.list("ca-cert");
    }

    fn name(&self) -> &str {
        display_name(&self.display_name, DEFAULT_NAME)
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("issuer", &self.issuer);
        errors.require("client-id", &self.client_id);
        errors.require("client-secret", &self.client_secret);
        errors.into_result()
    }

    fn serialize(&self, redirect_uri: &str) -> Result<Vec<u8>, ConnectorError> {
        encode_validated(self.validate(), || OidcPayload {
            issuer: &self.issuer,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri,
            scopes: &self.scopes,
            hosted_domains: &self.hosted_domains,
            root_cas: &self.ca_certs,
            user_name_key: &self.user_name_key,
            insecure_enable_groups: true,
            claim_mapping: ClaimMapping {
                groups: &self.groups_key,
            },
        })
    }
}

/// OIDC team whitelist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OidcTeamConfig {
    /// Whitelisted users
    pub users: Vec<String>,
    /// Whitelisted groups
    pub groups: Vec<String>,
}

impl TeamProviderConfig for OidcTeamConfig {
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

/// Empty OIDC config, for registration
#[must_use]
pub fn new_config() -> Box<dyn ProviderConfig> {
    Box::<OidcConfig>::default()
}

/// Empty OIDC team config, for registration
#[must_use]
pub fn new_team_config() -> Box<dyn TeamProviderConfig> {
    Box::<OidcTeamConfig>::default()
}
