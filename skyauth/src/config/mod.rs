//! Configuration management for skyauth
//!
//! Connector and team settings come from TOML files overlaid by `SKYAUTH_`
//! environment variables. [`SkyAuthConfig::load_for_service`] searches
//! `/etc/skyauth/{service}`, then the XDG config directory, then the working
//! directory; each later file overrides the earlier ones and the environment
//! overrides them all. [`SkyAuthConfig::load_from`] reads one explicit file.
//!
//! Environment variable format: `SKYAUTH_SECTION__FIELD_NAME`, for example
//! `SKYAUTH_CONNECTORS__GOOGLE__CLIENT_ID=my-id`. Field keys accept either
//! `client_id` or `client-id`.
//!
//! # Example Configuration
//!
//! ```toml
//! enabled = ["google"]
//!
//! [server]
//! external_url = "https://ci.example.com"
//!
//! [connectors.google]
//! client_id = "my-client-id"
//! client_secret = "my-client-secret"
//! groups = ["eng@example.com"]
//!
//! [teams.main.google]
//! users = ["alice@example.com"]
//! groups = ["eng@example.com"]
//! ```

mod source;

pub use source::{normalize_key, ConfigSource, MapSource};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::schema::FieldValue;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "SKYAUTH_";

/// Raw key/value settings of one connector or one team/connector pair
pub type SectionValues = BTreeMap<String, FieldValue>;

/// Settings of the hosting server that matter to connectors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Externally reachable base URL of the server
    pub external_url: String,

    /// Path the identity provider redirects back to
    pub callback_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            external_url: "http://localhost:8080".to_string(),
            callback_path: "/sky/issuer/callback".to_string(),
        }
    }
}

impl ServerSettings {
    /// Callback address handed to connectors at serialize time
    ///
    /// ```rust
    /// use skyauth::config::ServerSettings;
    ///
    /// let server = ServerSettings {
    ///     external_url: "https://ci.example.com/".into(),
    ///     callback_path: "/sky/issuer/callback".into(),
    /// };
    /// assert_eq!(server.callback_address(), "https://ci.example.com/sky/issuer/callback");
    /// ```
    #[must_use]
    pub fn callback_address(&self) -> String {
        format!(
            "{}/{}",
            self.external_url.trim_end_matches('/'),
            self.callback_path.trim_start_matches('/')
        )
    }
}

/// Complete skyauth configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkyAuthConfig {
    /// Connector identifiers to enable; empty enables every configured section
    #[serde(default)]
    pub enabled: Vec<String>,

    /// Hosting server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Provider settings keyed by connector identifier
    #[serde(default)]
    pub connectors: BTreeMap<String, SectionValues>,

    /// Team whitelists keyed by team name, then connector identifier
    #[serde(default)]
    pub teams: BTreeMap<String, BTreeMap<String, SectionValues>>,
}

impl SkyAuthConfig {
    /// Load configuration for a specific service
    ///
    /// Later layers override earlier ones:
    ///
    /// - serialized defaults
    /// - `/etc/skyauth/{service_name}/config.toml`
    /// - `~/.config/skyauth/{service_name}/config.toml`
    /// - `./config.toml`
    /// - `SKYAUTH_*` environment variables (`__` separates nesting levels)
    ///
    /// Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - A configuration file cannot be read or parsed
    /// - Configuration values fail type conversion
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let candidates = [
            PathBuf::from("/etc/skyauth")
                .join(service_name)
                .join("config.toml"),
            Self::recommended_path(service_name),
            PathBuf::from("./config.toml"),
        ];

        let figment = candidates
            .iter()
            .filter(|path| path.exists())
            .fold(Self::defaults()?, |figment, path| {
                figment.merge(Toml::file(path))
            });

        Self::extract_with_env(figment)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file yields the defaults; environment variables still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load_from(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::extract_with_env(Self::defaults()?.merge(Toml::file(path.into())))
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__").lowercase(true)
    }

    fn extract_with_env(figment: Figment) -> anyhow::Result<Self> {
        let mut config: Self = figment.merge(Self::env()).extract()?;
        config.apply_raw_env();
        Ok(config)
    }

    /// Re-apply connector and team settings from the environment verbatim
    ///
    /// figment parses environment values, so `0123456789` would arrive as
    /// the number `123456789`. Secrets and client ids must keep their exact
    /// text; only bracketed values keep the parsed list.
    fn apply_raw_env(&mut self) {
        for (key, raw) in Self::env().iter() {
            if raw.trim_start().starts_with('[') {
                continue;
            }

            let path: Vec<&str> = key.as_str().split('.').collect();
            let section = match path.as_slice() {
                ["connectors", id, _] => self.connectors.entry((*id).to_string()).or_default(),
                ["teams", team, id, _] => self
                    .teams
                    .entry((*team).to_string())
                    .or_default()
                    .entry((*id).to_string())
                    .or_default(),
                _ => continue,
            };

            if let Some(field) = path.last() {
                section.insert((*field).to_string(), FieldValue::Text(raw));
            }
        }
    }

    /// Get the recommended XDG config path for a service
    ///
    /// ```rust
    /// use skyauth::config::SkyAuthConfig;
    ///
    /// let path = SkyAuthConfig::recommended_path("ci");
    /// // Returns: ~/.config/skyauth/ci/config.toml
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("skyauth")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }

    /// Callback address derived from the server settings
    #[must_use]
    pub fn callback_address(&self) -> String {
        self.server.callback_address()
    }

    /// Connector identifiers to resolve
    ///
    /// The explicit `enabled` list when set, otherwise every connector that
    /// has a settings section.
    #[must_use]
    pub fn enabled_connectors(&self) -> Vec<String> {
        if self.enabled.is_empty() {
            self.connectors.keys().cloned().collect()
        } else {
            self.enabled.clone()
        }
    }

    /// Settings of one connector as a config source
    #[must_use]
    pub fn connector_source(&self, id: &str) -> MapSource {
        self.connectors
            .get(id)
            .map(|section| section.clone().into_iter().collect())
            .unwrap_or_default()
    }

    /// Team whitelist settings of one team for one connector
    #[must_use]
    pub fn team_source(&self, team: &str, id: &str) -> MapSource {
        self.teams
            .get(team)
            .and_then(|connectors| connectors.get(id))
            .map(|section| section.clone().into_iter().collect())
            .unwrap_or_default()
    }
}
