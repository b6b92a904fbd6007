//! Connector registry
//!
//! The registry is assembled once at startup with [`ConnectorRegistryBuilder`]
//! and then frozen; a built [`ConnectorRegistry`] has no mutating methods, so
//! it can be shared behind an `Arc` and read from any number of threads.
//! Tests construct their own isolated registries.

use std::collections::BTreeMap;
use std::fmt;

use super::providers::{github, google, oidc};
use super::{ConfigFactory, ProviderConfig, TeamConfigFactory, TeamProviderConfig};
use crate::error::ConnectorError;

/// A registered connector: identifier plus its config constructors
#[derive(Clone)]
pub struct Connector {
    id: String,
    config: ConfigFactory,
    team_config: TeamConfigFactory,
}

impl Connector {
    /// Registry key of this connector
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Factory producing empty provider configs
    #[must_use]
    pub const fn config_factory(&self) -> ConfigFactory {
        self.config
    }

    /// Factory producing empty team configs
    #[must_use]
    pub const fn team_config_factory(&self) -> TeamConfigFactory {
        self.team_config
    }

    /// A fresh, empty provider config
    #[must_use]
    pub fn new_config(&self) -> Box<dyn ProviderConfig> {
        (self.config)()
    }

    /// A fresh, empty team config
    #[must_use]
    pub fn new_team_config(&self) -> Box<dyn TeamProviderConfig> {
        (self.team_config)()
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Collects connectors before the registry is frozen
#[derive(Debug, Default)]
pub struct ConnectorRegistryBuilder {
    connectors: BTreeMap<String, Connector>,
}

impl ConnectorRegistryBuilder {
    /// Register a connector
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered. Registrations are static wiring,
    /// so a duplicate is a programming error and startup must not continue.
    #[must_use]
    pub fn register(
        self,
        id: impl Into<String>,
        config: ConfigFactory,
        team_config: TeamConfigFactory,
    ) -> Self {
        match self.try_register(id, config, team_config) {
            Ok(builder) => builder,
            Err(err) => panic!("{err}"),
        }
    }

    /// Register a connector, reporting duplicates instead of panicking
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::RegistrationConflict`] if `id` is taken; the
    /// existing registration is never overwritten.
    pub fn try_register(
        mut self,
        id: impl Into<String>,
        config: ConfigFactory,
        team_config: TeamConfigFactory,
    ) -> Result<Self, ConnectorError> {
        let id = id.into();
        if self.connectors.contains_key(&id) {
            return Err(ConnectorError::RegistrationConflict(id));
        }

        tracing::debug!(connector = %id, "registered connector");
        self.connectors.insert(
            id.clone(),
            Connector {
                id,
                config,
                team_config,
            },
        );
        Ok(self)
    }

    /// Freeze the table
    #[must_use]
    pub fn build(self) -> ConnectorRegistry {
        ConnectorRegistry {
            connectors: self.connectors,
        }
    }
}

/// Read-only table of available connectors
#[derive(Debug, Clone, Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, Connector>,
}

impl ConnectorRegistry {
    /// Start assembling a registry
    #[must_use]
    pub fn builder() -> ConnectorRegistryBuilder {
        ConnectorRegistryBuilder::default()
    }

    /// Registry with every built-in provider
    ///
    /// ```rust
    /// use skyauth::connectors::ConnectorRegistry;
    ///
    /// let registry = ConnectorRegistry::builtin();
    /// assert!(registry.lookup("google").is_some());
    /// assert!(registry.lookup("myspace").is_none());
    /// ```
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder()
            .register(github::ID, github::new_config, github::new_team_config)
            .register(google::ID, google::new_config, google::new_team_config)
            .register(oidc::ID, oidc::new_config, oidc::new_team_config)
            .build()
    }

    /// Look up a connector by identifier
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&Connector> {
        self.connectors.get(id)
    }

    /// Look up a connector, treating absence as an error
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::UnsupportedProvider`] if `id` is unknown
    pub fn get(&self, id: &str) -> Result<&Connector, ConnectorError> {
        self.lookup(id)
            .ok_or_else(|| ConnectorError::UnsupportedProvider(id.to_string()))
    }

    /// Registered identifiers, sorted
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }

    /// Registered connectors, sorted by identifier
    pub fn iter(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    /// Number of registered connectors
    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
