//! Startup resolution of enabled connectors
//!
//! For every identifier the operator enabled: look it up, build an empty
//! config, bind operator settings, validate, and serialize with the server's
//! callback address. A connector that fails is reported and skipped; the rest
//! still load.

use super::ConnectorRegistry;
use crate::config::{MapSource, SkyAuthConfig};
use crate::error::ConnectorError;
use crate::schema::bind;

/// A connector ready to hand to the downstream connector factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnector {
    /// Registry identifier
    pub id: String,
    /// Login page label
    pub name: String,
    /// Serialized connector payload (JSON)
    pub config: Vec<u8>,
}

/// A connector that could not be enabled
#[derive(Debug)]
pub struct ConnectorFailure {
    /// Identifier the operator asked for
    pub id: String,
    /// Why it failed
    pub error: ConnectorError,
}

/// Outcome of one resolution pass
#[derive(Debug, Default)]
pub struct Resolution {
    /// Connectors that resolved, in request order
    pub connectors: Vec<ResolvedConnector>,
    /// Connectors that did not, in request order
    pub failures: Vec<ConnectorFailure>,
}

impl Resolution {
    /// Whether every requested connector resolved
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolves operator settings into connector payloads
#[derive(Debug, Clone)]
pub struct ConnectorResolver<'a> {
    registry: &'a ConnectorRegistry,
    redirect_uri: String,
}

impl<'a> ConnectorResolver<'a> {
    /// Resolve against `registry`, embedding `redirect_uri` in every payload
    #[must_use]
    pub fn new(registry: &'a ConnectorRegistry, redirect_uri: impl Into<String>) -> Self {
        Self {
            registry,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Callback address embedded in payloads
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Resolve a single connector from `source`
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::UnsupportedProvider`] for unknown
    /// identifiers, a binding error for malformed settings, or the
    /// connector's validation errors.
    pub fn resolve_one(
        &self,
        id: &str,
        source: &MapSource,
    ) -> Result<ResolvedConnector, ConnectorError> {
        let connector = self.registry.get(id)?;

        let mut config = connector.new_config();
        let fields = bind(config.schema(), source)?;
        config.populate(&fields);

        let payload = config.serialize(&self.redirect_uri)?;
        Ok(ResolvedConnector {
            id: id.to_string(),
            name: config.name().to_string(),
            config: payload,
        })
    }

    /// Resolve every identifier in `ids`
    ///
    /// `source_for` supplies the settings of a connector identifier.
    /// Repeated identifiers are resolved once.
    #[must_use]
    pub fn resolve<I, S, F>(&self, ids: I, source_for: F) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> MapSource,
    {
        let mut resolution = Resolution::default();
        let mut seen: Vec<String> = Vec::new();

        for id in ids {
            let id = id.as_ref();
            if seen.iter().any(|s| s == id) {
                tracing::warn!(connector = id, "connector enabled more than once");
                continue;
            }
            seen.push(id.to_string());

            match self.resolve_one(id, &source_for(id)) {
                Ok(connector) => {
                    tracing::info!(connector = id, name = %connector.name, "enabled connector");
                    resolution.connectors.push(connector);
                }
                Err(error) => {
                    tracing::warn!(connector = id, error = %error, "failed to enable connector");
                    resolution.failures.push(ConnectorFailure {
                        id: id.to_string(),
                        error,
                    });
                }
            }
        }

        resolution
    }

    /// Resolve the connectors enabled by a loaded configuration
    #[must_use]
    pub fn resolve_config(&self, config: &SkyAuthConfig) -> Resolution {
        self.resolve(config.enabled_connectors(), |id| config.connector_source(id))
    }
}
