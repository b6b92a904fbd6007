//! Identity connector configuration
//!
//! A connector is an external identity backend (Google, GitHub, a generic
//! OIDC issuer). This module only prepares the data those backends are built
//! from:
//!
//! - [`ProviderConfig`]: one provider's settings, validated and serialized to
//!   the payload the downstream connector factory expects
//! - [`TeamProviderConfig`]: per-team user and group whitelists
//! - [`ConnectorRegistry`]: the table of available connectors
//! - [`ConnectorResolver`]: the startup pass that turns operator settings into
//!   payloads
//!
//! All built-in providers live in [`providers`].

pub mod providers;
pub mod registry;
pub mod resolve;
pub mod team;

pub use registry::{Connector, ConnectorRegistry, ConnectorRegistryBuilder};
pub use resolve::{ConnectorFailure, ConnectorResolver, Resolution, ResolvedConnector};
pub use team::{TeamAuth, TeamRoles};

use std::fmt;

use serde::Serialize;

use crate::error::{ConnectorError, ValidationErrors};
use crate::schema::{BoundFields, FieldSpec};

/// Settings of one identity provider
///
/// Instances start empty (from a registry factory), are populated once from
/// operator input with [`populate`](Self::populate), and are read-only after
/// that.
pub trait ProviderConfig: fmt::Debug + Send + Sync {
    /// Operator-facing fields of this provider
    fn schema(&self) -> &'static [FieldSpec];

    /// Copy bound values into this config
    fn populate(&mut self, fields: &BoundFields);

    /// Display name shown on the login page
    fn name(&self) -> &str;

    /// Check required fields, reporting every violation at once
    ///
    /// # Errors
    ///
    /// Returns one "Missing <field>" entry per absent required field
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Validate, then encode the downstream connector payload
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Validation`] carrying exactly what
    /// [`validate`](Self::validate) reported, or an encoding error.
    fn serialize(&self, redirect_uri: &str) -> Result<Vec<u8>, ConnectorError>;
}

/// Per-team whitelist for one provider
pub trait TeamProviderConfig: fmt::Debug + Send + Sync {
    /// Operator-facing fields of this whitelist
    fn schema(&self) -> &'static [FieldSpec];

    /// Copy bound values into this config
    fn populate(&mut self, fields: &BoundFields);

    /// Whitelisted users, as configured
    fn users(&self) -> &[String];

    /// Whitelisted groups, as configured
    fn groups(&self) -> &[String];
}

/// Builds an empty provider config
pub type ConfigFactory = fn() -> Box<dyn ProviderConfig>;

/// Builds an empty team config
pub type TeamConfigFactory = fn() -> Box<dyn TeamProviderConfig>;

/// Encode `payload` as JSON once `validation` has passed
///
/// Shared tail of every provider's `serialize`.
pub(crate) fn encode_validated<T: Serialize>(
    validation: Result<(), ValidationErrors>,
    payload: impl FnOnce() -> T,
) -> Result<Vec<u8>, ConnectorError> {
    validation?;
    Ok(serde_json::to_vec(&payload())?)
}

/// Display name or the provider's default
pub(crate) const fn display_name<'a>(configured: &'a str, default: &'static str) -> &'a str {
    if configured.is_empty() {
        default
    } else {
        configured
    }
}
