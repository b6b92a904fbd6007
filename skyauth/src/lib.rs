//! skyauth: identity connector registry and configuration resolution
//!
//! An authentication server delegates the actual OAuth2/OIDC handshakes to
//! external identity connectors. Those connectors are built from JSON
//! payloads, and this crate produces them:
//!
//! 1. a [`ConnectorRegistry`](connectors::ConnectorRegistry) maps provider
//!    identifiers to config constructors
//! 2. operator settings (config file, environment, command-line flags) are
//!    bound to each provider's declarative [`schema`]
//! 3. each provider config validates its required fields, reporting all of
//!    them at once
//! 4. validated configs serialize to the exact payload the connector factory
//!    expects, with the server's callback address embedded
//!
//! # Quick Start
//!
//! ```rust
//! use skyauth::prelude::*;
//!
//! let registry = ConnectorRegistry::builtin();
//! let resolver = ConnectorResolver::new(&registry, "https://ci.example.com/sky/issuer/callback");
//!
//! let mut source = MapSource::new();
//! source.set_text("client-id", "my-client-id");
//! source.set_text("client-secret", "my-client-secret");
//!
//! let google = resolver.resolve_one("google", &source).unwrap();
//! assert_eq!(google.name, "Google");
//! ```

pub mod config;
pub mod connectors;
pub mod error;
pub mod observability;
pub mod schema;

pub mod prelude {
    //! Convenience re-exports for common types and traits

    pub use crate::config::{ConfigSource, MapSource, SkyAuthConfig};
    pub use crate::connectors::{
        Connector, ConnectorRegistry, ConnectorResolver, ProviderConfig, Resolution,
        ResolvedConnector, TeamAuth, TeamProviderConfig, TeamRoles,
    };
    pub use crate::error::{ConnectorError, ValidationErrors};
    pub use crate::schema::{bind, BoundFields, FieldKind, FieldSpec, FieldValue};
}
