//! Built-in connector implementations
//!
//! - Google OAuth2 (with hosted-domain and group restrictions)
//! - GitHub OAuth2 (github.com and GitHub Enterprise)
//! - Generic OpenID Connect
//!
//! Each module exposes its registry `ID` and the `new_config` /
//! `new_team_config` factories registered by
//! [`ConnectorRegistry::builtin`](super::ConnectorRegistry::builtin).

pub mod github;
pub mod google;
pub mod oidc;

pub use github::{GitHubConfig, GitHubTeamConfig};
pub use google::{GoogleConfig, GoogleTeamConfig};
pub use oidc::{OidcConfig, OidcTeamConfig};
