//! Error types and error handling
//!
//! Connector resolution has three failure classes: a provider's configuration
//! is incomplete ([`ValidationErrors`]), the registry was assembled twice with
//! the same identifier, or an operator asked for a connector nobody registered.

use std::fmt;

use thiserror::Error;

/// Library error type
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// One or more required fields are missing
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// A connector identifier was registered twice
    #[error("connector '{0}' is already registered")]
    RegistrationConflict(String),

    /// The requested connector identifier is not registered
    #[error("unsupported provider '{0}'")]
    UnsupportedProvider(String),

    /// A configuration value has the wrong shape for its field
    #[error("invalid value for '{field}': expected {expected}")]
    InvalidField {
        /// Field name as declared in the schema
        field: String,
        /// Human readable description of the expected shape
        expected: &'static str,
    },

    /// A team has no users or groups from any connector
    #[error("no auth methods configured for team '{0}'")]
    NoTeamAuth(String),

    /// Payload encoding failed
    #[error("failed to encode connector payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ConnectorError {
    /// Returns the aggregated validation errors, if this is a validation failure
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A single violated rule on a configuration field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field the rule applies to
    pub field: String,
    /// The error message
    pub message: String,
}

impl FieldError {
    /// Create a "Missing <field>" error
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("Missing {field}"),
            field,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Every violated rule of one provider configuration, in check order
///
/// Validation never stops at the first problem, so an operator sees all of
/// them at once.
///
/// # Examples
///
/// ```rust
/// use skyauth::error::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.missing("client-id");
/// errors.missing("client-secret");
///
/// assert_eq!(errors.count(), 2);
/// assert!(errors.to_string().contains("Missing client-secret"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create a new empty error collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a required field is absent
    pub fn missing(&mut self, field: impl Into<String>) {
        self.errors.push(FieldError::missing(field));
    }

    /// Record `field` as missing when `value` is empty
    pub fn require(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.missing(field);
        }
    }

    /// Check if there are any errors
    #[must_use]
    pub const fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if a specific field has errors
    #[must_use]
    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Get the total number of errors
    #[must_use]
    pub const fn count(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over all errors
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when empty, otherwise the collection itself
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one rule was violated
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        writeln!(f, "{} {noun} occurred:", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "\t* {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_is_ok() {
        let errors = ValidationErrors::new();
        assert!(!errors.has_errors());
        assert_eq!(errors.into_result(), Ok(()));
    }

    #[test]
    fn test_require_only_flags_empty_values() {
        let mut errors = ValidationErrors::new();
        errors.require("client-id", "");
        errors.require("client-secret", "s3cret");

        assert!(errors.has_field_error("client-id"));
        assert!(!errors.has_field_error("client-secret"));
        assert_eq!(errors.count(), 1);
    }

    #[test]
    fn test_display_lists_every_error() {
        let mut errors = ValidationErrors::new();
        errors.missing("client-id");
        errors.missing("client-secret");

        assert_eq!(
            errors.to_string(),
            "2 errors occurred:\n\t* Missing client-id\n\t* Missing client-secret\n"
        );
    }

    #[test]
    fn test_display_singular() {
        let mut errors = ValidationErrors::new();
        errors.missing("issuer");
        assert!(errors.to_string().starts_with("1 error occurred:"));
    }

    #[test]
    fn test_connector_error_exposes_validation() {
        let mut errors = ValidationErrors::new();
        errors.missing("client-id");
        let err = ConnectorError::from(errors.clone());

        assert_eq!(err.validation(), Some(&errors));
        assert!(ConnectorError::UnsupportedProvider("x".into())
            .validation()
            .is_none());
    }
}
