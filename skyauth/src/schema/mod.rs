//! Declarative field schemas and the generic binder
//!
//! Every connector describes its operator-facing settings as a static slice of
//! [`FieldSpec`]s. The same schema drives command-line flag generation and
//! config-file binding, so a connector never has to parse anything itself:
//! it receives a [`BoundFields`] and copies values out.
//!
//! # Example
//!
//! ```rust
//! use skyauth::config::MapSource;
//! use skyauth::schema::{bind, FieldSpec};
//!
//! const SCHEMA: &[FieldSpec] = &[
//!     FieldSpec::text("client-id").required(),
//!     FieldSpec::list("scope").keyed("scopes").with_list_default(&["email"]),
//! ];
//!
//! let mut source = MapSource::new();
//! source.set_text("client_id", "abc");
//!
//! let fields = bind(SCHEMA, &source).unwrap();
//! assert_eq!(fields.text("client-id"), "abc");
//! assert_eq!(fields.list("scope"), vec!["email".to_string()]);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{normalize_key, ConfigSource};
use crate::error::ConnectorError;

/// Shape of a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string
    Text,
    /// An ordered list of strings (repeatable flag)
    List,
}

/// Value used when the source does not mention a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Empty string or empty list
    Empty,
    /// Default for a text field
    Text(&'static str),
    /// Default for a list field
    List(&'static [&'static str]),
}

/// One operator-facing configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Flag name, also used in validation messages (`client-id`)
    pub name: &'static str,
    /// Key looked up in config sources (`users` for the `user` flag)
    pub key: &'static str,
    /// Value shape
    pub kind: FieldKind,
    /// Whether validation insists on a non-empty value
    pub required: bool,
    /// Value used when absent
    pub default: FieldDefault,
    /// Help text
    pub description: &'static str,
    /// Placeholder shown in help output
    pub value_name: Option<&'static str>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            key: name,
            kind,
            required: false,
            default: FieldDefault::Empty,
            description: "",
            value_name: None,
        }
    }

    /// A single-valued field
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// A repeatable field
    #[must_use]
    pub const fn list(name: &'static str) -> Self {
        Self::new(name, FieldKind::List)
    }

    /// Mark the field as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Read the value from a different source key than the flag name
    #[must_use]
    pub const fn keyed(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    /// Set the help text
    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set the help placeholder
    #[must_use]
    pub const fn value_name(mut self, value_name: &'static str) -> Self {
        self.value_name = Some(value_name);
        self
    }

    /// Default for a text field
    #[must_use]
    pub const fn with_default(mut self, value: &'static str) -> Self {
        self.default = FieldDefault::Text(value);
        self
    }

    /// Default for a list field
    #[must_use]
    pub const fn with_list_default(mut self, values: &'static [&'static str]) -> Self {
        self.default = FieldDefault::List(values);
        self
    }

    fn default_value(&self) -> FieldValue {
        match (self.kind, self.default) {
            (FieldKind::Text, FieldDefault::Text(value)) => FieldValue::Text(value.to_string()),
            (FieldKind::List, FieldDefault::List(values)) => {
                FieldValue::List(values.iter().map(ToString::to_string).collect())
            }
            (FieldKind::List, FieldDefault::Text(value)) => {
                FieldValue::List(vec![value.to_string()])
            }
            (FieldKind::Text, _) => FieldValue::Text(String::new()),
            (FieldKind::List, _) => FieldValue::List(Vec::new()),
        }
    }
}

/// A raw value supplied by a config source
///
/// Numbers and booleans deserialize as their text, so `client_id = 12345`
/// in a config file is the string `"12345"`. Lists convert element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A single string
    Text(String),
    /// A list of strings
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or a list of them")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<FieldValue, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldValue, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element::<FieldValue>()? {
            match value {
                FieldValue::Text(value) => values.push(value),
                FieldValue::List(_) => {
                    return Err(de::Error::custom("nested lists are not supported"));
                }
            }
        }
        Ok(FieldValue::List(values))
    }
}

/// Field values resolved against a schema, keyed by flag name
#[derive(Debug, Clone, Default)]
pub struct BoundFields {
    values: HashMap<&'static str, FieldValue>,
}

impl BoundFields {
    /// Text value of `name`, empty when unknown
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        match self.values.get(name) {
            Some(FieldValue::Text(value)) => value.clone(),
            _ => String::new(),
        }
    }

    /// List value of `name`, empty when unknown
    #[must_use]
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(FieldValue::List(values)) => values.clone(),
            _ => Vec::new(),
        }
    }
}

/// Resolve every field of `schema` from `source`
///
/// Absent fields take their declared default. A single string given for a
/// list field becomes a one-element list. Required fields are not checked
/// here; connectors report them from `validate` so that all problems surface
/// together.
///
/// # Errors
///
/// Returns [`ConnectorError::InvalidField`] when a list is given for a text
/// field.
pub fn bind(schema: &[FieldSpec], source: &dyn ConfigSource) -> Result<BoundFields, ConnectorError> {
    let mut values = HashMap::with_capacity(schema.len());

    for spec in schema {
        let value = match (spec.kind, source.lookup(spec.key)) {
            (_, None) => spec.default_value(),
            (FieldKind::Text, Some(FieldValue::Text(value))) => FieldValue::Text(value),
            (FieldKind::Text, Some(FieldValue::List(_))) => {
                return Err(ConnectorError::InvalidField {
                    field: spec.name.to_string(),
                    expected: "a single string",
                });
            }
            (FieldKind::List, Some(FieldValue::Text(value))) => FieldValue::List(vec![value]),
            (FieldKind::List, Some(list @ FieldValue::List(_))) => list,
        };
        values.insert(spec.name, value);
    }

    for key in source.keys() {
        if !schema.iter().any(|spec| normalize_key(spec.key) == key) {
            tracing::warn!(key = %key, "ignoring unrecognized configuration key");
        }
    }

    Ok(BoundFields { values })
}
