//! Config sources consumed by the schema binder

use std::collections::BTreeMap;

use crate::schema::FieldValue;

/// Normalize a source key so `client_id`, `client-id` and `CLIENT_ID` match
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

/// A mapping from field key to raw value
///
/// Implementations must be side-effect free; the binder may call `lookup`
/// for every field of a schema.
pub trait ConfigSource {
    /// Value stored under `key`, if any
    fn lookup(&self, key: &str) -> Option<FieldValue>;

    /// Every key present, normalized
    fn keys(&self) -> Vec<String>;
}

/// In-memory config source
///
/// Built from config file sections and from parsed command-line flags. Keys
/// are normalized on insert and lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSource {
    values: BTreeMap<String, FieldValue>,
}

impl MapSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no key is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&mut self, key: &str, value: FieldValue) {
        self.values.insert(normalize_key(key), value);
    }

    /// Store a text value under `key`
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, FieldValue::Text(value.into()));
    }

    /// Append `value` to the list under `key`
    ///
    /// A text value already stored under `key` becomes the first list element.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let key = normalize_key(key);
        let value = value.into();
        let list = match self.values.remove(&key) {
            None => vec![value],
            Some(FieldValue::List(mut values)) => {
                values.push(value);
                values
            }
            Some(FieldValue::Text(existing)) => vec![existing, value],
        };
        self.values.insert(key, FieldValue::List(list));
    }

    /// Overlay `other` on top of `self`; keys in `other` win
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }
}

impl ConfigSource for MapSource {
    fn lookup(&self, key: &str) -> Option<FieldValue> {
        self.values.get(&normalize_key(key)).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

impl<K: AsRef<str>> FromIterator<(K, FieldValue)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (key, value) in iter {
            source.set(key.as_ref(), value);
        }
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("client_id"), "client-id");
        assert_eq!(normalize_key("CLIENT_SECRET"), "client-secret");
        assert_eq!(normalize_key("host"), "host");
    }

    #[test]
    fn test_push_promotes_text() {
        let mut source = MapSource::new();
        source.set_text("user", "alice");
        source.push("user", "bob");

        assert_eq!(
            source.lookup("user"),
            Some(FieldValue::List(vec!["alice".into(), "bob".into()]))
        );
    }

    #[test]
    fn test_merge_overrides() {
        let mut file = MapSource::new();
        file.set_text("client-id", "from-file");
        file.set_text("client-secret", "file-secret");

        let mut flags = MapSource::new();
        flags.set_text("client_id", "from-flag");

        file.merge(flags);
        assert_eq!(file.lookup("client-id"), Some(FieldValue::Text("from-flag".into())));
        assert_eq!(
            file.lookup("client-secret"),
            Some(FieldValue::Text("file-secret".into()))
        );
    }

    #[test]
    fn test_from_iter_normalizes() {
        let source: MapSource = [("Client_Id", FieldValue::Text("x".into()))]
            .into_iter()
            .collect();
        assert_eq!(source.keys(), vec!["client-id".to_string()]);
    }
}
