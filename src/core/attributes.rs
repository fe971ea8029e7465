//! Attribute bag: an ordered, loosely-typed set of named values
//!
//! Record data for `insert`/`update` and each WHERE-clause map are bags. Keys
//! are not validated; the grammar agrees with callers on conventions by name.

use super::value::DatabaseValue;

/// Ordered mapping from attribute name to value
///
/// Reading an absent key yields [`DatabaseValue::Null`]. Keys keep the
/// position of their first insertion; setting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, DatabaseValue)>,
}

impl Attributes {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Bag holding a single attribute
    pub fn single(key: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        let mut attributes = Self::new();
        attributes.set(key, value);
        attributes
    }

    /// Chaining form of [`Attributes::set`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Read an attribute; absent keys read as null
    pub fn get(&self, key: &str) -> DatabaseValue {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or(DatabaseValue::Null)
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<DatabaseValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Whether the key is present (a present null still counts)
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &DatabaseValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Flatten a list of bags into one, later entries winning on duplicate keys
    pub fn flatten<'a>(bags: impl IntoIterator<Item = &'a Attributes>) -> Attributes {
        let mut flat = Attributes::new();
        for bag in bags {
            for (key, value) in bag.iter() {
                flat.set(key, value.clone());
            }
        }
        flat
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<DatabaseValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<DatabaseValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
