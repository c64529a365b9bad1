//! Request parameters as an ordered name -> value mapping.
//!
//! A [`ParameterSet`] holds every query-string (and optionally body) input of
//! one request. Iteration order is insertion order, which is the order in
//! which the filter engine dispatches parameter handlers.
//!
//! ```rust,ignore
//! use paramfilter::ParameterSet;
//!
//! let params = ParameterSet::from_query("status=active&tags[]=a&tags[]=b");
//! assert_eq!(params.names().collect::<Vec<_>>(), ["status", "tags"]);
//! ```

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// Suffix marking a repeated parameter that collects into an array.
const ARRAY_MARKER: &str = "[]";

/// Returns true for values treated as "present but unset": `null`, `""`,
/// `[]` and `{}`.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Ordered mapping of parameter names to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, Value)>,
}

impl ParameterSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a raw `application/x-www-form-urlencoded` query string.
    ///
    /// - `name=value` stores a string, a bare `name` stores `""`
    /// - `name[]=a&name[]=b` collects `["a", "b"]` under `name`
    /// - a repeated plain name keeps its first position and its last value
    #[must_use]
    pub fn from_query(raw: &str) -> Self {
        let mut params = Self::new();
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if let Some(name) = key.strip_suffix(ARRAY_MARKER) {
                params.push_array_item(name, Value::String(value.into_owned()));
            } else {
                params.insert(key.into_owned(), Value::String(value.into_owned()));
            }
        }

        params
    }

    /// Merge a JSON request body into the set.
    ///
    /// Body values replace query values of the same name in place; new names
    /// are appended in body order. Anything other than an object is ignored.
    pub fn merge_body(&mut self, body: Value) {
        match body {
            Value::Object(map) => {
                for (name, value) in map {
                    self.insert(name, value);
                }
            }
            other => {
                tracing::debug!(body = %other, "Ignoring non-object request body");
            }
        }
    }

    /// Insert a value, replacing an existing one without moving it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    fn push_array_item(&mut self, name: &str, item: Value) {
        let Some(index) = self.position(name) else {
            self.entries
                .push((name.to_string(), Value::Array(vec![item])));
            return;
        };

        match &mut self.entries[index].1 {
            Value::Array(items) => items.push(item),
            slot => *slot = Value::Array(vec![item]),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

struct ParameterSetVisitor;

impl<'de> Visitor<'de> for ParameterSetVisitor {
    type Value = ParameterSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of parameter names to values")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut params = ParameterSet::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            params.insert(name, value);
        }
        Ok(params)
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ParameterSetVisitor)
    }
}
