use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

/// Column holding the opaque row identifier.
pub const ID_COLUMN: &str = "id";

/// Opaque identifier of a persisted row.
///
/// Stores hand out text (UUID) or integer keys; both are carried as their
/// string form so the engine never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an identifier out of a column value. Only non-empty text and
    /// integers identify a row.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Integer(i) => Some(Self(i.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One row: column key to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    columns: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures and payloads.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.columns.get(key)
    }

    /// Value of a column, NULL when absent.
    pub fn value(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.columns.get(key).unwrap_or(&NULL)
    }

    /// Walks a dotted path through embedded related rows, e.g. `vendors.name`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.columns.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.columns.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    pub fn id(&self) -> Option<RecordId> {
        self.columns.get(ID_COLUMN).and_then(RecordId::from_value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.columns.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keeps only the named columns.
    pub fn retain_columns(&mut self, keep: &[String]) {
        self.columns.retain(|key, _| keep.iter().any(|k| k == key));
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}
