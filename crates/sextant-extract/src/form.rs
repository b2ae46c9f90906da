//! URL-encoded form bodies.
//!
//! A form body decodes into a flat, ordered mapping. Repeated keys and keys
//! with a trailing `[]` collapse into [`FormValue::Many`].

use indexmap::IndexMap;
use serde::Serialize;

use crate::{ExtractionError, ExtractionSource};

/// One form entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    /// A key that occurred once.
    Single(String),
    /// A repeated key, or one written as `key[]`.
    Many(Vec<String>),
}

impl FormValue {
    /// Returns the value of a single entry, or the last value of a list.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Many(values) => values.last().map(String::as_str),
        }
    }

    /// Returns all values.
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(values) => values.push(value),
        }
    }
}

/// Decoded `application/x-www-form-urlencoded` body.
///
/// # Example
///
/// ```
/// use sextant_extract::{FormData, FormValue};
///
/// let form = FormData::parse(b"name=Alice&tag=a&tag=b&ids[]=7").unwrap();
///
/// assert_eq!(form.get("name"), Some(&FormValue::Single("Alice".into())));
/// assert_eq!(form.get("tag").unwrap().all(), vec!["a", "b"]);
/// assert_eq!(form.get("ids").unwrap().all(), vec!["7"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData {
    entries: IndexMap<String, FormValue>,
}

impl FormData {
    /// Parses a URL-encoded body. An empty body yields an empty form.
    pub fn parse(body: &[u8]) -> Result<Self, ExtractionError> {
        let body = std::str::from_utf8(body).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Body, format!("invalid UTF-8: {e}"))
        })?;

        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
            .map_err(|e| ExtractionError::deserialization_failed(ExtractionSource::Body, e))?;

        let mut entries: IndexMap<String, FormValue> = IndexMap::new();
        for (key, value) in pairs {
            let (key, is_list) = match key.strip_suffix("[]") {
                Some(stripped) => (stripped.to_string(), true),
                None => (key, false),
            };

            match entries.get_mut(&key) {
                Some(existing) => existing.push(value),
                None if is_list => {
                    entries.insert(key, FormValue::Many(vec![value]));
                }
                None => {
                    entries.insert(key, FormValue::Single(value));
                }
            }
        }

        Ok(Self { entries })
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.entries.get(key)
    }

    /// Iterates over entries in body order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the form has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the form into a JSON object of strings and string arrays.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .entries
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    FormValue::Single(v) => serde_json::Value::String(v.clone()),
                    FormValue::Many(vs) => vs.iter().cloned().map(serde_json::Value::String).collect(),
                };
                (key.clone(), value)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}
