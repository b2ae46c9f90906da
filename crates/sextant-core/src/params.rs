//! Route-matched path attributes.
//!
//! The host router matches a request against a path template such as
//! `/users/{id}` and hands the captured segments over as [`PathAttributes`].
//! Most routes capture one to four segments, so the storage is inline.

use smallvec::SmallVec;

const INLINE_ATTRIBUTES: usize = 4;

/// Path segments captured by the host router, keyed by template name.
///
/// Names are unique: inserting an existing name replaces its value, which
/// mirrors how attribute bags behave in most routers.
///
/// # Example
///
/// ```rust
/// use sextant_core::PathAttributes;
///
/// let mut attributes = PathAttributes::new();
/// attributes.insert("id", "42");
/// attributes.insert("id", "43");
///
/// assert_eq!(attributes.get("id"), Some("43"));
/// assert_eq!(attributes.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathAttributes {
    inner: SmallVec<[(String, String); INLINE_ATTRIBUTES]>,
}

impl PathAttributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute, replacing any previous value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.inner.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Returns the captured value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for PathAttributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}
