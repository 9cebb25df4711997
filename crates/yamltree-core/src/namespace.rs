//! Interpolation namespaces
//!
//! A namespace maps placeholder names to the strings substituted for them.
//! A tree carries a persistent namespace; single calls may overlay extra
//! entries on top of it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Mapping from placeholder identifier to replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    entries: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry, returning the namespace for chaining
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.entries.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a copy of this namespace with `extra` laid on top.
    ///
    /// Entries in `extra` win on conflict.
    pub fn overlay(&self, extra: &Namespace) -> Namespace {
        let mut merged = self.clone();
        for (name, value) in &extra.entries {
            merged.entries.insert(name.clone(), value.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ns = Namespace::new();
        for (k, v) in iter {
            ns.insert(k, v);
        }
        ns
    }
}

impl FromIterator<Binding> for Namespace {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        iter.into_iter().map(|b| (b.name, b.value)).collect()
    }
}

/// A single `name=value` entry, as written on a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("expected name=value, got '{0}'")]
    MissingEquals(String),

    #[error("'{0}' is not a valid placeholder name")]
    InvalidName(String),
}

impl FromStr for Binding {
    type Err = BindingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| BindingError::MissingEquals(s.to_string()))?;
        let name = name.trim();
        if !crate::interpolation::is_identifier(name) {
            return Err(BindingError::InvalidName(name.to_string()));
        }
        Ok(Binding {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
