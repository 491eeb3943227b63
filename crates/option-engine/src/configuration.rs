//! Assignments and Resolved Configurations
//!
//! Sparse caller input and the complete per-variant mapping produced from it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One caller-chosen value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAssignment {
    /// Qualified id or bare option name
    pub option: String,
    pub value: String,
}

impl OptionAssignment {
    pub fn new(option: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            value: value.into(),
        }
    }
}

/// Sparse option assignments for one build variant; later sets win
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignments(IndexMap<String, String>);

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, option: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(option.into(), value.into());
        self
    }

    pub fn with(mut self, option: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(option, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<OptionAssignment> for Assignments {
    fn from_iter<I: IntoIterator<Item = OptionAssignment>>(iter: I) -> Self {
        Self(iter.into_iter().map(|a| (a.option, a.value)).collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Assignments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Explicit,
    Default,
}

/// Effective value of one option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub value: String,
    pub source: ValueSource,
}

/// Every declared option mapped to its effective value, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfiguration {
    entries: IndexMap<String, ResolvedValue>,
}

impl ResolvedConfiguration {
    pub(crate) fn insert(&mut self, id: &str, value: &str, source: ValueSource) {
        self.entries.insert(
            id.to_string(),
            ResolvedValue {
                value: value.to_string(),
                source,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedValue> {
        self.entries.get(id)
    }

    /// Effective value of the option with qualified id `id`
    pub fn value(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|r| r.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Options set explicitly by the caller
    pub fn explicit(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(_, r)| r.source == ValueSource::Explicit)
            .map(|(id, r)| (id, r.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
