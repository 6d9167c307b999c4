//! Filter expressions in the OpenAlex `filter=` grammar
//!
//! `field:value` segments are ANDed with `,`; alternatives within one
//! field are ORed with `|`.

use std::fmt;

/// Value side of a single filter segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    One(String),
    /// Any of the values (OR within the field)
    AnyOf(Vec<String>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(v) => f.write_str(v),
            Self::AnyOf(vs) => f.write_str(&vs.join("|")),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::One(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::One(v)
    }
}

impl<S: Into<String>> From<Vec<S>> for FilterValue {
    fn from(vs: Vec<S>) -> Self {
        Self::AnyOf(vs.into_iter().map(Into::into).collect())
    }
}

/// Ordered filter pairs, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pairs: Vec<(String, FilterValue)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style push
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, value: impl Into<FilterValue>) {
        self.pairs.push((field.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, FilterValue)] {
        &self.pairs
    }

    /// Serialize into the `filter=` query value, insertion order kept.
    pub fn serialize(&self) -> String {
        self.pairs
            .iter()
            .map(|(field, value)| format!("{field}:{value}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSpec
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut spec = Self::new();
        for (k, v) in iter {
            spec.push(k, v);
        }
        spec
    }
}
