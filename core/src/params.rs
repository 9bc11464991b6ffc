//! `Parameters` — ordered string multi-map shared by calls and captures.
//!
//! Keys are unique; each key holds a list of values (a tail-card capture is
//! one key with one value per consumed segment). Insertion order is
//! preserved for iteration but is irrelevant to equality.

use std::collections::BTreeMap;

/// An ordered multi-map from parameter name to a list of string values.
///
/// # Example
///
/// ```
/// use waypoint::Parameters;
///
/// let mut params = Parameters::new();
/// params.append("id", "42");
/// params.append("tag", "a");
/// params.append("tag", "b");
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get_all("tag"), Some(&["a".to_string(), "b".to_string()][..]));
/// assert!(!params.contains("missing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    entries: Vec<(String, Vec<String>)>,
}

impl Parameters {
    /// Create an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The distinguished empty value.
    ///
    /// Handy where an API wants `&Parameters` and the caller has nothing to
    /// pass; avoids allocating at every call site.
    #[must_use]
    pub fn empty() -> &'static Self {
        static EMPTY: Parameters = Parameters {
            entries: Vec::new(),
        };
        &EMPTY
    }

    /// Build from `(name, value)` pairs; repeated names accumulate values.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.append(name, value);
        }
        params
    }

    /// Convenience: a single `name=value` entry.
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = Self::new();
        params.append(name, value);
        params
    }

    /// Append one value under `name`, creating the key if absent.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entry_mut(&name) {
            Some(values) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// Append every value under `name`.
    pub fn append_all<V, I>(&mut self, name: impl Into<String>, values: I)
    where
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        let name = name.into();
        let mut incoming: Vec<String> = values.into_iter().map(Into::into).collect();
        if incoming.is_empty() {
            return;
        }
        match self.entry_mut(&name) {
            Some(existing) => existing.append(&mut incoming),
            None => self.entries.push((name, incoming)),
        }
    }

    /// Replace the values under `name` (insert if absent).
    pub fn replace<V, I>(&mut self, name: impl Into<String>, values: I)
    where
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        let name = name.into();
        let incoming: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.entry_mut(&name) {
            Some(existing) => *existing = incoming,
            None => self.entries.push((name, incoming)),
        }
    }

    /// First value under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values under `name`, if the key is present.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Whether the key is present at all.
    ///
    /// Presence is distinct from any stored value — an absent optional path
    /// parameter contributes no key, not an empty string.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, values)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Iterate the key names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Overlay `over` onto `self`: keys in `over` replace keys in `self`.
    ///
    /// Used by resolution to merge captures along the matched branch — the
    /// deepest (most specific) capture wins on a key conflict.
    #[must_use]
    pub fn overlay(&self, over: &Parameters) -> Parameters {
        let mut merged = self.clone();
        for (name, values) in over.iter() {
            merged.replace(name, values.iter().cloned());
        }
        merged
    }

    /// Copy into a sorted map, the persistence-facing shape.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.entries.iter().cloned().collect()
    }

    /// Rebuild from the persistence-facing shape.
    #[must_use]
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, values)| values)
    }
}

// Equality ignores insertion order: two maps with the same keys and the
// same per-key value lists are equal.
impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, values)| other.get_all(name) == Some(values))
    }
}

impl Eq for Parameters {}
