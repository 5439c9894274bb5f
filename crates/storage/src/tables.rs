use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A category key such as `"azione"` or `"energy"`.
pub type Category = String;

/// An opaque option identifier inside a category.
pub type Code = String;

/// Category -> candidate codes, in document order.
pub type OptionsTable = CategoryMap<Vec<Code>>;

/// The three persisted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Options,
    Scores,
    Mapping,
}

impl Document {
    /// File name of the document inside a data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Document::Options => "options.json",
            Document::Scores => "scores.json",
            Document::Mapping => "mapping.json",
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Document::Options => "options",
            Document::Scores => "scores",
            Document::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

// ── CategoryMap ──────────────────────────────────────────────────────────────

/// A map keyed by category that keeps insertion order.
///
/// Serializes as a JSON object and deserializes in document order, so the
/// order categories appear in `options.json` is the order they are spun and
/// reported in. Re-inserting an existing key replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap<V> {
    entries: Vec<(Category, V)>,
}

impl<V> Default for CategoryMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> CategoryMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == category)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Insert a value, returning the previous one if the category existed.
    pub fn insert(&mut self, category: impl Into<Category>, value: V) -> Option<V> {
        let category = category.into();
        match self.entries.iter_mut().find(|(key, _)| *key == category) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((category, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl CategoryMap<Vec<Code>> {
    /// Candidate codes for a category; empty when the category is absent.
    pub fn codes(&self, category: &str) -> &[Code] {
        self.get(category).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl<K: Into<Category>, V> FromIterator<(K, V)> for CategoryMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = CategoryMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for CategoryMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct CategoryMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for CategoryMapVisitor<V> {
    type Value = CategoryMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object keyed by category")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = CategoryMap::new();
        while let Some((key, value)) = access.next_entry::<Category, V>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CategoryMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CategoryMapVisitor(PhantomData))
    }
}

// ── ScoreTable ───────────────────────────────────────────────────────────────

/// Feedback scores in one flat key space shared by every category.
///
/// An absent code has score 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable(BTreeMap<Code, i64>);

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> i64 {
        self.0.get(code).copied().unwrap_or(0)
    }

    /// Add `delta` to a code's score, creating it on first mention.
    /// Returns the new score.
    pub fn adjust(&mut self, code: &str, delta: i64) -> i64 {
        let score = self.0.entry(code.to_string()).or_insert(0);
        *score += delta;
        *score
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(code, score)| (code.as_str(), *score))
    }
}

impl<K: Into<Code>> FromIterator<(K, i64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ── MappingTable ─────────────────────────────────────────────────────────────

/// Display metadata for one code.
///
/// `mapping.json` values are either a bare label string or a record carrying
/// the capability tags used by the action/place compatibility check. Any
/// other value is kept as-is and contributes neither a label nor tags, so
/// one malformed entry never invalidates the rest of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingEntry {
    Label(String),
    Record {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        needs: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        supports: Vec<String>,
    },
    Other(serde_json::Value),
}

impl MappingEntry {
    /// Capabilities an action requires from its place.
    pub fn needs(&self) -> &[String] {
        match self {
            MappingEntry::Record { needs, .. } => needs,
            MappingEntry::Label(_) | MappingEntry::Other(_) => &[],
        }
    }

    /// Capabilities a place offers.
    pub fn supports(&self) -> &[String] {
        match self {
            MappingEntry::Record { supports, .. } => supports,
            MappingEntry::Label(_) | MappingEntry::Other(_) => &[],
        }
    }
}

/// Code -> display label or capability record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(BTreeMap<Code, MappingEntry>);

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<Code>, entry: MappingEntry) {
        self.0.insert(code.into(), entry);
    }

    pub fn get(&self, code: &str) -> Option<&MappingEntry> {
        self.0.get(code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Human-readable label for a code, falling back to the code itself.
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        match self.0.get(code) {
            Some(MappingEntry::Label(label)) => label,
            Some(MappingEntry::Record {
                label: Some(label), ..
            }) => label,
            _ => code,
        }
    }

    pub fn needs(&self, code: &str) -> &[String] {
        self.0.get(code).map(MappingEntry::needs).unwrap_or(&[])
    }

    pub fn supports(&self, code: &str) -> &[String] {
        self.0.get(code).map(MappingEntry::supports).unwrap_or(&[])
    }
}

impl<K: Into<Code>> FromIterator<(K, MappingEntry)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (K, MappingEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

/// A read snapshot of all three documents, loaded once per request.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub options: OptionsTable,
    pub scores: ScoreTable,
    pub mapping: MappingTable,
}
