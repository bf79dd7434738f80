use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::classify::ImageCategory;
use crate::detect::DetectionResult;
use crate::templates::TemplateKind;
use crate::warnings::ParseWarning;

/// Sentinel substituted for missing or empty business data.
pub const PLACEHOLDER: &str = "-";

/// A cleaned cell value as it appears in the parsed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn placeholder() -> Scalar {
        Scalar::Text(PLACEHOLDER.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Scalar::Text(s) if s == PLACEHOLDER)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<usize> for Scalar {
    fn from(n: usize) -> Self {
        Scalar::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// String-keyed map that keeps insertion order and serializes as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An existing key keeps its position and the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

/// Canonical field name -> cleaned value. Used for key-value sheets and row-records.
pub type Fields = OrderedMap<Scalar>;

/// Output of one declared sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedSection {
    KeyValue(Fields),
    Table(Vec<Fields>),
}

impl ParsedSection {
    pub fn len(&self) -> usize {
        match self {
            ParsedSection::KeyValue(fields) => fields.len(),
            ParsedSection::Table(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_key_value(&self) -> Option<&Fields> {
        match self {
            ParsedSection::KeyValue(fields) => Some(fields),
            ParsedSection::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&[Fields]> {
        match self {
            ParsedSection::Table(rows) => Some(rows),
            ParsedSection::KeyValue(_) => None,
        }
    }
}

/// Counts and presence flags derived from the parsed sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsingStats(Fields);

impl ParsingStats {
    pub fn set(&mut self, name: &str, value: impl Into<Scalar>) {
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.get(name)
    }

    pub fn count(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Scalar::as_i64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Scalar::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.0.iter()
    }
}

/// Zero-based cell position of an image anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellAnchor {
    pub row: u32,
    pub col: u32,
}

impl CellAnchor {
    /// A1-style reference, e.g. `{ row: 3, col: 1 }` -> "B4".
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row + 1)
    }
}

/// Spreadsheet column letters for a zero-based index (0 -> "A", 27 -> "AB").
pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// An image embedded in the workbook.
///
/// The binary content is owned here until the result is handed to an
/// [`ImageStore`](crate::storage::ImageStore); afterwards only metadata and
/// `storage_ref` remain.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedImage {
    pub id: String,
    pub sheet_name: String,
    pub cell_reference: String,
    pub file_name: String,
    /// Picture name given in the drawing (e.g. "Checkout mockup").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: usize,
    pub category: ImageCategory,
    /// Asset type declared on the data row nearest the anchor, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_ref: Option<String>,
    #[serde(skip)]
    pub anchor: CellAnchor,
    #[serde(skip)]
    pub content: Vec<u8>,
}

/// The parsed document handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub title: String,
    pub description: String,
    pub category_name: String,
    pub template_kind: TemplateKind,
    pub approval_status: String,
    pub detection: DetectionResult,
    pub sections: OrderedMap<ParsedSection>,
    pub images: Vec<ExtractedImage>,
    pub parsing_stats: ParsingStats,
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    pub fn section(&self, name: &str) -> Option<&ParsedSection> {
        self.sections.get(name)
    }

    /// Rows of a tabular section; empty if the section is absent or key-value.
    pub fn table(&self, name: &str) -> &[Fields] {
        self.sections
            .get(name)
            .and_then(ParsedSection::as_table)
            .unwrap_or(&[])
    }

    pub fn key_values(&self, name: &str) -> Option<&Fields> {
        self.sections.get(name).and_then(ParsedSection::as_key_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_map_keeps_insertion_order() {
        let mut map: Fields = OrderedMap::new();
        map.insert("zeta", Scalar::from("z"));
        map.insert("alpha", Scalar::from("a"));
        map.insert("zeta", Scalar::from("z2"));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(map.get("zeta"), Some(&Scalar::from("z2")));
    }

    #[test]
    fn test_ordered_map_serializes_in_order() {
        let mut map: Fields = OrderedMap::new();
        map.insert("b", Scalar::Int(2));
        map.insert("a", Scalar::Bool(true));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"b":2,"a":true}"#);
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(CellAnchor { row: 3, col: 1 }.to_a1(), "B4");
    }

    #[test]
    fn test_placeholder() {
        assert!(Scalar::placeholder().is_placeholder());
        assert!(!Scalar::from("x").is_placeholder());
        assert!(!Scalar::Int(0).is_placeholder());
    }
}
