//! Card metadata records.
//!
//! A card is described by a flat mapping of field names to values. Values are
//! plain strings, string lists (frame names, ability costs) or nested card
//! records (the back face of a transform card).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "RawField")]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Cards(Vec<CardMetadata>),
}

/// Sheet exports freely mix numbers, booleans and blanks with strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Scalar>),
    Cards(Vec<CardMetadata>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

impl From<RawField> for FieldValue {
    fn from(raw: RawField) -> Self {
        match raw {
            RawField::Null => FieldValue::Text(String::new()),
            RawField::Text(s) => FieldValue::Text(s),
            RawField::Int(i) => FieldValue::Text(i.to_string()),
            RawField::Float(f) => FieldValue::Text(f.to_string()),
            RawField::Bool(b) => FieldValue::Text(b.to_string()),
            RawField::List(items) => FieldValue::List(items.into_iter().map(String::from).collect()),
            RawField::Cards(cards) => FieldValue::Cards(cards),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(list: Vec<String>) -> Self {
        FieldValue::List(list)
    }
}

/// Metadata for one card, usually one row of the source sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardMetadata {
    fields: BTreeMap<String, FieldValue>,
}

impl CardMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// A text field, trimmed; empty strings count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) => {
                let s = s.trim();
                (!s.is_empty()).then_some(s)
            }
            _ => None,
        }
    }

    /// A list field. A text value is split on commas so sheet cells like
    /// `"frame, legendary-crown"` read the same as YAML lists.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(FieldValue::List(items)) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Some(FieldValue::Text(s)) => s
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Nested card records (e.g. `back`).
    pub fn cards(&self, key: &str) -> &[CardMetadata] {
        match self.fields.get(key) {
            Some(FieldValue::Cards(cards)) => cards,
            _ => &[],
        }
    }

    /// The card title, or `"untitled"`.
    pub fn title(&self) -> &str {
        self.text("title").unwrap_or("untitled")
    }

    /// Field names present on this card.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }
}
