//! FITS header snapshot: an insertion-ordered map from uppercase keyword to
//! scalar value.
//!
//! Headers flow into the WCS layer read-only. The fit engine copies one,
//! rewrites the astrometric keywords on the copy, and builds a new WCS
//! context from it; the original is never mutated in place.

#[cfg(test)]
#[path = "header_test.rs"]
mod header_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error("header JSON must be an object")]
    NotAnObject,
    #[error("unsupported value for keyword {key}: only numbers, strings and booleans are allowed")]
    UnsupportedValue { key: String },
    #[error("invalid header JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single header card value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl HeaderValue {
    /// Numeric value of an `Int` or `Float` card.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Str(_) => None,
        }
    }

    /// Trimmed text of a `Str` card.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.trim()),
            _ => None,
        }
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Ordered FITS keyword store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HeaderRepr", into = "HeaderRepr")]
pub struct Header {
    cards: Vec<(String, HeaderValue)>,
    index: HashMap<String, usize>,
}

/// Wire form: cards in header order.
#[derive(Serialize, Deserialize)]
struct HeaderRepr {
    cards: Vec<Card>,
}

#[derive(Serialize, Deserialize)]
struct Card {
    key: String,
    value: HeaderValue,
}

impl From<HeaderRepr> for Header {
    fn from(repr: HeaderRepr) -> Self {
        repr.cards.into_iter().map(|card| (card.key, card.value)).collect()
    }
}

impl From<Header> for HeaderRepr {
    fn from(header: Header) -> Self {
        let cards = header.cards.into_iter().map(|(key, value)| Card { key, value }).collect();
        Self { cards }
    }
}

impl Header {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object (`{"CTYPE1": "RA---TAN", ...}`). Cards keep
    /// the order in which keys appear in the text.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError`] for invalid JSON, a non-object root, or
    /// nested/null values.
    pub fn from_json_str(text: &str) -> Result<Self, HeaderError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(HeaderError::NotAnObject)?;

        let mut header = Self::new();
        for (key, raw) in object {
            let card = match raw {
                serde_json::Value::Bool(b) => HeaderValue::Bool(*b),
                serde_json::Value::String(s) => HeaderValue::Str(s.clone()),
                serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => HeaderValue::Int(i),
                    (None, Some(f)) => HeaderValue::Float(f),
                    (None, None) => return Err(HeaderError::UnsupportedValue { key: key.clone() }),
                },
                _ => return Err(HeaderError::UnsupportedValue { key: key.clone() }),
            };
            header.insert(key, card);
        }
        Ok(header)
    }

    /// Insert or replace a card. Keys are uppercased; a replaced card keeps
    /// its original position.
    pub fn insert(&mut self, key: &str, value: impl Into<HeaderValue>) {
        let key = key.trim().to_ascii_uppercase();
        let value = value.into();
        if let Some(&pos) = self.index.get(&key) {
            self.cards[pos].1 = value;
        } else {
            self.index.insert(key.clone(), self.cards.len());
            self.cards.push((key, value));
        }
    }

    /// Remove a card, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<HeaderValue> {
        let key = key.trim().to_ascii_uppercase();
        let pos = self.index.remove(&key)?;
        let (_, value) = self.cards.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        let pos = self.index.get(&key.trim().to_ascii_uppercase())?;
        self.cards.get(*pos).map(|(_, v)| v)
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keywords in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|(k, _)| k.as_str())
    }

    /// Cards in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Header
where
    K: AsRef<str>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = Self::new();
        for (k, v) in iter {
            header.insert(k.as_ref(), v);
        }
        header
    }
}
