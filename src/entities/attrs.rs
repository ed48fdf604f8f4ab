//! Generic attribute storage shared across core types.
//!
//! Items carry their optional property overrides here as a string-keyed bag:
//! a missing key means "inherit the intrinsic value," so the resolver always
//! reads through `get_*` with a fallback. Cosmetic keys (label, color) live
//! in the same bag but are filtered out of modification accounting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::keys::COSMETIC_KEYS;

/// Generic attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Bool(bool),
    Str(String),
    Int(i32),
    Float(f64),
}

/// Attribute container: string key -> typed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attrs {
    #[serde(default)]
    map: HashMap<String, AttrValue>,
}

impl Attrs {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttrValue) {
        self.map.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.map.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.map.get(key) {
            Some(AttrValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.map.get(key) {
            Some(AttrValue::Int(v)) => Some(*v),
            Some(AttrValue::Float(v)) => Some(*v as i32),
            _ => None,
        }
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.map.get(key) {
            Some(AttrValue::Float(v)) => Some(*v),
            Some(AttrValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.map.get(key) {
            Some(AttrValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    // Generic helpers with defaults (to reduce boilerplate)

    /// Get i32 value with custom default
    pub fn get_i32_or(&self, key: &str, default: i32) -> i32 {
        self.get_i32(key).unwrap_or(default)
    }

    /// Get f64 value with custom default
    pub fn get_f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    /// Get bool value with custom default
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Remove attribute by key
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.map.remove(key)
    }

    /// Iterate over all attributes (key, value)
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.map.iter()
    }

    /// Check if attribute exists
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Get number of attributes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True if any non-cosmetic override is set. Drives the "modified"
    /// badge and the cache invalidation decision on writes.
    pub fn has_non_cosmetic(&self) -> bool {
        self.map
            .keys()
            .any(|k| !COSMETIC_KEYS.contains(&k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::keys::{A_COLOR, A_DURATION, A_LABEL};

    #[test]
    fn test_typed_getters_with_coercion() {
        let mut attrs = Attrs::new();
        attrs.set(A_DURATION, AttrValue::Int(30));
        assert_eq!(attrs.get_f64(A_DURATION), Some(30.0));
        assert_eq!(attrs.get_i32(A_DURATION), Some(30));
        assert_eq!(attrs.get_f64("missing"), None);
        assert_eq!(attrs.get_f64_or("missing", 5.0), 5.0);
    }

    #[test]
    fn test_cosmetic_keys_do_not_count_as_modified() {
        let mut attrs = Attrs::new();
        attrs.set(A_LABEL, AttrValue::Str("intro".into()));
        attrs.set(A_COLOR, AttrValue::Str("#ff8800".into()));
        assert!(!attrs.has_non_cosmetic());

        attrs.set(A_DURATION, AttrValue::Float(12.5));
        assert!(attrs.has_non_cosmetic());

        attrs.remove(A_DURATION);
        assert!(!attrs.has_non_cosmetic());
    }
}
