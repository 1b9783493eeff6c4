//! Listing settings and their integer-list coercion.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const SETTING_LIST_SELECTED_DOWNLOADS: &str = "listSelectedDownloads";
pub const SETTING_AUTHOR_IDS: &str = "authorIds";
pub const SETTING_CATEGORIES_LIST: &str = "categoriesList";
pub const SETTING_LIST_PID: &str = "listPid";
pub const SETTING_RECURSION_DEPTH: &str = "recursion_depth";

/// Setting name to value mapping of one listing.
///
/// Values are kept as strings. Deserialization also accepts integers,
/// floats and booleans (stored as `1`/`0`) so that TOML tables and JSON
/// objects can be written naturally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListingSettings(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarSetting {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl ScalarSetting {
    fn into_string(self) -> String {
        match self {
            ScalarSetting::Text(s) => s,
            ScalarSetting::Integer(i) => i.to_string(),
            ScalarSetting::Float(f) => f.to_string(),
            ScalarSetting::Boolean(b) => if b { "1" } else { "0" }.to_string(),
            ScalarSetting::Null => String::new(),
        }
    }
}

impl<'de> Deserialize<'de> for ListingSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, ScalarSetting> = BTreeMap::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(key, value)| (key, value.into_string()))
            .collect())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ListingSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl ListingSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value of a filter setting, or `None` when the filter is not set.
    ///
    /// Blank values and a lone `0` both mean "not set".
    pub fn filter_value(&self, key: &str) -> Option<&str> {
        self.get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "0")
    }

    /// Layer `overrides` on top of these settings.
    ///
    /// An override replaces a value only when it is not blank, so an empty
    /// field of a content element keeps the configured default.
    pub fn overlay(&self, overrides: &ListingSettings) -> ListingSettings {
        let mut merged = self.clone();
        for (key, value) in &overrides.0 {
            if !value.trim().is_empty() {
                merged.0.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

/// Read an integer the lenient way: surrounding whitespace is ignored, an
/// optional sign and the leading digits are read, the rest is dropped.
///
/// Anything that does not yield a value representable as a non-negative
/// `u32` becomes 0.
pub fn int_val(token: &str) -> u32 {
    let token = token.trim();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<u32>().unwrap_or(0)
}

/// Split a comma separated list and read each part with [`int_val`].
///
/// Order, duplicates and zeros are preserved.
pub fn int_explode(list: &str) -> Vec<u32> {
    list.split(',').map(int_val).collect()
}
