//! Layered encoder settings.
//!
//! ffmpeg options are modelled as an insertion-ordered mapping from option
//! name to [`SettingValue`]. Encode commands are assembled by merging several
//! layers (defaults, computed values, user overrides) where the last layer
//! containing a key wins.
//!
//! A layer may also name keys to remove. Removal applies to everything merged
//! so far and to the layer's own entries, but not to later layers: a key
//! removed by layer `n` can be re-added by layer `n + 1`.

use serde::ser::{Serialize, SerializeMap, Serializer};

use std::fmt;

/// Value of a single engine option.
///
/// `Flag` is an option given without a value (`-vn`), which is distinct from
/// an option that is absent altogether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Flag,
    Value(String),
}

impl SettingValue {
    /// Returns the value as a string slice, or `None` for a flag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Flag => None,
            SettingValue::Value(value) => Some(value),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Flag => Ok(()),
            SettingValue::Value(value) => f.write_str(value),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Value(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Value(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Value(value.to_string())
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Value(value.to_string())
    }
}

/// Insertion-ordered option mapping.
///
/// Re-inserting an existing key replaces its value in place, so the key keeps
/// the position of its first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<(String, SettingValue)>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds settings from `(key, value)` pairs, later duplicates winning.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SettingValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut settings = Self::new();
        for (key, value) in pairs {
            settings.insert(key, value);
        }
        settings
    }

    /// Builds settings that consist only of flags.
    pub fn flags<K, I>(keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        let mut settings = Self::new();
        for key in keys {
            settings.insert_flag(key);
        }
        settings
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn insert_flag(&mut self, key: impl Into<String>) {
        self.insert(key, SettingValue::Flag);
    }

    /// Removes a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Copies every entry of `other` over `self`.
    pub fn extend_from(&mut self, other: &Settings) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// Renders the settings as engine arguments: `-key value` or `-key`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            args.push(format!("-{key}"));
            if let SettingValue::Value(value) = value {
                args.push(value.clone());
            }
        }
        args
    }
}

// Flags serialize as null so a report distinguishes them from absent keys.
impl Serialize for Settings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, &value.as_str())?;
        }
        map.end()
    }
}

/// One layer in a settings merge.
#[derive(Debug, Clone, Default)]
pub struct SettingsLayer {
    entries: Settings,
    removals: Vec<String>,
}

impl SettingsLayer {
    pub fn new(entries: Settings) -> Self {
        Self {
            entries,
            removals: Vec::new(),
        }
    }

    /// A layer that only removes keys.
    pub fn removing<K, I>(keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        Self::default().without(keys)
    }

    /// Adds keys to strip when this layer is applied.
    #[must_use]
    pub fn without<K, I>(mut self, keys: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        self.removals.extend(keys.into_iter().map(Into::into));
        self
    }

    fn apply_to(&self, merged: &mut Settings) {
        for key in &self.removals {
            merged.remove(key);
        }
        for (key, value) in self.entries.iter() {
            if !self.removals.iter().any(|removed| removed == key) {
                merged.insert(key, value.clone());
            }
        }
    }
}

impl From<Settings> for SettingsLayer {
    fn from(entries: Settings) -> Self {
        Self::new(entries)
    }
}

impl From<&Settings> for SettingsLayer {
    fn from(entries: &Settings) -> Self {
        Self::new(entries.clone())
    }
}

/// Merges layers in order of increasing priority.
pub fn merge_layers(layers: &[SettingsLayer]) -> Settings {
    let mut merged = Settings::new();
    for layer in layers {
        layer.apply_to(&mut merged);
    }
    merged
}

/// Merges plain settings in order of increasing priority.
pub fn merge(layers: &[&Settings]) -> Settings {
    let mut merged = Settings::new();
    for layer in layers {
        merged.extend_from(layer);
    }
    merged
}
