//! Filter chain specifications.
//!
//! Callers may describe filters either as a `name=value,flag` string or as a
//! structured mapping. Both are normalized into a [`FilterChain`] at the
//! boundary; nothing downstream cares which form was supplied.

use crate::settings::{SettingValue, Settings};

use serde::Serialize;

use std::fmt;

/// Filter description as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// Comma separated `name=value` items; a bare `name` or `name=` is a flag.
    Parsed(String),
    Structured(Settings),
}

impl FilterSpec {
    pub fn into_chain(self) -> FilterChain {
        match self {
            FilterSpec::Parsed(text) => FilterChain::parse(&text),
            FilterSpec::Structured(settings) => FilterChain::from(settings),
        }
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec::Structured(Settings::new())
    }
}

impl From<&str> for FilterSpec {
    fn from(text: &str) -> Self {
        FilterSpec::Parsed(text.to_string())
    }
}

/// Ordered filter chain for one stream type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterChain {
    filters: Settings,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `name=value,flag` syntax. Only the first `=` of an item splits
    /// name from value, so `crop=1920:800:0:140` keeps its arguments intact.
    pub fn parse(text: &str) -> Self {
        let mut filters = Settings::new();
        for item in text.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match item.split_once('=') {
                Some((name, value)) if !value.is_empty() => filters.insert(name.trim(), value),
                Some((name, _)) => filters.insert_flag(name.trim()),
                None => filters.insert_flag(item),
            }
        }
        Self { filters }
    }

    /// Sets a filter, replacing an existing one of the same name in place.
    pub fn set(&mut self, name: &str, value: impl Into<SettingValue>) {
        self.filters.insert(name, value);
    }

    /// Appends every filter of `other`, overriding same-named filters.
    pub fn extend(&mut self, other: &FilterChain) {
        self.filters.extend_from(&other.filters);
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.filters.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Renders the chain in ffmpeg's filtergraph syntax, or `None` if empty.
    pub fn render(&self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.filters.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            match value {
                SettingValue::Flag => f.write_str(name)?,
                SettingValue::Value(value) => write!(f, "{name}={value}")?,
            }
        }
        Ok(())
    }
}

impl From<Settings> for FilterChain {
    fn from(filters: Settings) -> Self {
        Self { filters }
    }
}
