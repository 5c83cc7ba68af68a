use std::collections::HashMap;

/// Read-only key/value view handed to `configure`.
///
/// The registry itself consumes a single key (the default codec name); every
/// other key is opaque here and belongs to whichever codec reads it.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    entries: HashMap<String, String>,
}

impl Settings {
    /// An empty settings view; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
