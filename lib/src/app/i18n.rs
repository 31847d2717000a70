use serde::{Deserialize, Serialize};
use rustc_hash::FxHashMap;

/// Messages used by the panel itself, in English.
const DEFAULTS: &[(&str, &str)] = &[
    ("changes", "Changes"),
    ("view.account", "Your account"),
    ("logout", "Log out"),
];

/// Translated interface messages, keyed by message id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(FxHashMap<String, String>);

impl Translations {
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, message: V) {
        self.0.insert(key.into(), message.into());
    }

    /// The message for `key`, falling back to the built-in English message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
            .map(|message| message.as_str())
            .or_else(|| DEFAULTS.iter().find(|(k, _)| *k == key).map(|(_, v)| *v))
    }

    /// The message for `key` or `fallback` when there is none.
    pub fn translate<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get(key).unwrap_or(fallback)
    }
}
