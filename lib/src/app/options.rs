use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::app::App;
use crate::computed::Computed;
use crate::value::{Dict, Value};

/// The callback type of an option computed at read time.
pub type OptionFn = dyn Fn(&App) -> Value + Send + Sync;

/// An option's value, possibly computed from the [`App`] when read.
pub type OptionValue = Computed<Value, OptionFn>;

/// Configuration options: a dictionary read from configuration plus options
/// set by the host, which take precedence.
#[derive(Debug, Default, Clone)]
pub struct Options {
    values: Dict,
    overrides: FxHashMap<Arc<str>, OptionValue>,
}

impl Options {
    pub fn new(values: Dict) -> Self {
        Options { values, overrides: FxHashMap::default() }
    }

    pub fn set<K: Into<Arc<str>>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.overrides.insert(key.into(), Computed::Value(value.into()));
    }

    pub fn set_with<K, F>(&mut self, key: K, f: F)
        where K: Into<Arc<str>>, F: Fn(&App) -> Value + Send + Sync + 'static
    {
        let f: Arc<OptionFn> = Arc::new(f);
        self.overrides.insert(key.into(), Computed::Callback(f));
    }

    /// Looks up `key` as a host-set option, then as a flat key, then as a
    /// `.`-separated path through nested dictionaries.
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }

        if let Some(value) = self.values.get(key) {
            return Some(Computed::Value(value.clone()));
        }

        let mut segments = key.split('.');
        let first = self.values.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| value.as_dict()?.get(segment))
            .cloned()
            .map(Computed::Value)
    }
}
