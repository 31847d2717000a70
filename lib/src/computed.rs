use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

/// A plain value or a callback that computes one when it is read.
///
/// `F` is the (usually unsized `dyn Fn`) callback type, which fixes the
/// arguments a reader must supply to [`Computed::resolve_with()`].
///
/// ```rust
/// use std::sync::Arc;
/// use atrium::Computed;
///
/// type Flag = Computed<bool, dyn Fn(Option<&str>) -> bool + Send + Sync>;
///
/// let plain = Flag::Value(true);
/// let lazy = Flag::Callback(Arc::new(|current: Option<&str>| current == Some("site")));
///
/// assert!(plain.resolve_with(|f| f(None)));
/// assert!(lazy.resolve_with(|f| f(Some("site"))));
/// assert!(!lazy.resolve_with(|f| f(Some("users"))));
/// ```
pub enum Computed<T, F: ?Sized> {
    Value(T),
    Callback(Arc<F>),
}

impl<T, F: ?Sized> Computed<T, F> {
    /// Returns the plain value, or calls `call` with the callback to compute
    /// one.
    pub fn resolve_with<C>(&self, call: C) -> T
        where T: Clone, C: FnOnce(&F) -> T
    {
        match self {
            Computed::Value(value) => value.clone(),
            Computed::Callback(f) => call(f),
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Computed::Callback(_))
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Computed::Value(value) => Some(value),
            Computed::Callback(_) => None,
        }
    }
}

impl<T: Clone, F: ?Sized> Clone for Computed<T, F> {
    fn clone(&self) -> Self {
        match self {
            Computed::Value(value) => Computed::Value(value.clone()),
            Computed::Callback(f) => Computed::Callback(f.clone()),
        }
    }
}

impl<T, F: ?Sized> From<T> for Computed<T, F> {
    fn from(value: T) -> Self {
        Computed::Value(value)
    }
}

impl<T: fmt::Debug, F: ?Sized> fmt::Debug for Computed<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computed::Value(value) => fmt::Debug::fmt(value, f),
            Computed::Callback(_) => f.write_str("<callback>"),
        }
    }
}

/// Configuration files can only carry plain values.
impl<'de, T: Deserialize<'de>, F: ?Sized> Deserialize<'de> for Computed<T, F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Computed::Value)
    }
}
