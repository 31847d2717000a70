use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{ErrorDetail, Result};
use crate::value::Source;

/// A textual data format that can be deserialized from any [`Source`].
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// The conventional file extension of the format.
    const EXTENSION: &'static str;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`. **_Note:_** This method is _not_
    /// intended to be called directly. Instead, it is intended to be
    /// _implemented_ and then used indirectly via [`Format::read()`].
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<I: Source, T: DeserializeOwned>(input: I) -> Result<T> {
        let input = input.try_read::<Arc<str>>()?;
        Ok(Self::from_str(&input)?)
    }
}

macro_rules! impl_format {
    ($($name:ident ($ext:literal) : $func:expr, $E:ty;)+) => ($(
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const EXTENSION: &'static str = $ext;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    )+);
}

impl_format! {
    Toml("toml"): toml::from_str, toml::de::Error;
    Json("json"): serde_json::from_str, serde_json::error::Error;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Dict, Value};

    #[test]
    fn reads_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{ "name": "Homer", "tags": ["a", "b"] }"#).unwrap();

        let dict: Dict = Json::read(path.as_path()).unwrap();
        assert_eq!(dict["name"], Value::from("Homer"));
        assert_eq!(dict["tags"].as_slice().map(|s| s.len()), Some(2));
    }

    #[test]
    fn reports_syntax_errors() {
        let error = Toml::read::<_, Dict>(String::from("name = ")).unwrap_err();
        assert!(error.downcast_ref::<toml::de::Error>().is_some());
    }
}
