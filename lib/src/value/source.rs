use std::fs;
use std::path::{Path, PathBuf};
use std::fmt::Debug;

use either::Either;

use crate::error::{Result, Chainable};
use crate::value::Value;

/// Something that can be read into a [`Value`]: a string or a file.
pub trait Source: Debug {
    type Value: Into<Value> + 'static;

    fn read(self) -> Result<Self::Value>;

    /// Reads `self` and converts the result into a `T`.
    fn try_read<T: TryFrom<Value> + 'static>(self) -> Result<T> where Self: Sized {
        let path = self.path().map(|p| p.display().to_string());
        self.read()?
            .into()
            .try_into()
            .map_err(|_| error! {
                "invalid input value type",
                "expected" => std::any::type_name::<T>(),
                "actual type" => std::any::type_name::<Self::Value>(),
                "path" => path.as_deref().unwrap_or("<memory>"),
            })
    }

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for String {
    type Value = String;

    fn read(self) -> Result<Self> {
        Ok(self)
    }
}

/// Files are read as UTF-8 text when possible and as raw bytes otherwise.
impl Source for &Path {
    type Value = Either<String, Vec<u8>>;

    fn read(self) -> Result<Self::Value> {
        let data = fs::read(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        let value = String::from_utf8(data)
            .map(Either::Left)
            .unwrap_or_else(|e| Either::Right(e.into_bytes()));

        Ok(value)
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

impl Source for &PathBuf {
    type Value = <&'static Path as Source>::Value;

    fn read(self) -> Result<Self::Value> {
        self.as_path().read()
    }

    fn path(&self) -> Option<&Path> {
        Some(self.as_path())
    }
}
