use std::sync::Arc;

use either::Either;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::url::UrlBuf;

/// Keys keep their insertion order.
pub type Dict<K = Arc<str>, V = Value> = IndexMap<K, V>;

/// Represents any valid configuration, template, or override value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(Num),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Dict(Arc<Dict>),
}

impl Value {
    pub fn to_num(&self) -> Option<Num> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None
        }
    }

    pub fn into_str(self) -> Result<Arc<str>, Value> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(v) => Some(&**v),
            _ => None
        }
    }

    /// Whether `self` counts as set. `null`, `false`, zero, and empty strings,
    /// arrays, and dictionaries are not.
    ///
    /// ```rust
    /// use atrium::value::{Dict, Value};
    ///
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::from(false).is_truthy());
    /// assert!(!Value::from(0u8).is_truthy());
    /// assert!(!Value::from("").is_truthy());
    /// assert!(!Value::from(Dict::<&str, u8>::new()).is_truthy());
    /// assert!(!Value::from(Vec::<Value>::new()).is_truthy());
    ///
    /// assert!(Value::from(true).is_truthy());
    /// assert!(Value::from(-3i32).is_truthy());
    /// assert!(Value::from("site").is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Array(v) => !v.is_empty(),
            Value::Dict(v) => !v.is_empty(),
        }
    }

    /// Deserializes `self` into any `T: Deserialize`.
    ///
    /// ```rust
    /// use atrium::dict;
    /// use atrium::value::Value;
    ///
    /// #[derive(serde::Deserialize)]
    /// struct Icon { r#type: String, url: String }
    ///
    /// let value = Value::from(dict! { "type" => "image/png", "url" => "/a.png" });
    /// let icon: Icon = value.deserialize_into().unwrap();
    /// assert_eq!(icon.r#type, "image/png");
    /// assert_eq!(icon.url, "/a.png");
    /// ```
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        let json = serde_json::to_value(self)?;
        Ok(serde_json::from_value(json)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }
}

macro_rules! impl_from_primitive {
    ($($T:ty),+ => $E:ident::$kind:ident) => {
        $(
            impl From<$T> for $E {
                fn from(value: $T) -> Self {
                    $E::$kind(value.into())
                }
            }
        )+
    };
}

impl_from_primitive!(bool => Value::Bool);
impl_from_primitive!(&str => Value::String);
impl_from_primitive!(std::borrow::Cow<'_, str> => Value::String);
impl_from_primitive!(String => Value::String);
impl_from_primitive!(Arc<str> => Value::String);
impl_from_primitive!(Arc<Vec<Value>> => Value::Array);
impl_from_primitive!(Arc<Dict> => Value::Dict);
impl_from_primitive!(u8, u16, u32, u64, usize => Value::Num);
impl_from_primitive!(i8, i16, i32, i64, isize => Value::Num);
impl_from_primitive!(f32, f64 => Value::Num);

impl From<()> for Value  {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<A, B> From<Either<A, B>> for Value where Value: From<A>, Value: From<B> {
    fn from(value: Either<A, B>) -> Self {
        either::for_both!(value, v => v.into())
    }
}

impl<T> From<Option<T>> for Value where Value: From<T> {
    fn from(value: Option<T>) -> Self {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}

impl From<UrlBuf> for Value {
    fn from(value: UrlBuf) -> Self {
        Value::String(value.into())
    }
}

impl<T> From<Vec<T>> for Value where Value: From<T> {
    fn from(value: Vec<T>) -> Self {
        value.into_iter()
            .map(Value::from)
            .collect()
    }
}

impl<K, V> From<Dict<K, V>> for Value where Arc<str>: From<K>, Value: From<V> {
    fn from(value: Dict<K, V>) -> Self {
        let dict = value.into_iter()
            .map(|(k, v)| (<Arc::<str>>::from(k), Value::from(v)))
            .collect::<Dict>();

        Value::Dict(Arc::new(dict))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let vec = iter.into_iter().collect::<Vec<Value>>();
        Value::Array(Arc::from(vec))
    }
}

/// A numeric value: unsigned, signed, or floating point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// An unsigned integer.
    U64(u64),
    /// A signed integer.
    I64(i64),
    /// A floating-point number.
    F64(f64),
}

impl Num {
    pub fn is_zero(self) -> bool {
        match self {
            Num::U64(v) => v == 0,
            Num::I64(v) => v == 0,
            Num::F64(v) => v == 0.0,
        }
    }

    /// Converts `self` into an `i128` if it is an integer.
    pub fn to_i128(self) -> Option<i128> {
        match self {
            Num::U64(v) => Some(v as i128),
            Num::I64(v) => Some(v as i128),
            Num::F64(_) => None,
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Num::U64(v) => v as f64,
            Num::I64(v) => v as f64,
            Num::F64(v) => v,
        }
    }
}

impl PartialEq for Num {
    /// ```rust
    /// use atrium::value::Num;
    ///
    /// assert_eq!(Num::from(10i32), Num::from(10u64));
    /// assert_eq!(Num::from(-0i8), Num::from(0u8));
    /// assert_eq!(Num::from(2u8), Num::from(2.0f64));
    /// assert_ne!(Num::from(-1i8), Num::from(1u8));
    /// ```
    fn eq(&self, other: &Self) -> bool {
        match (self.to_i128(), other.to_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

macro_rules! impl_from_for_num_value {
    ($($T:ty: $V:ident as $R:ty),* $(,)?) => ($(
        impl From<$T> for Num {
            fn from(value: $T) -> Num {
                Num::$V(value as $R)
            }
        }
    )*)
}

impl_from_for_num_value! {
    u8: U64 as u64, u16: U64 as u64, u32: U64 as u64, u64: U64 as u64, usize: U64 as u64,
    i8: I64 as i64, i16: I64 as i64, i32: I64 as i64, i64: I64 as i64, isize: I64 as i64,
    f32: F64 as f64, f64: F64 as f64,
}

impl TryFrom<Value> for Arc<str> {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.into_str()
    }
}
