/// Builds a [`Dict`](crate::value::Dict) from `key => value` pairs, in
/// order. Values may themselves be `dict!`s.
///
/// ```rust
/// use atrium::dict;
/// use atrium::value::Value;
///
/// let dict = dict! { "icon" => "account", "disabled" => true };
/// assert_eq!(dict["disabled"], Value::from(true));
/// assert_eq!(dict.keys().map(|k| &**k).collect::<Vec<_>>(), ["icon", "disabled"]);
///
/// let nested = Value::from(dict! { "shortcut icon" => dict! { "url" => "/a.png" } });
/// assert!(nested.is_truthy());
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut dict: $crate::value::Dict = $crate::value::Dict::new();
        $(dict.insert($key.into(), $crate::value::Value::from($value));)*
        dict
    });
}

pub use dict;
