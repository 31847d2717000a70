use std::fmt;
use std::ops::Deref;
use std::borrow::Borrow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use super::Url;

/// An owned, growable [`Url`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct UrlBuf(String);

impl UrlBuf {
    pub fn new() -> UrlBuf {
        UrlBuf(String::new())
    }

    pub fn as_url(&self) -> &Url {
        Url::new(self.0.as_str())
    }

    /// Appends `url` as a path segment, or replaces `self` if `url` has a
    /// scheme.
    ///
    /// ```rust
    /// use atrium::url::UrlBuf;
    ///
    /// let mut url = UrlBuf::from("https://example.com");
    /// url.append("media");
    /// assert_eq!(url.as_str(), "https://example.com/media");
    ///
    /// url.append("/panel/").append("/abc");
    /// assert_eq!(url.as_str(), "https://example.com/media/panel/abc");
    ///
    /// url.append("https://cdn.example.com/x");
    /// assert_eq!(url.as_str(), "https://cdn.example.com/x");
    ///
    /// let mut url = UrlBuf::from("/");
    /// url.append("media");
    /// assert_eq!(url.as_str(), "/media");
    ///
    /// let mut url = UrlBuf::new();
    /// url.append("media");
    /// assert_eq!(url.as_str(), "media");
    /// ```
    pub fn append<T: AsRef<Url>>(&mut self, url: T) -> &mut Self {
        let url = url.as_ref();
        if url.scheme().is_some() || self.0.is_empty() {
            *self = url.to_owned();
        } else {
            match (self.ends_with('/'), url.starts_with('/')) {
                (true, true) => self.0.push_str(&url[1..]),
                (true, false) | (false, true) => self.0.push_str(url),
                (false, false) => {
                    self.0.push('/');
                    self.0.push_str(url);
                }
            }
        }

        self
    }

    pub fn extend<T: AsRef<Url>, I: IntoIterator<Item = T>>(&mut self, iter: I) -> &mut Self {
        for url in iter.into_iter() {
            self.append(url.as_ref());
        }

        self
    }

    /// Replaces any query with `query`.
    ///
    /// ```rust
    /// use atrium::url::UrlBuf;
    ///
    /// let mut url = UrlBuf::from("/assets/panel.css?1");
    /// url.set_query("1700000000");
    /// assert_eq!(url.as_str(), "/assets/panel.css?1700000000");
    /// ```
    pub fn set_query<T: fmt::Display>(&mut self, query: T) -> &mut Self {
        if let Some(i) = self.0.find('?') {
            self.0.truncate(i);
        }

        self.0 = format!("{}?{query}", self.0);
        self
    }

    /// Removes trailing slashes.
    pub fn trim_end_slashes(&mut self) -> &mut Self {
        let len = self.0.trim_end_matches('/').len();
        self.0.truncate(len);
        self
    }
}

impl From<String> for UrlBuf {
    fn from(value: String) -> Self {
        UrlBuf(value)
    }
}

impl From<&str> for UrlBuf {
    fn from(value: &str) -> Self {
        UrlBuf(value.to_owned())
    }
}

impl From<&Url> for UrlBuf {
    fn from(value: &Url) -> Self {
        value.to_url_buf()
    }
}

impl Deref for UrlBuf {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        self.as_url()
    }
}

impl AsRef<Url> for UrlBuf {
    fn as_ref(&self) -> &Url {
        self.as_url()
    }
}

impl Borrow<Url> for UrlBuf {
    fn borrow(&self) -> &Url {
        self.as_url()
    }
}

impl AsRef<str> for UrlBuf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UrlBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<U: AsRef<Url>> FromIterator<U> for UrlBuf {
    fn from_iter<T: IntoIterator<Item = U>>(iter: T) -> Self {
        let mut url = UrlBuf::new();
        url.extend(iter);
        url
    }
}

impl From<UrlBuf> for Arc<str> {
    fn from(value: UrlBuf) -> Self {
        Arc::from(value.0)
    }
}

impl From<UrlBuf> for String {
    fn from(value: UrlBuf) -> Self {
        value.0
    }
}
