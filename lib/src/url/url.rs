use std::ops::Deref;
use std::borrow::Borrow;
use std::sync::Arc;

pub use super::UrlBuf;

/// A borrowed URL. Configuration and request URLs are taken as given.
#[derive(Debug)]
#[repr(transparent)]
pub struct Url(str);

/// The syntactic components of a [`Url`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Parts<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl Url {
    pub const fn new(from: &str) -> &Url {
        unsafe { &*(from as *const str as *const Url) }
    }

    pub const fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_url_buf(&self) -> UrlBuf {
        UrlBuf::from(self.0.to_owned())
    }

    /// ```rust
    /// use atrium::url::Url;
    ///
    /// let url = Url::new("http://example.com");
    /// assert_eq!(url.scheme(), Some("http"));
    ///
    /// let url = Url::new("mailto:foo@bar.com");
    /// assert_eq!(url.scheme(), Some("mailto"));
    ///
    /// let url = Url::new("foo#bar:baz");
    /// assert_eq!(url.scheme(), None);
    ///
    /// let url = Url::new("/panel/site?x:y");
    /// assert_eq!(url.scheme(), None);
    /// ```
    pub fn scheme(&self) -> Option<&str> {
        let bytes = self.as_bytes();
        match memchr::memchr3(b':', b'?', b'/', bytes) {
            Some(i) if bytes[i] == b':' => match memchr::memrchr(b'#', &bytes[..i]) {
                Some(_) => None,
                None => Some(&self[..i]),
            }
            _ => None,
        }
    }

    /// Splits `self` into its components.
    ///
    /// ```rust
    /// use atrium::url::Url;
    ///
    /// let parts = Url::new("https://me@example.com:8000/panel/site?tab=1#top").parts();
    /// assert_eq!(parts.scheme, Some("https"));
    /// assert_eq!(parts.authority, Some("me@example.com:8000"));
    /// assert_eq!(parts.path, "/panel/site");
    /// assert_eq!(parts.query, Some("tab=1"));
    /// assert_eq!(parts.fragment, Some("top"));
    ///
    /// let parts = Url::new("/panel/users").parts();
    /// assert_eq!(parts.scheme, None);
    /// assert_eq!(parts.authority, None);
    /// assert_eq!(parts.path, "/panel/users");
    /// ```
    pub fn parts(&self) -> Parts<'_> {
        let mut rest = self.as_str();
        let mut parts = Parts::default();

        if let Some((before, fragment)) = rest.split_once('#') {
            parts.fragment = Some(fragment);
            rest = before;
        }

        if let Some(scheme) = self.scheme() {
            parts.scheme = Some(scheme);
            rest = &rest[scheme.len() + 1..];
        }

        if let Some((before, query)) = rest.split_once('?') {
            parts.query = Some(query);
            rest = before;
        }

        if let Some(hier) = rest.strip_prefix("//") {
            let end = hier.find('/').unwrap_or(hier.len());
            parts.authority = Some(&hier[..end]);
            rest = &hier[end..];
        }

        parts.path = rest;
        parts
    }

    /// The host of the authority component, without user info or port.
    ///
    /// ```rust
    /// use atrium::url::Url;
    ///
    /// assert_eq!(Url::new("http://me@localhost:8000/x").host(), Some("localhost"));
    /// assert_eq!(Url::new("http://[::1]:8000").host(), Some("[::1]"));
    /// assert_eq!(Url::new("/x").host(), None);
    /// ```
    pub fn host(&self) -> Option<&str> {
        let authority = self.parts().authority?;
        let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
        match host.rfind(':') {
            Some(i) if !host[i..].contains(']') => Some(&host[..i]),
            _ => Some(host),
        }
    }

    /// The path component; `""` when the URL has no path.
    pub fn path(&self) -> &str {
        self.parts().path
    }
}

impl<'a> From<&'a str> for &'a Url {
    fn from(value: &'a str) -> Self {
        Url::new(value)
    }
}

impl Deref for Url {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl Borrow<str> for Url {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Url {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<Url> for str {
    fn as_ref(&self) -> &Url {
        Url::new(self)
    }
}

impl AsRef<Url> for Arc<str> {
    fn as_ref(&self) -> &Url {
        Url::new(self)
    }
}

impl AsRef<Url> for String {
    fn as_ref(&self) -> &Url {
        Url::new(self)
    }
}

impl AsRef<Url> for Url {
    fn as_ref(&self) -> &Url {
        self
    }
}

impl ToOwned for Url {
    type Owned = UrlBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_url_buf()
    }
}
