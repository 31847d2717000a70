use std::sync::Arc;

use uuid::Uuid;

use crate::url::{Url, UrlBuf};

/// The request being served: its URL and its content-security nonce.
#[derive(Debug, Clone)]
pub struct Request {
    url: UrlBuf,
    nonce: Arc<str>,
}

impl Request {
    /// A request for `url` with a freshly generated nonce.
    pub fn new<U: Into<UrlBuf>>(url: U) -> Self {
        Request { url: url.into(), nonce: generate_nonce().into() }
    }

    pub fn with_nonce<N: Into<Arc<str>>>(mut self, nonce: N) -> Self {
        self.nonce = nonce.into();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// The request's origin with its port replaced by `port`. Path, params,
    /// query, and fragment are dropped.
    ///
    /// ```rust
    /// use atrium::app::Request;
    ///
    /// let request = Request::new("https://me@example.com:8000/panel/site?tab=1");
    /// assert_eq!(request.origin_with_port(3000).as_str(), "https://example.com:3000");
    ///
    /// let request = Request::new("/panel/site");
    /// assert_eq!(request.origin_with_port(3000).as_str(), "http://localhost:3000");
    /// ```
    pub fn origin_with_port(&self, port: u16) -> UrlBuf {
        let scheme = self.url.scheme().unwrap_or("http");
        let host = self.url.host().filter(|h| !h.is_empty()).unwrap_or("localhost");
        UrlBuf::from(format!("{scheme}://{host}:{port}"))
    }
}

/// Generates a random nonce: 32 lowercase hex characters.
pub fn generate_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}
