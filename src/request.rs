//! Request types

use crate::{Error, Result, body::Body};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use http::Method;
use url::Url;

/// Name of the QUERY method (a safe method carrying a body)
pub const METHOD_QUERY: &str = "QUERY";

/// Platform-agnostic HTTP request handed to a [`Transport`](crate::Transport).
///
/// A request is built fresh for every call and never reused.
#[derive(Debug)]
pub struct Request {
    /// HTTP method for the request
    pub method: Method,
    /// URL for the request
    pub url: Url,
    /// Headers for the request
    pub headers: HeaderMap,
    /// Body content, read lazily by the transport
    pub body: Body,
}

impl Request {
    /// Create a request without headers or body
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    /// Set the body, builder style
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Value of the `Content-Type` header, if set and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Replace the `Content-Type` header
    pub fn set_content_type(&mut self, content_type: &str) -> Result<()> {
        let value = HeaderValue::from_str(content_type).map_err(|e| {
            Error::invalid_request(format!("invalid content type {content_type:?}: {e}"))
        })?;
        self.headers.insert(CONTENT_TYPE, value);
        Ok(())
    }
}

/// The QUERY method
pub(crate) fn method_query() -> Result<Method> {
    Method::from_bytes(METHOD_QUERY.as_bytes())
        .map_err(|e| Error::invalid_request(format!("invalid method {METHOD_QUERY}: {e}")))
}

pub(crate) fn parse_url(addr: &str) -> Result<Url> {
    Url::parse(addr).map_err(|e| Error::invalid_request(format!("invalid URL {addr:?}: {e}")))
}

/// Canonical MIME form of a header name: `content-type` becomes `Content-Type`.
pub(crate) fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}
