//! Response handling

use crate::{Result, body::Body, body::BodyStream};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use url::Url;

/// HTTP response.
///
/// Any status code is a successful call; interpreting 4xx/5xx is left to the
/// caller.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Body,
}

impl Response {
    /// Create a response; used by [`Transport`](crate::Transport) implementations
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: Body) -> Self {
        Self {
            status,
            headers,
            url,
            body,
        }
    }

    /// Get the response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Check if the response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Get all headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Get the content length from headers
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    /// Get the content type
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Get the response URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Consume the response and return the body
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Consume the response and return a stream of body chunks
    pub fn stream(self) -> BodyStream {
        self.body.into_stream()
    }

    /// Consume the response and return the body as bytes
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.body.collect().await?)
    }

    /// Consume the response and return the body as text
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Consume the response and parse the body as JSON
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
