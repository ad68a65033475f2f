//! JSON request helpers

use super::Client;
use crate::request::method_query;
use crate::{Response, Result, body::Body};
use http::Method;
use serde::Serialize;

/// Content type of JSON bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";

impl Client {
    /// Make a POST request with a JSON-encoded body
    pub async fn post_json<T: Serialize + ?Sized>(&self, addr: &str, value: &T) -> Result<Response> {
        self.do_json(Method::POST, addr, value).await
    }

    /// Make a PUT request with a JSON-encoded body
    pub async fn put_json<T: Serialize + ?Sized>(&self, addr: &str, value: &T) -> Result<Response> {
        self.do_json(Method::PUT, addr, value).await
    }

    /// Make a PATCH request with a JSON-encoded body
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        addr: &str,
        value: &T,
    ) -> Result<Response> {
        self.do_json(Method::PATCH, addr, value).await
    }

    /// Make a QUERY request with a JSON-encoded body
    pub async fn query_json<T: Serialize + ?Sized>(
        &self,
        addr: &str,
        value: &T,
    ) -> Result<Response> {
        self.do_json(method_query()?, addr, value).await
    }

    async fn do_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        addr: &str,
        value: &T,
    ) -> Result<Response> {
        // Encode before anything else so a failure never reaches the transport
        let body = serde_json::to_vec(value)?;
        self.do_body(method, addr, CONTENT_TYPE_JSON, Body::from(body))
            .await
    }
}
