//! HTTP client implementation

mod form;
mod json;
mod multipart;

pub use json::CONTENT_TYPE_JSON;

use crate::request::{method_query, parse_url};
use crate::{BoxError, Error, Request, Response, Result, Transport, body::Body};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use std::fmt;
use std::sync::Arc;
#[cfg(feature = "backend-reqwest")]
use std::time::Duration;
use url::Url;

/// Per-request hook invoked after default headers are applied.
///
/// It may rewrite the request or reject it; a rejection aborts the call
/// before any network I/O.
pub type Middleware =
    Arc<dyn Fn(Request) -> std::result::Result<Request, BoxError> + Send + Sync + 'static>;

/// HTTP client for making requests.
///
/// A thin layer over a [`Transport`]: it builds requests, applies default
/// headers and the middleware hook, and hands the result to the transport.
/// Responses are returned as-is whatever their status.
///
/// # Examples
///
/// ```rust,no_run
/// use httpclient::{Client, FormValues};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder().header("X-Api-Key", "secret").build()?;
///
/// let response = client
///     .get_form("https://example.com/search", &FormValues::from([("q", "rust")]))
///     .await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    middleware: Option<Middleware>,
}

impl Client {
    /// Create a new client over the default transport
    #[cfg(feature = "backend-reqwest")]
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client over the given transport, without default headers
    pub fn from_transport(transport: impl Transport + 'static) -> Self {
        Self {
            headers: HeaderMap::new(),
            transport: Arc::new(transport),
            middleware: None,
        }
    }

    /// Create a client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Default headers copied into every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the default headers.
    ///
    /// Changes only affect requests built afterwards.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Install or replace the middleware hook
    pub fn set_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(Request) -> std::result::Result<Request, BoxError> + Send + Sync + 'static,
    {
        self.middleware = Some(Arc::new(middleware));
    }

    /// The transport executing requests
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Build a request to `addr` with the default headers applied and the
    /// middleware hook run.
    pub fn request(&self, method: Method, addr: &str, body: impl Into<Body>) -> Result<Request> {
        let url = parse_url(addr)?;
        self.new_request(method, url, body.into(), None)
    }

    /// Execute a built request
    pub async fn execute(&self, request: Request) -> Result<Response> {
        tracing::debug!("{} {}", request.method, request.url);
        self.transport.execute(request).await
    }

    /// Make a GET request
    pub async fn get(&self, addr: &str) -> Result<Response> {
        self.do_empty(Method::GET, addr).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, addr: &str) -> Result<Response> {
        self.do_empty(Method::DELETE, addr).await
    }

    /// Make a HEAD request
    pub async fn head(&self, addr: &str) -> Result<Response> {
        self.do_empty(Method::HEAD, addr).await
    }

    /// Make an OPTIONS request
    pub async fn options(&self, addr: &str) -> Result<Response> {
        self.do_empty(Method::OPTIONS, addr).await
    }

    /// Make a POST request with a body of type `content_type`
    pub async fn post(
        &self,
        addr: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Result<Response> {
        self.do_body(Method::POST, addr, content_type, body.into())
            .await
    }

    /// Make a PUT request with a body of type `content_type`
    pub async fn put(
        &self,
        addr: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Result<Response> {
        self.do_body(Method::PUT, addr, content_type, body.into())
            .await
    }

    /// Make a PATCH request with a body of type `content_type`
    pub async fn patch(
        &self,
        addr: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Result<Response> {
        self.do_body(Method::PATCH, addr, content_type, body.into())
            .await
    }

    /// Make a QUERY request with a body of type `content_type`.
    ///
    /// QUERY is a safe, idempotent method that carries its query in the body.
    pub async fn query(
        &self,
        addr: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Result<Response> {
        self.do_body(method_query()?, addr, content_type, body.into())
            .await
    }

    async fn do_empty(&self, method: Method, addr: &str) -> Result<Response> {
        let request = self.request(method, addr, Body::Empty)?;
        self.execute(request).await
    }

    async fn do_body(
        &self,
        method: Method,
        addr: &str,
        content_type: &str,
        body: Body,
    ) -> Result<Response> {
        let url = parse_url(addr)?;
        let request = self.new_request(method, url, body, Some(content_type))?;
        self.execute(request).await
    }

    /// Assemble a request: copy default headers, set the content type owned
    /// by the body encoder, then run the middleware.
    pub(crate) fn new_request(
        &self,
        method: Method,
        url: Url,
        body: Body,
        content_type: Option<&str>,
    ) -> Result<Request> {
        let mut request = Request::new(method, url).with_body(body);

        for name in self.headers.keys() {
            for value in self.headers.get_all(name) {
                request.headers.append(name.clone(), value.clone());
            }
        }

        if let Some(content_type) = content_type {
            request.set_content_type(content_type)?;
        }

        match &self.middleware {
            Some(middleware) => middleware(request).map_err(Error::Middleware),
            None => Ok(request),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("headers", &self.headers)
            .field("middleware", &self.middleware.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for creating HTTP clients
pub struct ClientBuilder {
    headers: Vec<(String, String)>,
    transport: Option<Arc<dyn Transport>>,
    middleware: Option<Middleware>,
    #[cfg(feature = "backend-reqwest")]
    transport_config: crate::transport::TransportConfig,
}

impl ClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            transport: None,
            middleware: None,
            #[cfg(feature = "backend-reqwest")]
            transport_config: Default::default(),
        }
    }

    /// Add a default header; repeated names accumulate values
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use the given transport instead of the default one
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the middleware hook
    pub fn middleware<F>(mut self, middleware: F) -> Self
    where
        F: Fn(Request) -> std::result::Result<Request, BoxError> + Send + Sync + 'static,
    {
        self.middleware = Some(Arc::new(middleware));
        self
    }

    /// Set the overall request timeout of the default transport
    #[cfg(feature = "backend-reqwest")]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport_config.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout of the default transport
    #[cfg(feature = "backend-reqwest")]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport_config.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent of the default transport
    #[cfg(feature = "backend-reqwest")]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport_config.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::invalid_request(format!("invalid header name {name:?}: {e}")))?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::invalid_request(format!("invalid value for header {name:?}: {e}"))
            })?;
            headers.append(header_name, header_value);
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            #[cfg(feature = "backend-reqwest")]
            None => Arc::new(crate::transport::ReqwestTransport::with_config(
                self.transport_config,
            )?),
            #[cfg(not(feature = "backend-reqwest"))]
            None => {
                return Err(Error::Internal(
                    "no transport configured and the default backend is disabled".to_string(),
                ));
            }
        };

        Ok(Client {
            headers,
            transport,
            middleware: self.middleware,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
