//! Transport abstraction: the capability that actually performs requests

#[cfg(feature = "backend-reqwest")]
pub mod reqwest;

use crate::{Request, Response, Result};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

#[cfg(feature = "backend-reqwest")]
pub use self::reqwest::{ReqwestTransport, TransportConfig};

/// Executes fully built requests.
///
/// This is the only part of the crate that crosses the network boundary.
/// Implementations are shared between concurrent calls, so they must be
/// `Send + Sync`. A non-2xx status is a successful execution; only
/// network-level failures should be reported as errors, preferably as
/// [`Error::Transport`](crate::Error::Transport).
pub trait Transport: Send + Sync {
    /// Execute a built request
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        (**self).execute(request)
    }
}

/// Transport backed by a closure, see [`transport_fn`]
#[derive(Clone)]
pub struct TransportFn<F> {
    f: F,
}

/// Build a [`Transport`] from an async closure.
///
/// ```
/// use httpclient::{Body, Client, Response, transport_fn};
/// use httpclient::http::{HeaderMap, StatusCode};
///
/// let client = Client::from_transport(transport_fn(|request: httpclient::Request| async move {
///     Ok(Response::new(StatusCode::OK, HeaderMap::new(), request.url, Body::from("OK")))
/// }));
/// # let _ = client;
/// ```
pub fn transport_fn<F, Fut>(f: F) -> TransportFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    TransportFn { f }
}

impl<F, Fut> Transport for TransportFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin((self.f)(request))
    }
}
