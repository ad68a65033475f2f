//! Reqwest transport for cross-platform HTTP support

use crate::body::Body;
use crate::pipe::PipeReader;
use crate::{Error, Request, Response, Result};
use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Configuration for the default transport.
///
/// The defaults keep connections alive and pooled the way a long-lived
/// process-wide client would, but the value is owned by whoever builds the
/// transport.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Timeout for establishing a connection
    pub connect_timeout: Option<Duration>,
    /// TCP keep-alive interval
    pub tcp_keepalive: Option<Duration>,
    /// How long idle pooled connections are kept
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// Overall request timeout, disabled by default
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(30)),
            tcp_keepalive: Some(Duration::from_secs(30)),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 100,
            timeout: None,
            user_agent: None,
        }
    }
}

/// Reqwest transport for cross-platform HTTP
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new Reqwest transport with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a new Reqwest transport with configuration
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .tcp_keepalive(config.tcp_keepalive)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host);

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create reqwest client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let Request {
            method,
            url,
            headers,
            body,
        } = request;

        let mut req_builder = self.client.request(method, url).headers(headers);

        req_builder = match body {
            Body::Empty => req_builder,
            Body::Bytes(content) => req_builder.body(content),
            Body::Stream(stream) => req_builder.body(reqwest::Body::wrap_stream(stream)),
        };

        let response = req_builder.send().await.map_err(Error::transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        // Create channel for streaming body
        let (tx, rx) = mpsc::channel(32);

        // Stream response body
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) => {
                        if tx.send(Ok(bytes)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Response stream error: {}", e);
                        let _ = tx.send(Err(io::Error::other(e))).await;
                        break;
                    }
                }
            }
        });

        Ok(Response::new(
            status,
            headers,
            url,
            Body::stream(PipeReader::from_receiver(rx)),
        ))
    }
}

impl crate::Transport for ReqwestTransport {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response>> {
        Box::pin(self.send(request))
    }
}
