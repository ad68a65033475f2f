//! Thin HTTP client facade over a pluggable transport
//!
//! This crate wraps an injected [`Transport`] with per-verb helpers, default
//! headers, a middleware hook, and body encoders for URL-encoded forms, JSON,
//! and streaming `multipart/form-data`. Multipart bodies are produced on a
//! separate task while the transport uploads them, so large files never need
//! to be held in memory.
//!
//! With the default `backend-reqwest` feature, [`Client::new`] uses a
//! [`ReqwestTransport`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub use body::{Body, BodyStream};
pub use client::{CONTENT_TYPE_JSON, Client, ClientBuilder, Middleware};
pub use error::{BoxError, Error, Result};
pub use form::{CONTENT_TYPE_FORM, FormValues};
pub use multipart::{
    MultipartWriter, PartWriter, WriteMultipart, multipart_field, multipart_fields,
    multipart_file, write_multipart, write_multiparts,
};
pub use request::{METHOD_QUERY, Request};
pub use response::Response;
#[cfg(feature = "backend-reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "backend-reqwest")))]
pub use transport::{ReqwestTransport, TransportConfig};
pub use transport::{Transport, TransportFn, transport_fn};

// Re-export the types that appear in the public API
pub use http;
pub use url::{self, Url};

mod body;
mod client;
mod error;
mod form;
pub mod multipart;
mod pipe;
mod request;
mod response;
pub mod transport;
