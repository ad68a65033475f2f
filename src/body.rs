//! Request and response body types

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, Stream, StreamExt};
use std::fmt;
use std::io;
use std::pin::Pin;

/// Boxed stream of body chunks
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync + 'static>>;

/// Request or response body.
///
/// Bodies are read lazily: a [`Body::Stream`] only produces data when the
/// transport (or the caller, for responses) polls it.
#[derive(Default)]
pub enum Body {
    /// Empty body
    #[default]
    Empty,

    /// In-memory bytes
    Bytes(Bytes),

    /// Streaming body
    Stream(BodyStream),
}

impl Body {
    /// Create an empty body
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a body from bytes
    pub fn bytes(content: impl Into<Bytes>) -> Self {
        Self::Bytes(content.into())
    }

    /// Create a body from a stream of chunks
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Returns true if the body is known to carry no data
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Bytes(content) => content.is_empty(),
            Body::Stream(_) => false,
        }
    }

    /// Returns the content if it is held in memory
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Empty => Some(&[]),
            Body::Bytes(content) => Some(content),
            Body::Stream(_) => None,
        }
    }

    /// Convert into a stream regardless of representation
    pub fn into_stream(self) -> BodyStream {
        match self {
            Body::Empty => Box::pin(stream::empty::<io::Result<Bytes>>()),
            Body::Bytes(content) => Box::pin(stream::once(async move { Ok::<_, io::Error>(content) })),
            Body::Stream(stream) => stream,
        }
    }

    /// Read the whole body into memory
    pub async fn collect(self) -> io::Result<Bytes> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Bytes(content) => Ok(content),
            Body::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(content) => f.debug_tuple("Body::Bytes").field(&content.len()).finish(),
            Body::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

// Convenience From implementations
impl From<String> for Body {
    fn from(content: String) -> Self {
        Self::Bytes(content.into())
    }
}

impl From<&'static str> for Body {
    fn from(content: &'static str) -> Self {
        Self::Bytes(Bytes::from_static(content.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(content: Vec<u8>) -> Self {
        Self::Bytes(content.into())
    }
}

impl From<&'static [u8]> for Body {
    fn from(content: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(content))
    }
}

impl From<Bytes> for Body {
    fn from(content: Bytes) -> Self {
        Self::Bytes(content)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}
