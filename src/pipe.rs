//! In-process byte pipe connecting a blocking writer to an async body stream

use bytes::Bytes;
use futures_util::stream::Stream;
use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

type Chunk = io::Result<Bytes>;

/// Create a pipe holding at most one chunk in flight.
///
/// Writes block until the reader has taken the previous chunk, so memory use
/// stays bounded by the size of a single write no matter how much is sent.
pub(crate) fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel(1);
    (PipeWriter { tx }, PipeReader { rx })
}

/// Write end of a [`pipe`]. Dropping it closes the pipe; the reader sees the
/// end of the stream once it has drained what was written.
///
/// Must only be used from a blocking context, such as a task started with
/// `tokio::task::spawn_blocking`.
#[derive(Debug)]
pub(crate) struct PipeWriter {
    tx: mpsc::Sender<Chunk>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.tx
            .blocking_send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader was dropped"))?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read end of a pipe, consumed as a stream of chunks
#[derive(Debug)]
pub(crate) struct PipeReader {
    rx: mpsc::Receiver<Chunk>,
}

impl PipeReader {
    /// Read from an arbitrary channel of chunks
    #[cfg(feature = "backend-reqwest")]
    pub(crate) fn from_receiver(rx: mpsc::Receiver<Chunk>) -> Self {
        Self { rx }
    }
}

impl Stream for PipeReader {
    type Item = Chunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
