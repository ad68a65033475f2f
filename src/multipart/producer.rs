//! Producer task feeding a multipart body through a pipe

use super::{MultipartWriter, WriteMultipart};
use crate::body::Body;
use crate::pipe::pipe;
use crate::{Error, Result};
use tokio::sync::oneshot;

/// Create a multipart writer whose output becomes the returned body.
///
/// Nothing is written until a [`Producer`] is spawned for the writer.
pub(crate) fn multipart_pipe() -> (MultipartWriter, Body) {
    let (writer, reader) = pipe();
    (MultipartWriter::new(writer), Body::stream(reader))
}

/// Handle to a running multipart producer
#[derive(Debug)]
pub(crate) struct Producer {
    done: oneshot::Receiver<Result<()>>,
}

impl Producer {
    /// Run `write` against `multipart` on a blocking task.
    ///
    /// Whatever the callback returns, the writer is closed (writing the
    /// closing boundary unless the body already failed) and then dropped,
    /// which closes the pipe. The outcome is reported through a single-slot
    /// channel, so the task never waits for anyone to observe it.
    pub(crate) fn spawn(mut multipart: MultipartWriter, write: WriteMultipart) -> Self {
        let (done_tx, done_rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let written = write(&mut multipart);
            let closed = multipart.close();
            drop(multipart);

            let result = written.and(closed);
            match &result {
                Ok(()) => tracing::debug!("multipart producer finished"),
                Err(e) => tracing::debug!("multipart producer failed: {}", e),
            }
            let _ = done_tx.send(result);
        });

        Self { done: done_rx }
    }

    /// Wait for the producer to finish and return its outcome
    pub(crate) async fn wait(self) -> Result<()> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Err(Error::Internal(
                "multipart producer stopped without reporting a result".to_string(),
            )),
        }
    }
}
