//! Streaming multipart/form-data bodies
//!
//! A [`WriteMultipart`] callback describes the parts of a body. When a request
//! is sent, the callback runs on its own blocking task and writes into an
//! in-memory pipe whose read end is the request body, so the transport uploads
//! parts while they are being produced and the whole payload never sits in
//! memory.

mod producer;
mod writer;

pub(crate) use producer::{Producer, multipart_pipe};
pub use writer::{MultipartWriter, PartWriter};

use crate::form::FormValues;
use crate::{Error, Result};
use std::io::{self, Read};

/// Writes the parts of a multipart body.
///
/// The callback runs on a blocking task, so it may use synchronous I/O such as
/// reading files with [`std::fs::File`].
pub type WriteMultipart = Box<dyn FnOnce(&mut MultipartWriter) -> Result<()> + Send + 'static>;

/// Box a closure as a [`WriteMultipart`]
pub fn write_multipart<F>(f: F) -> WriteMultipart
where
    F: FnOnce(&mut MultipartWriter) -> Result<()> + Send + 'static,
{
    Box::new(f)
}

/// A [`WriteMultipart`] that streams `data` as file `filename` of form field `field`.
pub fn multipart_file<R>(
    field: impl Into<String>,
    filename: impl Into<String>,
    mut data: R,
) -> WriteMultipart
where
    R: Read + Send + 'static,
{
    let field = field.into();
    let filename = filename.into();
    Box::new(move |w: &mut MultipartWriter| {
        let mut file = w.create_form_file(&field, &filename)?;
        io::copy(&mut data, &mut file)?;
        Ok(())
    })
}

/// A [`WriteMultipart`] that writes a single form field
pub fn multipart_field(name: impl Into<String>, value: impl Into<String>) -> WriteMultipart {
    let name = name.into();
    let value = value.into();
    Box::new(move |w: &mut MultipartWriter| w.write_field(&name, &value))
}

/// A [`WriteMultipart`] that writes one form field per key.
///
/// Only the first value of each key is sent; a key without values becomes an
/// empty field.
pub fn multipart_fields(fields: FormValues) -> WriteMultipart {
    Box::new(move |w: &mut MultipartWriter| {
        for (name, values) in fields.iter() {
            let value = values.first().map(String::as_str).unwrap_or_default();
            w.write_field(name, value)
                .map_err(|err| annotate_field(name, err))?;
        }
        Ok(())
    })
}

/// Run several [`WriteMultipart`]s in order, stopping at the first failure.
pub fn write_multiparts(writers: impl IntoIterator<Item = WriteMultipart>) -> WriteMultipart {
    let writers: Vec<_> = writers.into_iter().collect();
    Box::new(move |w: &mut MultipartWriter| {
        for write in writers {
            write(&mut *w)?;
        }
        Ok(())
    })
}

fn annotate_field(name: &str, err: Error) -> Error {
    match err {
        Error::Io(err) => Error::Io(io::Error::new(
            err.kind(),
            format!("write field {name:?}: {err}"),
        )),
        Error::InvalidMultipartUse(msg) => {
            Error::InvalidMultipartUse(format!("write field {name:?}: {msg}"))
        }
        other => other,
    }
}
