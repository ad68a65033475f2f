//! multipart/form-data encoder

use crate::request::canonical_header_name;
use crate::{Error, Result};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderValue};
use rand::Rng;
use std::fmt::Write as _;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Failed,
    Closed,
}

/// Writes multipart/form-data parts into an underlying byte sink.
///
/// Parts are strictly sequential: the [`PartWriter`] returned by
/// [`create_part`](Self::create_part) and friends borrows the writer, so a part
/// can no longer be written once the next one is started. Using the writer
/// after [`close`](Self::close) fails with [`Error::InvalidMultipartUse`].
pub struct MultipartWriter {
    writer: Box<dyn Write + Send>,
    boundary: String,
    has_parts: bool,
    state: State,
}

impl MultipartWriter {
    /// Create a writer with a freshly generated random boundary
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            boundary: random_boundary(),
            has_parts: false,
            state: State::Open,
        }
    }

    /// Create a writer with a caller-chosen boundary.
    ///
    /// The boundary must be 1 to 70 characters from the RFC 2046 alphabet and
    /// must not end with a space.
    pub fn with_boundary(
        writer: impl Write + Send + 'static,
        boundary: impl Into<String>,
    ) -> Result<Self> {
        let boundary = boundary.into();
        validate_boundary(&boundary)?;

        Ok(Self {
            writer: Box::new(writer),
            boundary,
            has_parts: false,
            state: State::Open,
        })
    }

    /// The boundary separating parts
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` value announcing this writer's boundary
    pub fn form_data_content_type(&self) -> String {
        let boundary = &self.boundary;
        if boundary.contains(|c: char| "()<>@,;:\\\"/[]?= ".contains(c)) {
            format!("multipart/form-data; boundary=\"{boundary}\"")
        } else {
            format!("multipart/form-data; boundary={boundary}")
        }
    }

    /// Returns true once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Start a new part with the given headers and return a writer for its body
    pub fn create_part(&mut self, headers: &HeaderMap) -> Result<PartWriter<'_>> {
        self.ensure_open()?;

        let mut head = String::with_capacity(128);
        if self.has_parts {
            head.push_str("\r\n");
        }
        let _ = write!(head, "--{}\r\n", self.boundary);
        for (name, value) in headers {
            let value = value.to_str().map_err(|_| {
                Error::invalid_multipart(format!("header {name} is not visible ASCII"))
            })?;
            let _ = write!(head, "{}: {}\r\n", canonical_header_name(name.as_str()), value);
        }
        head.push_str("\r\n");

        self.write_raw(head.as_bytes())?;
        self.has_parts = true;

        Ok(PartWriter { multipart: self })
    }

    /// Start a form field part named `name`
    pub fn create_form_field(&mut self, name: &str) -> Result<PartWriter<'_>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_DISPOSITION, disposition(name, None)?);
        self.create_part(&headers)
    }

    /// Start a file part for form field `field` carrying `filename`
    pub fn create_form_file(&mut self, field: &str, filename: &str) -> Result<PartWriter<'_>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_DISPOSITION, disposition(field, Some(filename))?);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        self.create_part(&headers)
    }

    /// Write a complete form field
    pub fn write_field(&mut self, name: &str, value: &str) -> Result<()> {
        let mut part = self.create_form_field(name)?;
        part.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Finish the body by writing the closing boundary.
    ///
    /// Closing twice is a no-op. If an earlier write failed, no closing
    /// boundary is written.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            State::Closed => return Ok(()),
            State::Failed => {
                self.state = State::Closed;
                return Ok(());
            }
            State::Open => {}
        }

        let trailer = if self.has_parts {
            format!("\r\n--{}--\r\n", self.boundary)
        } else {
            format!("--{}--\r\n", self.boundary)
        };
        let result = self
            .write_raw(trailer.as_bytes())
            .and_then(|()| self.writer.flush());
        self.state = State::Closed;

        Ok(result?)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::Closed => Err(Error::invalid_multipart("multipart writer is closed")),
            State::Failed => Err(failed().into()),
        }
    }

    fn write_raw(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.state == State::Failed {
            return Err(failed());
        }
        if let Err(err) = self.writer.write_all(buf) {
            self.state = State::Failed;
            return Err(err);
        }
        Ok(())
    }
}

impl std::fmt::Debug for MultipartWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartWriter")
            .field("boundary", &self.boundary)
            .field("has_parts", &self.has_parts)
            .field("state", &self.state)
            .finish()
    }
}

/// Body writer for the part most recently created on a [`MultipartWriter`]
pub struct PartWriter<'a> {
    multipart: &'a mut MultipartWriter,
}

impl Write for PartWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multipart.write_raw(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.multipart.state == State::Failed {
            return Err(failed());
        }
        self.multipart.writer.flush()
    }
}

fn failed() -> io::Error {
    io::Error::new(
        io::ErrorKind::BrokenPipe,
        "multipart body is no longer being consumed",
    )
}

fn random_boundary() -> String {
    let mut buf = [0u8; 30];
    rand::rng().fill(&mut buf[..]);
    buf.iter().fold(String::with_capacity(60), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn validate_boundary(boundary: &str) -> Result<()> {
    if boundary.is_empty() || boundary.len() > 70 {
        return Err(Error::invalid_multipart(format!(
            "boundary must be 1 to 70 characters, got {}",
            boundary.len()
        )));
    }
    if boundary.ends_with(' ') {
        return Err(Error::invalid_multipart("boundary must not end with a space"));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(c);
    if let Some(c) = boundary.chars().find(|&c| !allowed(c)) {
        return Err(Error::invalid_multipart(format!(
            "invalid boundary character {c:?}"
        )));
    }
    Ok(())
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn disposition(name: &str, filename: Option<&str>) -> Result<HeaderValue> {
    let mut value = format!("form-data; name=\"{}\"", escape_quotes(name));
    if let Some(filename) = filename {
        let _ = write!(value, "; filename=\"{}\"", escape_quotes(filename));
    }
    HeaderValue::from_str(&value)
        .map_err(|_| Error::invalid_multipart(format!("invalid part name {name:?}")))
}
