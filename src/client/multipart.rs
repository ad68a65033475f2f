//! Streaming multipart request helpers

use super::Client;
use crate::multipart::{Producer, WriteMultipart, multipart_pipe};
use crate::request::{method_query, parse_url};
use crate::{Response, Result};
use http::Method;

impl Client {
    /// Make a POST request with a multipart/form-data body produced by `write`
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use httpclient::{Client, FormValues, multipart_fields, multipart_file, write_multiparts};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::new()?;
    /// let response = client
    ///     .post_multipart(
    ///         "https://example.com/upload",
    ///         write_multiparts([
    ///             multipart_fields(FormValues::from([("foo", "bar")])),
    ///             multipart_file("file", "report.csv", std::fs::File::open("report.csv")?),
    ///         ]),
    ///     )
    ///     .await?;
    /// # let _ = response;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post_multipart(&self, addr: &str, write: WriteMultipart) -> Result<Response> {
        self.do_multipart(Method::POST, addr, write).await
    }

    /// Make a PUT request with a multipart/form-data body produced by `write`
    pub async fn put_multipart(&self, addr: &str, write: WriteMultipart) -> Result<Response> {
        self.do_multipart(Method::PUT, addr, write).await
    }

    /// Make a PATCH request with a multipart/form-data body produced by `write`
    pub async fn patch_multipart(&self, addr: &str, write: WriteMultipart) -> Result<Response> {
        self.do_multipart(Method::PATCH, addr, write).await
    }

    /// Make a QUERY request with a multipart/form-data body produced by `write`
    pub async fn query_multipart(&self, addr: &str, write: WriteMultipart) -> Result<Response> {
        self.do_multipart(method_query()?, addr, write).await
    }

    /// The body is streamed: `write` runs on its own task while the transport
    /// reads the request body. A transport error wins over a producer error,
    /// but the producer is always waited for before returning.
    async fn do_multipart(
        &self,
        method: Method,
        addr: &str,
        write: WriteMultipart,
    ) -> Result<Response> {
        let url = parse_url(addr)?;

        let (multipart, body) = multipart_pipe();
        let content_type = multipart.form_data_content_type();
        let request = self.new_request(method, url, body, Some(&content_type))?;

        let producer = Producer::spawn(multipart, write);

        match self.execute(request).await {
            Ok(response) => {
                producer.wait().await?;
                Ok(response)
            }
            Err(err) => {
                if let Err(producer_err) = producer.wait().await {
                    tracing::debug!(
                        "discarding multipart producer error after transport failure: {}",
                        producer_err
                    );
                }
                Err(err)
            }
        }
    }
}
