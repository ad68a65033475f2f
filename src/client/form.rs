//! Form-encoded request helpers

use super::Client;
use crate::form::{CONTENT_TYPE_FORM, FormValues, merge_query};
use crate::request::{method_query, parse_url};
use crate::{Response, Result, body::Body};
use http::Method;

impl Client {
    /// Make a GET request with `data` added to the query string.
    ///
    /// Parameters already present in `addr` are kept; the first value of each
    /// key in `data` is appended after them.
    pub async fn get_form(&self, addr: &str, data: &FormValues) -> Result<Response> {
        let mut url = parse_url(addr)?;
        merge_query(&mut url, data);

        let request = self.new_request(Method::GET, url, Body::Empty, None)?;
        self.execute(request).await
    }

    /// Make a POST request with `data` encoded as "application/x-www-form-urlencoded".
    pub async fn post_form(&self, addr: &str, data: &FormValues) -> Result<Response> {
        self.do_form(Method::POST, addr, data).await
    }

    /// Make a PUT request with `data` encoded as "application/x-www-form-urlencoded".
    pub async fn put_form(&self, addr: &str, data: &FormValues) -> Result<Response> {
        self.do_form(Method::PUT, addr, data).await
    }

    /// Make a PATCH request with `data` encoded as "application/x-www-form-urlencoded".
    pub async fn patch_form(&self, addr: &str, data: &FormValues) -> Result<Response> {
        self.do_form(Method::PATCH, addr, data).await
    }

    /// Make a QUERY request with `data` encoded as "application/x-www-form-urlencoded".
    ///
    /// Unlike [`get_form`](Self::get_form) the data travels in the body.
    pub async fn query_form(&self, addr: &str, data: &FormValues) -> Result<Response> {
        self.do_form(method_query()?, addr, data).await
    }

    async fn do_form(&self, method: Method, addr: &str, data: &FormValues) -> Result<Response> {
        let body = Body::from(data.encode());
        self.do_body(method, addr, CONTENT_TYPE_FORM, body).await
    }
}
