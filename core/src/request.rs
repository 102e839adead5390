//! Endpoint descriptors and wire-request construction.
//!
//! # Design
//! An `ApiRequest` declaratively describes one endpoint call — method,
//! path, token, parameters — and `build` turns it into a `Request` with no
//! I/O: fixed scheme and host, query string only on GET, form body only on
//! POST/PATCH. Deterministic given identical inputs.

use crate::http::{Method, Request};
use crate::params::Parameters;

/// Host every API request is addressed to.
pub(crate) const API_HOST: &str = "api.monzo.com";

/// Declarative description of one API endpoint call.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) access_token: Option<String>,
    pub(crate) parameters: Parameters,
}

impl ApiRequest {
    pub(crate) fn build(&self) -> Request {
        Request {
            method: self.method,
            uri: self.uri(),
            headers: self.headers(),
            body: self.body(),
        }
    }

    fn uri(&self) -> String {
        let mut uri = format!("https://{}/{}", API_HOST, self.path);
        // only GET requests carry a query string
        if self.method == Method::Get && !self.parameters.is_empty() {
            uri.push('?');
            uri.push_str(&self.parameters.url_query_encoded());
        }
        uri
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("host".to_owned(), API_HOST.to_owned()),
            ("connection".to_owned(), "close".to_owned()),
        ];
        if matches!(self.method, Method::Post | Method::Patch) {
            headers.push((
                "content-type".to_owned(),
                "application/x-www-form-urlencoded; charset=utf-8".to_owned(),
            ));
        }
        if let Some(token) = &self.access_token {
            headers.push(("authorization".to_owned(), format!("Bearer {token}")));
        }
        headers
    }

    fn body(&self) -> Vec<u8> {
        match self.method {
            Method::Post | Method::Patch => self.parameters.url_form_encoded().into_bytes(),
            Method::Get | Method::Delete => Vec::new(),
        }
    }
}
