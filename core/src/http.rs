//! HTTP wire types and the transport boundary.
//!
//! # Design
//! Requests and responses are plain data. The core builds `Request` values
//! and reads `Response` values without ever touching the network — the
//! embedding application supplies a `Transport` that executes the actual
//! round trip. This separation keeps the core deterministic and easy to
//! test with stub transports.
//!
//! All fields use owned types (`String`, `Vec`) so values can be captured
//! and inspected freely by transports and tests.

use std::error::Error;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// An HTTP request described as plain data.
///
/// Built fresh for every API call and handed to the `Transport`. The URI is
/// absolute (scheme, host, path and query); headers preserve insertion
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// An HTTP response described as plain data.
///
/// Produced by the `Transport` after executing a `Request`; the core only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// The single capability the core consumes: execute one HTTP round trip.
///
/// Implementations own TLS, DNS, connection handling, timeouts and
/// cancellation. A failed or cancelled call surfaces as `Err`, which the
/// client maps to [`ClientError::Transport`](crate::ClientError::Transport).
pub trait Transport {
    fn respond(&self, request: &Request) -> Result<Response, Box<dyn Error + Send + Sync>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn respond(&self, request: &Request) -> Result<Response, Box<dyn Error + Send + Sync>> {
        (**self).respond(request)
    }
}
