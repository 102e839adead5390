//! Error types for the Monzo API client.
//!
//! # Design
//! `AccessTokenInvalid` gets a dedicated variant because callers frequently
//! refresh credentials on 401 and give up on anything else. All other
//! non-success statuses land in `Response` with the raw status code for
//! caller branching.

use std::error::Error;
use std::fmt;

/// Errors returned by `Client` calls.
#[derive(Debug)]
pub enum ClientError {
    /// A parameter string could not be percent-encoded. Escaping is total
    /// over UTF-8 input, so this only signals a platform-level failure.
    Encoding,

    /// The server returned 401 — the access token is invalid or has expired.
    AccessTokenInvalid,

    /// The server returned a non-success status other than 401.
    Response { status: u16 },

    /// The response body is not valid JSON, is not a JSON object, or is
    /// missing a required field / carries a field of the wrong shape.
    Parsing(String),

    /// The injected transport failed to complete the round trip.
    Transport(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Encoding => {
                write!(f, "a parameter could not be percent-encoded")
            }
            ClientError::AccessTokenInvalid => {
                write!(f, "the supplied access token is invalid or has expired")
            }
            ClientError::Response { status } => {
                write!(f, "invalid response status code: {status}")
            }
            ClientError::Parsing(msg) => {
                write!(f, "error parsing the response body: {msg}")
            }
            ClientError::Transport(err) => {
                write!(f, "transport failure: {err}")
            }
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
