//! Typed client for the Monzo banking REST API.
//!
//! # Overview
//! Builds authenticated `Request` values and decodes `Response` values
//! without touching the network (host-does-IO pattern). The embedding
//! application supplies a [`Transport`] that executes the actual round
//! trip, keeping the core deterministic and testable.
//!
//! # Design
//! - `Client` holds only the injected transport; every call is a single
//!   request/response round trip with nothing cached in between.
//! - Parameters encode through two percent-escaping dialects: RFC 3986
//!   query escaping for GET query strings, and the `+`-for-space form
//!   dialect for POST/PATCH bodies.
//! - Responses decode through a per-type contract (`FromJson`) with hooks
//!   for envelope unwrapping, so wrapped and bare payloads share one path.
//! - Errors are typed: expired credentials (401), other response statuses,
//!   parsing failures and transport failures are distinct variants so
//!   callers can branch on them.

pub mod client;
mod encoding;
pub mod error;
pub mod http;
pub mod json;
pub mod params;
mod request;
pub mod types;

pub use client::{authorization_url, Client};
pub use error::ClientError;
pub use http::{Method, Request, Response, Transport};
pub use params::{Parameter, ParameterValue, Parameters};
pub use types::{
    AccessTokenInfo, Account, Balance, Credentials, FeedItem, Since, Transaction, Webhook,
};
