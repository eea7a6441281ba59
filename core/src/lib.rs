//! Synchronous client core for the ORCRIM registry API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` supplied by the
//! host executes the round-trip, so the core can be driven by scripted
//! transports in tests.
//!
//! # Design
//! - `TokenManager` owns the OAuth2 client-credentials token and renews it
//!   when it is missing or expired.
//! - `OrcrimClient` is stateless; it holds only `base_url` and takes the
//!   bearer token as an argument.
//! - `Session` ties a client, a `TokenProvider` and a `Transport` together
//!   for callers that want one call per operation.
//! - `Person` maps a flat field set onto the nested `personalidade` body.

pub mod client;
pub mod config;
pub mod dates;
pub mod error;
pub mod http;
pub mod listing;
pub mod person;
pub mod session;
pub mod token;
pub mod types;

pub use client::OrcrimClient;
pub use config::OrcrimConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use listing::{Listing, ListingEntry};
pub use person::{Deceased, Person, PersonFields};
pub use session::Session;
pub use token::{StaticToken, Token, TokenManager, TokenProvider, TokenState};
pub use types::{Lookup, Phone};
