//! A client for the Ghost blogging platform's v0.1 admin API
//!
//! A [`GhostClient`] holds the connection settings for one blog, logs in with
//! the OAuth2 password grant the first time a token is needed, and keeps its
//! access token fresh with the refresh grant from then on. Requests are made
//! against named endpoints such as `post.create`, which are resolved through an
//! [`EndpointTable`] into a method, a URL and an access level.
//!
//! # Example
//!
//! ```no_run
//! use ghost_api::{ClientConfig, ClientId, ClientSecret, GhostClient, Password};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(
//!     "https://blog.example.com",
//!     "you@example.com",
//!     Password::new("P@SSW0rd!".to_owned()),
//!     ClientId::new("ghost-admin".to_owned()),
//!     ClientSecret::new("0123456789ab".to_owned()),
//! );
//! config.validate()?;
//!
//! let client = GhostClient::new(config);
//! let created = client
//!     .posts()
//!     .create(&json!({ "posts": [{ "title": "Hello, world" }] }))
//!     .await?;
//! println!("{}", created.body());
//!
//! client.destruct().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Failed requests surface as a [`RequestError`], whose `Display` output is a
//! short tag such as `CLIENT_ERR{404}`. Use
//! [`describe()`][RequestError::describe()] for a sentence suitable for
//! people.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod braids;
mod client;
pub mod config;
mod dispatch;
pub mod endpoints;
pub mod error;
pub mod http;
mod posts;
pub mod tokens;
pub mod translations;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use braids::*;
pub use client::GhostClient;
pub use config::ClientConfig;
pub use endpoints::{EndpointDescriptor, EndpointTable};
pub use error::{ConfigError, RequestError};
pub use http::ApiResponse;
pub use posts::Posts;
pub use tokens::{TokenAuthority, TokenManager, TokenResponse};
pub use transport::{ReqwestTransport, Transport};
