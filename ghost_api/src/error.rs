//! Error taxonomy
//!
//! Errors carry their data as fields and only become the tagged strings used
//! on the wire (`SERVER_ERR{503}`, `MISSING_ENDPOINT_VARIABLE{id}`, …) when
//! displayed.

use std::error;

use thiserror::Error;

use crate::translations::translate;

/// A boxed error that is passed through untouched
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// A failure to perform an API request
#[derive(Debug, Error)]
pub enum RequestError {
    /// No endpoint with a path is registered under the requested key
    #[error("INVALID_KEY")]
    InvalidKey,
    /// The payload lacks a value for one of the endpoint's path variables
    #[error("MISSING_ENDPOINT_VARIABLE{{{name}}}")]
    MissingVariable {
        /// The name of the missing variable
        name: String,
    },
    /// A form post was attempted with an empty body
    #[error("NO_REQUEST_BODY")]
    NoRequestBody,
    /// The server refused the connection
    #[error("SERVER_DED")]
    ServerDead,
    /// The server answered with a 5xx status
    #[error("SERVER_ERR{{{status_code}}}")]
    ServerError {
        /// The HTTP status code
        status_code: u16,
    },
    /// The server answered with a 4xx status
    #[error("CLIENT_ERR{{{status_code}}}")]
    ClientError {
        /// The HTTP status code
        status_code: u16,
    },
    /// The server answered with any other unsuccessful status
    #[error("POST_ERR{{{status_code}}}")]
    PostError {
        /// The HTTP status code
        status_code: u16,
    },
    /// An unclassified failure, passed through unchanged
    #[error(transparent)]
    Passthrough(#[from] BoxError),
}

impl RequestError {
    /// The bare tag of this error, without any associated data
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey => "INVALID_KEY",
            Self::MissingVariable { .. } => "MISSING_ENDPOINT_VARIABLE",
            Self::NoRequestBody => "NO_REQUEST_BODY",
            Self::ServerDead => "SERVER_DED",
            Self::ServerError { .. } => "SERVER_ERR",
            Self::ClientError { .. } => "CLIENT_ERR",
            Self::PostError { .. } => "POST_ERR",
            Self::Passthrough(_) => "PASSTHROUGH",
        }
    }

    /// Whether the server answered with a 5xx status
    #[inline]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ServerError { .. })
    }

    /// The HTTP status code, for errors caused by an unsuccessful response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerError { status_code }
            | Self::ClientError { status_code }
            | Self::PostError { status_code } => Some(*status_code),
            _ => None,
        }
    }

    /// A human-readable description of the error
    pub fn describe(&self) -> String {
        match self {
            Self::MissingVariable { name } => translate(self.code(), &[("name", name)]),
            Self::Passthrough(source) => source.to_string(),
            _ => match self.status_code() {
                Some(code) => translate(self.code(), &[("statusCode", &code.to_string())]),
                None => translate(self.code(), &[]),
            },
        }
    }

    pub(crate) fn passthrough<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Passthrough(error.into())
    }
}

/// A problem with the client's configuration or cached credentials
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The blog URL lacks a scheme or host
    #[error("INVALID_URL")]
    InvalidUrl,
    /// The username is not a plausible email address
    #[error("INVALID_USER")]
    InvalidUser,
    /// The password is empty
    #[error("INVALID_PASS")]
    InvalidPass,
    /// The client ID is empty
    #[error("INVALID_CLIENT")]
    InvalidClient,
    /// The client secret is empty
    #[error("INVALID_SECRET")]
    InvalidSecret,
    /// The cached access token is missing or expired
    #[error("INVALID_TOKEN")]
    InvalidToken,
}

impl ConfigError {
    /// A human-readable description of the error
    pub fn describe(&self) -> String {
        translate(&self.to_string(), &[])
    }
}
