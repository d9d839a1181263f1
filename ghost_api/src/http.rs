//! HTTP requests and responses as plain data
//!
//! The token manager and the dispatcher describe what they want sent as an
//! [`HttpRequest`]; a [`Transport`][crate::transport::Transport] turns it into
//! network traffic and hands back an [`HttpResponse`].

use std::{fmt, ops};

use reqwest::Url;
use serde_json::{Map, Value};

/// HTTP method for a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// The method as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body, along with how it should be encoded
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// URL-encoded form data
    Form(Map<String, Value>),
    /// A JSON document
    Json(Map<String, Value>),
}

impl Payload {
    /// The fields of the payload, regardless of encoding
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Self::Form(fields) | Self::Json(fields) => fields,
        }
    }
}

/// An HTTP request described as plain data
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The request method
    pub method: HttpMethod,
    /// The absolute URL to send the request to
    pub url: Url,
    /// Header names and values, sent in order
    pub headers: Vec<(String, String)>,
    /// The request body
    pub payload: Payload,
}

impl HttpRequest {
    /// Looks up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// The status code
    pub status: u16,
    /// Header names and values
    pub headers: Vec<(String, String)>,
    /// The raw response body
    pub body: String,
}

impl HttpResponse {
    /// Constructs a response with a status and body and no headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// A successful response: the parsed body with the original envelope attached
///
/// Dereferences to the parsed body so fields can be read directly.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    body: Value,
    raw: HttpResponse,
}

impl ApiResponse {
    pub(crate) fn new(body: Value, raw: HttpResponse) -> Self {
        Self { body, raw }
    }

    /// The parsed response body
    #[inline]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The response as received, including status code and headers
    #[inline]
    pub fn raw(&self) -> &HttpResponse {
        &self.raw
    }

    /// Takes the parsed body, discarding the envelope
    #[inline]
    pub fn into_body(self) -> Value {
        self.body
    }
}

impl ops::Deref for ApiResponse {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}
