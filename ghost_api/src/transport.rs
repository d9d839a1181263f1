//! The transport primitive
//!
//! [`Transport`] is the seam between the client and the network. The free
//! functions [`post_form`] and [`send`] sit on top of it and classify every
//! failure into a [`RequestError`].

use std::{error, io};

use async_trait::async_trait;
use reqwest::{header, Url};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    error::{BoxError, RequestError},
    http::{ApiResponse, HttpMethod, HttpRequest, HttpResponse, Payload},
};

/// The user agent sent with every request
pub const USER_AGENT: &str = concat!("ghost-api/", env!("CARGO_PKG_VERSION"));

/// Something that can carry an [`HttpRequest`] to a server
///
/// Implementations return responses of any status code as `Ok`; judging the
/// status is left to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a single round-trip, without retries
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A failure to obtain any response at all
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server actively refused the connection
    #[error("connection refused")]
    ConnectionRefused(#[source] BoxError),
    /// Any other failure
    #[error("error sending request")]
    Other(#[source] BoxError),
}

/// Posts a URL-encoded form to `url`
///
/// Refuses to send a body that serializes to an empty object, since the
/// server cannot tell that apart from a missing payload.
#[tracing::instrument(err, skip(transport, url, body, headers), fields(url = %url))]
pub async fn post_form<T, B>(
    transport: &T,
    url: &Url,
    body: &B,
    headers: Vec<(String, String)>,
) -> Result<ApiResponse, RequestError>
where
    T: Transport + ?Sized,
    B: Serialize + ?Sized,
{
    let fields = to_fields(body)?;
    if fields.is_empty() {
        return Err(RequestError::NoRequestBody);
    }

    let request = HttpRequest {
        method: HttpMethod::Post,
        url: url.clone(),
        headers,
        payload: Payload::Form(fields),
    };

    send(transport, request).await
}

/// Sends a request and classifies the outcome
pub async fn send<T>(transport: &T, request: HttpRequest) -> Result<ApiResponse, RequestError>
where
    T: Transport + ?Sized,
{
    tracing::trace!(method = %request.method, url = %request.url, "sending request");
    classify(transport.execute(request).await)
}

/// Serializes a payload into the fields of a JSON object
///
/// `null` counts as an empty object.
pub(crate) fn to_fields<B>(body: &B) -> Result<Map<String, Value>, RequestError>
where
    B: Serialize + ?Sized,
{
    match serde_json::to_value(body).map_err(RequestError::passthrough)? {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Map::new()),
        other => Err(RequestError::passthrough(format!(
            "request payload must be an object, not {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn classify(
    result: Result<HttpResponse, TransportError>,
) -> Result<ApiResponse, RequestError> {
    let response = match result {
        Ok(response) => response,
        Err(TransportError::ConnectionRefused(source)) => {
            tracing::debug!(
                error = (&*source as &dyn error::Error),
                "server refused connection"
            );
            return Err(RequestError::ServerDead);
        }
        Err(TransportError::Other(source)) => return Err(RequestError::Passthrough(source)),
    };

    tracing::debug!(response.status = response.status, "received response");

    let status_code = response.status;
    match status_code {
        200..=299 => {}
        500..=599 => return Err(RequestError::ServerError { status_code }),
        400..=499 => return Err(RequestError::ClientError { status_code }),
        _ => return Err(RequestError::PostError { status_code }),
    }

    let body = if response.body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&response.body).map_err(RequestError::passthrough)?
    };

    Ok(ApiResponse::new(body, response))
}

/// A [`Transport`] backed by [`reqwest`]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, request.url)
            .header(header::USER_AGENT, USER_AGENT);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match (request.method, &request.payload) {
            (HttpMethod::Get, payload) if payload.fields().is_empty() => builder,
            (HttpMethod::Get, payload) => builder.query(payload.fields()),
            (_, Payload::Form(fields)) => builder.form(fields),
            (_, Payload::Json(fields)) => builder.json(fields),
        };

        let resp = builder.send().await.map_err(|error| {
            if is_connection_refused(&error) {
                TransportError::ConnectionRefused(error.into())
            } else {
                TransportError::Other(error.into())
            }
        })?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp
            .text()
            .await
            .map_err(|error| TransportError::Other(error.into()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn is_connection_refused(error: &(dyn error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<io::Error>() {
            if io.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = err.source();
    }
    false
}
