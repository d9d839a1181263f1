//! Sending requests to named endpoints

use ghost_clock::Clock;
use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    client::GhostClient,
    error::{ConfigError, RequestError},
    http::{ApiResponse, HttpRequest, Payload},
    transport::{self, Transport},
};

impl<T: Transport, C: Clock> GhostClient<T, C> {
    /// Sends `payload` to the endpoint registered under `key`
    ///
    /// Path variables are taken out of the payload and substituted into the
    /// URL. Private endpoints are called with a bearer token; public ones get
    /// the client credentials added to the body instead.
    #[tracing::instrument(err, skip(self, payload))]
    pub async fn make_request<P>(&self, key: &str, payload: &P) -> Result<ApiResponse, RequestError>
    where
        P: Serialize + ?Sized,
    {
        let endpoint = self.endpoint(key).ok_or(RequestError::InvalidKey)?;
        let mut url = endpoint
            .url(&self.config().url)
            .ok_or_else(|| RequestError::passthrough(ConfigError::InvalidUrl))?;

        let mut fields = transport::to_fields(payload)?;
        substitute_variables(&mut url, endpoint.variables(), &mut fields)?;

        let mut headers = Vec::new();
        if endpoint.is_private() {
            headers.push(("authorization".to_owned(), self.get_auth_header().await?));
        } else {
            let config = self.config();
            fields.insert(
                "client_id".to_owned(),
                Value::String(config.client_id.as_str().to_owned()),
            );
            fields.insert(
                "client_secret".to_owned(),
                Value::String(config.client_secret.as_str().to_owned()),
            );
        }

        let request = HttpRequest {
            method: endpoint.method(),
            url,
            headers,
            payload: Payload::Json(fields),
        };

        transport::send(self.transport(), request).await
    }
}

/// Moves each path variable out of `fields` and into the URL path
fn substitute_variables(
    url: &mut Url,
    variables: &[String],
    fields: &mut Map<String, Value>,
) -> Result<(), RequestError> {
    let mut path = url.path().to_owned();

    for name in variables {
        let value = fields
            .remove(name)
            .as_ref()
            .and_then(path_segment)
            .ok_or_else(|| RequestError::MissingVariable { name: name.clone() })?;

        path = path.replace(&format!("%7B{name}%7D"), &urlencoding::encode(&value));
    }

    url.set_path(&path);
    Ok(())
}

fn path_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
