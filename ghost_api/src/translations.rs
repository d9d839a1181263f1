//! Human-readable text for error and message codes

/// Text used as a prefix when a key has no translation
const NO_TRANSLATION: &str = "No translation is available for";

fn lookup(key: &str) -> Option<&'static str> {
    let text = match key {
        "NO_TRANSLATION" => NO_TRANSLATION,
        "SUGGEST_SSL" => {
            "The blog at {url} is served over plain HTTP. Credentials and tokens \
             will be sent unencrypted; consider enabling SSL."
        }
        "INVALID_URL" => "The blog URL must include a scheme and a host.",
        "INVALID_USER" => "The username must be the email address of a staff user.",
        "INVALID_PASS" => "A password is required.",
        "INVALID_CLIENT" => "A client ID is required.",
        "INVALID_SECRET" => "A client secret is required.",
        "INVALID_TOKEN" => "The cached access token is missing or expired.",
        "INVALID_KEY" => "No API endpoint is registered under that key.",
        "MISSING_ENDPOINT_VARIABLE" => "The request is missing the `{name}` path variable.",
        "NO_REQUEST_BODY" => "Refusing to send a request without a body.",
        "SERVER_DED" => "The server refused the connection. Is the blog running?",
        "SERVER_ERR" => "The server failed to handle the request (HTTP {statusCode}).",
        "CLIENT_ERR" => "The server rejected the request (HTTP {statusCode}).",
        "POST_ERR" => "The server answered with an unexpected status (HTTP {statusCode}).",
        _ => return None,
    };
    Some(text)
}

/// Translates a code into human-readable text
///
/// Occurrences of `{name}` in the text are replaced with the value paired
/// with `name` in `data`. Empty values leave their placeholder untouched.
pub fn translate(key: &str, data: &[(&str, &str)]) -> String {
    let Some(text) = lookup(key) else {
        return format!("{NO_TRANSLATION} {key}");
    };

    data.iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(text.to_owned(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}
