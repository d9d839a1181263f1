//! Connection settings for a blog

use reqwest::Url;
use serde::Deserialize;

use crate::{ClientId, ClientSecret, ConfigError, Password};

/// Where the blog lives and who to log in as
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// The blog's base URL
    pub url: String,
    /// The email address of the staff user
    #[serde(alias = "user")]
    pub username: String,
    /// The staff user's password
    #[serde(alias = "pass")]
    pub password: Password,
    /// The client ID registered with the blog
    #[serde(alias = "client")]
    pub client_id: ClientId,
    /// The secret paired with the client ID
    #[serde(alias = "secret")]
    pub client_secret: ClientSecret,
}

impl ClientConfig {
    /// Constructs a new configuration
    ///
    /// Nothing is checked here; call [`validate()`][Self::validate()] for that.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: Password,
        client_id: ClientId,
        client_secret: ClientSecret,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password,
            client_id,
            client_secret,
        }
    }

    /// Checks that every field is usable, reporting the first problem found
    ///
    /// The checks run in the order URL, username, password, client ID, client
    /// secret. The username check only asks for an `@` and a `.`, neither in
    /// first position.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.url) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {}
            _ => return Err(ConfigError::InvalidUrl),
        }

        if !is_plausible_email(&self.username) {
            return Err(ConfigError::InvalidUser);
        }
        if self.password.as_str().is_empty() {
            return Err(ConfigError::InvalidPass);
        }
        if self.client_id.as_str().is_empty() {
            return Err(ConfigError::InvalidClient);
        }
        if self.client_secret.as_str().is_empty() {
            return Err(ConfigError::InvalidSecret);
        }

        Ok(())
    }

    /// Whether the blog is reached over plain HTTP
    pub fn is_plaintext(&self) -> bool {
        Url::parse(&self.url).is_ok_and(|url| url.scheme() == "http")
    }
}

fn is_plausible_email(user: &str) -> bool {
    let positive = |c: char| user.find(c).is_some_and(|idx| idx > 0);
    positive('@') && positive('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig::new(
            "https://ghost.local",
            "you@example.com",
            Password::from_static("P@SSW0rd!"),
            ClientId::from_static("your-awesome-app"),
            ClientSecret::from_static("randomletters"),
        )
    }

    #[test]
    fn valid_configuration_passes() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn url_needs_scheme_and_host() {
        for url in ["", "ghost.local", "/relative/path", "mailto:you@example.com"] {
            let config = ClientConfig {
                url: url.to_owned(),
                ..valid()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidUrl), "url {url:?}");
        }
    }

    #[test]
    fn username_must_look_like_an_email() {
        for user in ["", "you", "@example.com", ".you@example", "you@example"] {
            let config = ClientConfig {
                username: user.to_owned(),
                ..valid()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidUser), "user {user:?}");
        }
    }

    #[test]
    fn dot_may_come_before_at() {
        let config = ClientConfig {
            username: "first.last@localhost".to_owned(),
            ..valid()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn each_missing_secret_is_reported() {
        let config = ClientConfig {
            password: Password::from_static(""),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPass));

        let config = ClientConfig {
            client_id: ClientId::from_static(""),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidClient));

        let config = ClientConfig {
            client_secret: ClientSecret::from_static(""),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidSecret));
    }

    #[test]
    fn first_problem_wins() {
        let config = ClientConfig {
            url: "nope".to_owned(),
            username: "nope".to_owned(),
            password: Password::from_static(""),
            client_id: ClientId::from_static(""),
            client_secret: ClientSecret::from_static(""),
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidUrl));

        let config = ClientConfig {
            url: "https://ghost.local".to_owned(),
            ..config
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidUser));

        let config = ClientConfig {
            client_id: ClientId::from_static(""),
            client_secret: ClientSecret::from_static(""),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidClient));
    }

    #[test]
    fn deserializes_with_short_aliases() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "url": "http://ghost.local",
            "user": "you@example.com",
            "pass": "hunter2",
            "client": "ghost-admin",
            "secret": "abc123",
        }))
        .unwrap();

        assert_eq!(config.username, "you@example.com");
        assert_eq!(config.password.as_str(), "hunter2");
        assert_eq!(config.client_id.as_str(), "ghost-admin");
        assert!(config.is_plaintext());
        assert_eq!(config.validate(), Ok(()));
    }
}
