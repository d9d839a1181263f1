//! A connection to a single blog

use std::{fmt, sync::Arc};

use ghost_clock::{Clock, System};
use reqwest::Url;
use tokio::sync::{Mutex, MutexGuard};

use crate::{
    config::ClientConfig,
    endpoints::{EndpointDescriptor, EndpointTable},
    error::{ConfigError, RequestError},
    tokens::{TokenAuthority, TokenManager},
    translations::translate,
    transport::{ReqwestTransport, Transport},
    AccessToken, ClientIdRef, ClientSecretRef, PasswordRef,
};

/// A client for one blog, owning that blog's tokens
///
/// Token operations are serialized, so concurrent callers of
/// [`get_token()`][Self::get_token()] trigger at most one login or refresh.
pub struct GhostClient<T = ReqwestTransport, C = System> {
    config: ClientConfig,
    endpoints: Arc<EndpointTable>,
    transport: Arc<T>,
    tokens: Mutex<TokenManager<T, C>>,
}

impl GhostClient<ReqwestTransport, System> {
    /// Constructs a client that talks to the blog over [`reqwest`]
    ///
    /// Logs a warning if the blog is not served over HTTPS.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::default())
    }
}

impl<T> GhostClient<T, System> {
    /// Constructs a client on top of a custom transport
    ///
    /// Logs a warning if the blog is not served over HTTPS.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        if config.is_plaintext() {
            tracing::warn!(
                url = %config.url,
                "{}",
                translate("SUGGEST_SSL", &[("url", &config.url)])
            );
        }

        let transport = Arc::new(transport);
        Self {
            tokens: Mutex::new(TokenManager::new(transport.clone())),
            config,
            endpoints: EndpointTable::shared(),
            transport,
        }
    }
}

impl<T, C> GhostClient<T, C> {
    /// Replaces the endpoint table
    pub fn with_endpoints(mut self, endpoints: Arc<EndpointTable>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Sets a custom clock to be used for token expiry
    ///
    /// Useful for testing purposes
    pub fn with_clock<D: Clock>(self, clock: D) -> GhostClient<T, D> {
        GhostClient {
            config: self.config,
            endpoints: self.endpoints,
            transport: self.transport,
            tokens: Mutex::new(self.tokens.into_inner().with_clock(clock)),
        }
    }

    /// The connection settings
    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mutable access to the connection settings
    ///
    /// Changes are not checked; call [`validate()`][Self::validate()] again.
    #[inline]
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// The endpoint table
    #[inline]
    pub fn endpoints(&self) -> &Arc<EndpointTable> {
        &self.endpoints
    }

    #[inline]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Looks up the endpoint registered under a dot-separated key
    pub fn endpoint(&self, key: &str) -> Option<&EndpointDescriptor> {
        self.endpoints.endpoint(key)
    }

    /// The absolute URL of the endpoint registered under `key`
    ///
    /// Returns `None` for unknown keys and for unusable base URLs.
    pub fn url_for(&self, key: &str) -> Option<Url> {
        self.endpoint(key)?.url(&self.config.url)
    }

    /// Locks and returns the token manager
    pub async fn token_manager(&self) -> MutexGuard<'_, TokenManager<T, C>> {
        self.tokens.lock().await
    }
}

impl<T, C: Clock> GhostClient<T, C> {
    /// Checks the configuration, then the cached access token
    ///
    /// Reports the first problem found, checking the URL, username, password,
    /// client ID, client secret and token in that order.
    pub async fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.tokens.lock().await.validate()
    }
}

impl<T: Transport, C: Clock> GhostClient<T, C> {
    /// Returns a valid access token, logging in or refreshing as needed
    pub async fn get_token(&self) -> Result<AccessToken, RequestError> {
        let mut tokens = self.tokens.lock().await;
        tokens.get_token(self).await
    }

    /// Returns an `Authorization` header value carrying a valid access token
    pub async fn get_auth_header(&self) -> Result<String, RequestError> {
        let token = self.get_token().await?;
        Ok(format!("Bearer {}", token.as_str()))
    }

    /// Revokes every token held for this blog
    pub async fn destruct(&self) -> Result<(), RequestError> {
        let mut tokens = self.tokens.lock().await;
        tokens.destruct(self).await
    }
}

impl<T, C> TokenAuthority for GhostClient<T, C> {
    fn url_for(&self, key: &str) -> Option<Url> {
        GhostClient::url_for(self, key)
    }

    fn username(&self) -> &str {
        &self.config.username
    }

    fn password(&self) -> &PasswordRef {
        &self.config.password
    }

    fn client_id(&self) -> &ClientIdRef {
        &self.config.client_id
    }

    fn client_secret(&self) -> &ClientSecretRef {
        &self.config.client_secret
    }
}

impl<T, C> fmt::Debug for GhostClient<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GhostClient")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
