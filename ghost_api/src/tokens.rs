//! Access and refresh token lifecycle
//!
//! A [`TokenManager`] owns the token state of a single client. It logs in
//! with the password grant, renews the access token with the refresh grant
//! shortly before it expires, and revokes everything it knows about when the
//! client is torn down.
//!
//! The manager does not know about the client that owns it. Every operation
//! that talks to the blog is handed a [`TokenAuthority`] which supplies the
//! endpoint URLs and the credentials.

use std::{fmt, sync::Arc};

use ghost_clock::{Clock, DurationMillis, System, UnixMillis};
use reqwest::Url;

use crate::{
    error::{ConfigError, RequestError},
    http::ApiResponse,
    transport::{self, Transport},
    AccessToken, AccessTokenRef, ClientIdRef, ClientSecretRef, PasswordRef, RefreshToken,
    RefreshTokenRef,
};

mod dto;

pub use dto::TokenResponse;

/// The validity offset used when no other is given, in milliseconds
pub const DEFAULT_VALIDITY_OFFSET_MS: i64 = 1000;

/// How long a cached token must remain valid to be reused by a refresh, in
/// milliseconds
pub const REFRESH_VALIDITY_OFFSET_MS: i64 = 5000;

/// Subtracted from every reported lifetime, since the instant the token was
/// issued is unknown
const ISSUANCE_MARGIN: DurationMillis = DurationMillis(1000);

const TOKEN_CREATE: &str = "token.create";
const TOKEN_DESTROY: &str = "token.destroy";

const TOKEN_STATE: &str = "ghost_api::token_state";

/// Supplies the endpoints and credentials a [`TokenManager`] needs
pub trait TokenAuthority {
    /// Resolves an endpoint key to an absolute URL
    fn url_for(&self, key: &str) -> Option<Url>;
    /// The email address of the staff user
    fn username(&self) -> &str;
    /// The staff user's password
    fn password(&self) -> &PasswordRef;
    /// The client ID
    fn client_id(&self) -> &ClientIdRef;
    /// The client secret
    fn client_secret(&self) -> &ClientSecretRef;
}

/// Owns and renews the tokens of a single client
pub struct TokenManager<T, C = System> {
    transport: Arc<T>,
    clock: C,
    initialized: bool,
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    expires: UnixMillis,
}

impl<T> TokenManager<T, System> {
    /// Constructs a new manager holding no tokens
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            clock: System,
            initialized: false,
            access_token: None,
            refresh_token: None,
            expires: System.now() - ISSUANCE_MARGIN,
        }
    }
}

impl<T, C> TokenManager<T, C> {
    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D: Clock>(self, clock: D) -> TokenManager<T, D> {
        let expires = clock.now() - ISSUANCE_MARGIN;
        TokenManager {
            transport: self.transport,
            clock,
            initialized: self.initialized,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires,
        }
    }

    /// Whether [`initialize()`][Self::initialize()] has been called
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The cached access token, if any
    #[inline]
    pub fn access_token(&self) -> Option<&AccessTokenRef> {
        self.access_token.as_deref()
    }

    /// The cached refresh token, if any
    #[inline]
    pub fn refresh_token(&self) -> Option<&RefreshTokenRef> {
        self.refresh_token.as_deref()
    }

    /// When the cached access token stops being valid
    #[inline]
    pub fn expires(&self) -> UnixMillis {
        self.expires
    }

    /// Forgets the cached access token, leaving the refresh token in place
    pub fn unset_access(&mut self) {
        self.access_token = None;
    }

    /// Forgets the access token if the server failed while revoking it
    ///
    /// The server may or may not have revoked the token, but it will not be
    /// used again either way. Any other error is returned.
    fn forget_leaky_token(&mut self, error: RequestError) -> Result<(), RequestError> {
        if error.is_server_error() {
            self.unset_access();
            tracing::warn!(target: TOKEN_STATE, %error, "token leak occurred, forgetting access token");
            Ok(())
        } else {
            Err(error)
        }
    }
}

impl<T, C: Clock> TokenManager<T, C> {
    /// Whether the access token will still be valid `offset_ms` from now
    ///
    /// The sign of the offset is ignored. A missing access token is never
    /// valid.
    pub fn token_is_valid(&self, offset_ms: i64) -> bool {
        let must_be_valid_until = self.clock.now() + DurationMillis(offset_ms.unsigned_abs());
        self.access_token.is_some() && self.expires >= must_be_valid_until
    }

    /// Checks the cached access token without contacting the blog
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_is_valid(DEFAULT_VALIDITY_OFFSET_MS) {
            Ok(())
        } else {
            Err(ConfigError::InvalidToken)
        }
    }

    /// Stores freshly issued tokens and returns the new access token
    pub fn update_tokens(&mut self, response: TokenResponse) -> AccessToken {
        let TokenResponse {
            access_token,
            refresh_token,
            expires_in,
        } = response;

        tracing::trace!(
            target: TOKEN_STATE,
            token = format_args!("{:#?}", access_token),
            expires_in,
            "created access token"
        );

        if let Some(refresh_token) = refresh_token {
            tracing::trace!(
                target: TOKEN_STATE,
                token = format_args!("{:#?}", refresh_token),
                "created refresh token"
            );
            self.refresh_token = Some(refresh_token);
        }

        self.expires = self.clock.now() + DurationMillis::from_secs(expires_in) - ISSUANCE_MARGIN;
        self.access_token = Some(access_token.clone());
        access_token
    }
}

impl<T: Transport, C: Clock> TokenManager<T, C> {
    /// Marks the manager as initialized and logs in
    ///
    /// Calling this again logs in again.
    pub async fn initialize<A>(&mut self, authority: &A) -> Result<AccessToken, RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        tracing::debug!("initializing token manager");
        self.initialized = true;
        self.login(authority).await
    }

    /// Obtains a new token pair with the password grant
    #[tracing::instrument(err, skip_all)]
    pub async fn login<A>(&mut self, authority: &A) -> Result<AccessToken, RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        tracing::debug!("logging in");

        let url = token_url(authority, TOKEN_CREATE)?;
        let grant = dto::PasswordGrant {
            username: authority.username(),
            password: authority.password(),
            client_id: authority.client_id(),
            client_secret: authority.client_secret(),
        };

        let response = transport::post_form(&*self.transport, &url, &grant, Vec::new()).await?;
        Ok(self.update_tokens(parse_tokens(response)?))
    }

    /// Returns an access token valid for at least the next five seconds
    ///
    /// A token that is still good enough is returned without contacting the
    /// blog. Otherwise the old access token is revoked and a new one is
    /// obtained with the refresh grant, or by logging in again if there is no
    /// refresh token.
    #[tracing::instrument(err, skip_all)]
    pub async fn refresh<A>(&mut self, authority: &A) -> Result<AccessToken, RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        if !self.initialized {
            return self.initialize(authority).await;
        }

        if self.token_is_valid(REFRESH_VALIDITY_OFFSET_MS) {
            if let Some(token) = &self.access_token {
                tracing::trace!("cached access token is still valid");
                return Ok(token.clone());
            }
        }

        tracing::debug!("refreshing tokens");
        self.destroy_access_token(authority).await?;

        let Some(refresh_token) = self.refresh_token.clone() else {
            tracing::debug!("no refresh token available, logging in again");
            return self.login(authority).await;
        };

        let url = token_url(authority, TOKEN_CREATE)?;
        let grant = dto::RefreshGrant {
            refresh_token: &refresh_token,
            client_id: authority.client_id(),
            client_secret: authority.client_secret(),
        };

        let response = transport::post_form(&*self.transport, &url, &grant, Vec::new()).await?;
        Ok(self.update_tokens(parse_tokens(response)?))
    }

    /// Returns a valid access token, refreshing first if needed
    pub async fn get_token<A>(&mut self, authority: &A) -> Result<AccessToken, RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        self.refresh(authority).await
    }

    /// Revokes `token`, authenticating with `auth_token`
    ///
    /// Does nothing if either token is missing or empty.
    pub async fn destroy_single_token<A>(
        &self,
        authority: &A,
        token: Option<&str>,
        auth_token: Option<&AccessTokenRef>,
    ) -> Result<(), RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        let token = token.filter(|t| !t.is_empty());
        let auth_token = auth_token.filter(|t| !t.as_str().is_empty());

        let (Some(token), Some(auth_token)) = (token, auth_token) else {
            if token.is_some() {
                tracing::trace!(target: TOKEN_STATE, "failed destroying token, no access token to authenticate with");
            }
            return Ok(());
        };

        let url = token_url(authority, TOKEN_DESTROY)?;
        let headers = vec![(
            "authorization".to_owned(),
            format!("Bearer {}", auth_token.as_str()),
        )];

        transport::post_form(&*self.transport, &url, &dto::Revocation { token }, headers).await?;

        tracing::trace!(target: TOKEN_STATE, "destroyed token");
        Ok(())
    }

    /// Revokes the cached access token and forgets it
    ///
    /// Without an access token this only marks the expiry as long past.
    pub async fn destroy_access_token<A>(&mut self, authority: &A) -> Result<(), RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        tracing::debug!("destroying access token");

        let Some(access_token) = self.access_token.clone() else {
            self.expires = UnixMillis::EPOCH;
            return Ok(());
        };

        let revoked = self
            .destroy_single_token(authority, Some(access_token.as_str()), Some(&*access_token))
            .await;

        match revoked {
            Ok(()) => {
                self.unset_access();
                Ok(())
            }
            Err(error) => self.forget_leaky_token(error),
        }
    }

    /// Revokes every token the manager knows about
    ///
    /// Refresh tokens are revoked first, authenticated with the access token;
    /// if there is no access token, one is obtained by logging in. Failing to
    /// revoke a refresh token is logged and otherwise ignored. The access
    /// token revokes itself last.
    #[tracing::instrument(err, skip_all)]
    pub async fn destruct<A>(&mut self, authority: &A) -> Result<(), RequestError>
    where
        A: TokenAuthority + ?Sized,
    {
        tracing::debug!("destructing token state");

        let mut doomed: Vec<RefreshToken> = self.refresh_token.iter().cloned().collect();

        if self.access_token.is_none() {
            if let Err(error) = self.login(authority).await {
                return self.forget_leaky_token(error);
            }
            doomed.extend(self.refresh_token.iter().cloned());
        }

        let access_token = self.access_token.clone();

        for token in &doomed {
            let revoked = self
                .destroy_single_token(authority, Some(token.as_str()), access_token.as_deref())
                .await;
            if let Err(error) = revoked {
                tracing::warn!(
                    target: TOKEN_STATE,
                    %error,
                    "refresh token probably not destroyed"
                );
            }
        }
        self.refresh_token = None;

        let revoked = self
            .destroy_single_token(
                authority,
                access_token.as_ref().map(|t| t.as_str()),
                access_token.as_deref(),
            )
            .await;

        match revoked {
            Ok(()) => {
                self.unset_access();
                self.expires = UnixMillis::EPOCH;
                Ok(())
            }
            Err(error) => self.forget_leaky_token(error),
        }
    }
}

impl<T, C> fmt::Debug for TokenManager<T, C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("clock", &self.clock)
            .field("initialized", &self.initialized)
            .field("access_token", &self.access_token)
            .field("refresh_token", &self.refresh_token)
            .field("expires", &self.expires)
            .finish()
    }
}

fn token_url<A>(authority: &A, key: &str) -> Result<Url, RequestError>
where
    A: TokenAuthority + ?Sized,
{
    authority.url_for(key).ok_or(RequestError::InvalidKey)
}

fn parse_tokens(response: ApiResponse) -> Result<TokenResponse, RequestError> {
    serde_json::from_value(response.into_body()).map_err(RequestError::passthrough)
}
