//! Bodies exchanged with the token endpoints

use serde::{Deserialize, Serialize, Serializer};

use crate::{
    AccessToken, ClientIdRef, ClientSecretRef, PasswordRef, RefreshToken, RefreshTokenRef,
};

/// Credentials for the password grant
#[derive(Debug)]
pub(crate) struct PasswordGrant<'a> {
    pub username: &'a str,
    pub password: &'a PasswordRef,
    pub client_id: &'a ClientIdRef,
    pub client_secret: &'a ClientSecretRef,
}

impl Serialize for PasswordGrant<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut ser = serializer.serialize_struct("PasswordGrant", 5)?;
        ser.serialize_field("grant_type", "password")?;
        ser.serialize_field("username", self.username)?;
        ser.serialize_field("password", self.password)?;
        ser.serialize_field("client_id", self.client_id)?;
        ser.serialize_field("client_secret", self.client_secret)?;
        ser.end()
    }
}

/// Credentials for the refresh token grant
#[derive(Debug)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a RefreshTokenRef,
    pub client_id: &'a ClientIdRef,
    pub client_secret: &'a ClientSecretRef,
}

impl Serialize for RefreshGrant<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut ser = serializer.serialize_struct("RefreshGrant", 4)?;
        ser.serialize_field("grant_type", "refresh_token")?;
        ser.serialize_field("refresh_token", self.refresh_token)?;
        ser.serialize_field("client_id", self.client_id)?;
        ser.serialize_field("client_secret", self.client_secret)?;
        ser.end()
    }
}

/// A request to revoke a single token
#[derive(Debug, Serialize)]
pub(crate) struct Revocation<'a> {
    pub token: &'a str,
}

/// Tokens as issued by the blog
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The new access token
    pub access_token: AccessToken,
    /// The new refresh token, if one was issued
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    /// The access token's lifetime in seconds
    pub expires_in: u64,
}
