// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Roblox OAuth 2.0 / OIDC client.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization code exchange
//! - Userinfo (identity claims) lookup
//! - Avatar headshot thumbnail lookup

use serde::Deserialize;
use std::time::Duration;

/// Thumbnail size requested for profile images.
pub const AVATAR_SIZE: &str = "150x150";

/// Errors from the Roblox OAuth endpoints.
///
/// Upstream response bodies are logged, never carried in these values.
#[derive(Debug, thiserror::Error)]
pub enum RobloxError {
    #[error("token exchange rejected with status {0}")]
    TokenRejected(reqwest::StatusCode),

    #[error("userinfo rejected with status {0}")]
    IdentityRejected(reqwest::StatusCode),

    #[error("subject claim is not numeric: {0}")]
    InvalidSubject(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Avatar lookup failures. Always absorbed by the caller.
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("thumbnail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("thumbnail endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("thumbnail response has no imageUrl")]
    MissingImage,
}

/// Token endpoint response. Used once, never persisted.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// OIDC userinfo claims.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    /// Provider-scoped numeric user ID, as a string
    pub sub: String,
    pub preferred_username: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl IdentityClaims {
    /// Parse the subject claim as the numeric Roblox user ID.
    pub fn user_id(&self) -> Result<i64, RobloxError> {
        self.sub
            .trim()
            .parse()
            .map_err(|_| RobloxError::InvalidSubject(self.sub.clone()))
    }

    /// Display name, falling back to the username when `name` is absent.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.preferred_username)
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    #[serde(default)]
    data: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Thumbnail {
    #[serde(default)]
    image_url: Option<String>,
}

/// Roblox API client.
#[derive(Clone)]
pub struct RobloxClient {
    http: reqwest::Client,
    oauth_base_url: String,
    thumbnails_base_url: String,
}

impl RobloxClient {
    /// Create a client against the given API bases.
    pub fn new(
        oauth_base_url: impl Into<String>,
        thumbnails_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            oauth_base_url: oauth_base_url.into(),
            thumbnails_base_url: thumbnails_base_url.into(),
        })
    }

    /// Authorization endpoint URL for a browser redirect.
    ///
    /// `redirect_uri` is percent-encoded here; pass it raw.
    pub fn authorization_url(&self, client_id: &str, redirect_uri: &str, state: &str) -> String {
        build_authorization_url(&self.oauth_base_url, client_id, redirect_uri, state)
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, RobloxError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base_url))
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Roblox token exchange failed");
            return Err(RobloxError::TokenRejected(status));
        }

        Ok(response.json().await?)
    }

    /// Fetch identity claims with a bearer access token.
    pub async fn get_userinfo(&self, access_token: &str) -> Result<IdentityClaims, RobloxError> {
        let response = self
            .http
            .get(format!("{}/userinfo", self.oauth_base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Roblox userinfo fetch failed");
            return Err(RobloxError::IdentityRejected(status));
        }

        Ok(response.json().await?)
    }

    /// Look up the 150x150 PNG headshot for a user.
    pub async fn get_avatar_headshot(&self, user_id: i64) -> Result<String, AvatarError> {
        let response = self
            .http
            .get(format!("{}/users/avatar-headshot", self.thumbnails_base_url))
            .query(&[
                ("userIds", user_id.to_string()),
                ("size", AVATAR_SIZE.to_string()),
                ("format", "Png".to_string()),
                ("isCircular", "false".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AvatarError::Status(response.status()));
        }

        let body: ThumbnailResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .and_then(|t| t.image_url)
            .filter(|url| !url.is_empty())
            .ok_or(AvatarError::MissingImage)
    }
}

/// Build the provider authorization URL with scope `openid` and response
/// type `code`.
pub fn build_authorization_url(
    oauth_base_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> String {
    format!(
        "{}/authorize?\
         client_id={}&\
         redirect_uri={}&\
         scope=openid&\
         response_type=code&\
         state={}",
        oauth_base_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(state)
    )
}

/// Redirect URI registered with the provider for a frontend origin.
pub fn redirect_uri_for(origin: &str) -> String {
    format!("{}/auth/callback", origin.trim_end_matches('/'))
}
