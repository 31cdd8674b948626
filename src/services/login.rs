// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Roblox sign-in pipeline.
//!
//! Four sequential stages, no retries:
//! 1. token exchange (fatal on failure)
//! 2. identity fetch (fatal on failure)
//! 3. avatar lookup (falls back to a generated avatar)
//! 4. local user upsert (failure logged and ignored)

use crate::db::{Storage, StorageError};
use crate::error::AppError;
use crate::models::{NewUser, ResolvedProfile};
use crate::services::avatar::{generate_avatar, PROFILE_AVATAR_SIZE};
use crate::services::roblox::{RobloxClient, RobloxError};
use std::sync::Arc;

/// Relying-party credentials for one exchange.
#[derive(Clone, Copy)]
pub struct ClientCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Completes Roblox sign-ins against the configured storage.
#[derive(Clone)]
pub struct LoginService {
    roblox: RobloxClient,
    storage: Arc<dyn Storage>,
}

impl LoginService {
    pub fn new(roblox: RobloxClient, storage: Arc<dyn Storage>) -> Self {
        Self { roblox, storage }
    }

    pub fn roblox(&self) -> &RobloxClient {
        &self.roblox
    }

    /// Run the full pipeline for an authorization code.
    ///
    /// `redirect_uri` must be the exact value sent in the authorization
    /// request.
    pub async fn complete(
        &self,
        credentials: ClientCredentials<'_>,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ResolvedProfile, AppError> {
        // Stage 1: token exchange
        let token = self
            .roblox
            .exchange_code(
                credentials.client_id,
                credentials.client_secret,
                code,
                redirect_uri,
            )
            .await
            .map_err(|e| match e {
                RobloxError::TokenRejected(_) => AppError::TokenExchange,
                other => AppError::SignInFailed(anyhow::anyhow!("Token exchange failed: {}", other)),
            })?;

        // Stage 2: identity
        let claims = self
            .roblox
            .get_userinfo(&token.access_token)
            .await
            .map_err(|e| match e {
                RobloxError::IdentityRejected(_) => AppError::IdentityFetch,
                other => {
                    AppError::SignInFailed(anyhow::anyhow!("Userinfo fetch failed: {}", other))
                }
            })?;
        drop(token);

        let user_id = claims.user_id().map_err(|e| {
            tracing::error!(error = %e, "Roblox returned an unusable subject claim");
            AppError::IdentityFetch
        })?;
        let username = claims.preferred_username.clone();

        // Stage 3: avatar (best-effort)
        let profile_image_url = match self.roblox.get_avatar_headshot(user_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Avatar fetch failed, using fallback");
                generate_avatar(&username, PROFILE_AVATAR_SIZE)
            }
        };

        // Stage 4: local user (best-effort)
        match self.storage.create_user(NewUser::from_roblox(&username)).await {
            Ok(user) => {
                tracing::info!(local_id = user.id, username = %username, "Created local user");
            }
            Err(StorageError::AlreadyExists(_)) => {
                tracing::debug!(username = %username, "Local user already exists");
            }
            Err(e) => {
                tracing::warn!(error = %e, username = %username, "Failed to store user, continuing anyway");
            }
        }

        tracing::info!(user_id, username = %username, "Roblox sign-in complete");

        Ok(ResolvedProfile {
            id: user_id,
            display_name: claims.display_name(),
            username,
            profile_image_url,
        })
    }
}
