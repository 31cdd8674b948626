// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Roblox OAuth sign-in routes.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    create_session_token, current_session, session_cookie, session_cookie_removal, state_cookie,
    state_cookie_removal, STATE_COOKIE,
};
use crate::models::ResolvedProfile;
use crate::services::avatar::{generate_avatar, HEADER_AVATAR_SIZE};
use crate::services::oauth_state::{issue_state, verify_returned_state};
use crate::services::roblox::redirect_uri_for;
use crate::services::ClientCredentials;
use crate::time_utils::unix_millis;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/roblox", get(auth_start))
        .route("/api/auth/roblox/callback", post(auth_callback))
        .route("/api/auth/user", get(current_user))
        .route("/api/auth/logout", post(logout))
}

/// Query parameters for starting the OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend origin the provider should send the browser back to.
    /// If not provided, uses FRONTEND_URL.
    #[serde(default)]
    origin: Option<String>,
}

/// Start OAuth flow - redirect to Roblox authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let client_id = state
        .config
        .roblox_client_id
        .as_deref()
        .ok_or(AppError::NotConfigured("ROBLOX_CLIENT_ID"))?;

    let origin = params
        .origin
        .map(|o| o.trim_end_matches('/').to_string())
        .unwrap_or_else(|| state.config.frontend_url.clone());

    if !state.config.is_allowed_origin(&origin) {
        tracing::warn!(origin = %origin, "Rejected sign-in from unknown origin");
        return Err(AppError::BadRequest("Origin not allowed".to_string()));
    }

    let oauth_state = issue_state(&state.config.oauth_state_key, &origin, unix_millis())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to issue OAuth state: {}", e)))?;

    let redirect_uri = redirect_uri_for(&origin);
    let auth_url = state
        .login_service
        .roblox()
        .authorization_url(client_id, &redirect_uri, &oauth_state);

    tracing::info!(
        origin = %origin,
        redirect_uri = %redirect_uri,
        "Starting OAuth flow, redirecting to Roblox"
    );

    let jar = jar.add(state_cookie(oauth_state, state.config.frontend_is_https()));
    Ok((jar, Redirect::temporary(&auth_url)))
}

/// Callback body posted by the frontend's `/auth/callback` page.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// OAuth callback - exchange the code, resolve the profile, start a session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ResolvedProfile>)> {
    // An unparseable body is treated like an empty one
    let request: CallbackRequest = serde_json::from_slice(&body).unwrap_or_default();

    let code = request
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingCode)?;

    let returned_state = request.state.unwrap_or_default();
    let verified = verify_returned_state(
        &state.config.oauth_state_key,
        &returned_state,
        jar.get(STATE_COOKIE).map(|c| c.value()),
        unix_millis(),
    )
    .map_err(|e| {
        tracing::warn!(reason = %e, "Rejected OAuth callback state");
        AppError::InvalidState
    })?;

    let (client_id, client_secret) = state
        .config
        .roblox_credentials()
        .ok_or(AppError::NotConfigured("ROBLOX_CLIENT_ID/ROBLOX_CLIENT_SECRET"))?;

    tracing::info!("Exchanging authorization code for tokens");

    // Redirect URI must match the authorization request byte for byte
    let redirect_uri = redirect_uri_for(&verified.origin);
    let profile = state
        .login_service
        .complete(
            ClientCredentials {
                client_id,
                client_secret,
            },
            &code,
            &redirect_uri,
        )
        .await?;

    let token = create_session_token(&profile, &state.config.session_signing_key)
        .map_err(|e| AppError::SignInFailed(anyhow::anyhow!("Session creation failed: {}", e)))?;

    let secure = state.config.frontend_is_https();
    let jar = jar
        .add(session_cookie(token, secure))
        .add(state_cookie_removal(secure));

    Ok((jar, Json(profile)))
}

/// Current user response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub user: Option<ResolvedProfile>,
    /// Initials avatar for when `profileImageUrl` fails to load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_fallback_url: Option<String>,
}

/// Get the signed-in user, verified from the session token.
async fn current_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Json<CurrentUserResponse> {
    let user = current_session(&jar, &headers, &state.config.session_signing_key)
        .map(|session| session.profile);
    let avatar_fallback_url = user
        .as_ref()
        .map(|u| generate_avatar(&u.username, HEADER_AVATAR_SIZE));

    Json(CurrentUserResponse {
        user,
        avatar_fallback_url,
    })
}

/// Sign out - expire the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar.add(session_cookie_removal(state.config.frontend_is_https()));
    (StatusCode::NO_CONTENT, jar)
}
