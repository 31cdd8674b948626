// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tokens and authentication middleware.
//!
//! A session is an HS256 JWT issued at the end of a successful sign-in. It
//! carries the resolved profile, so verifying it is enough to know who the
//! caller is; clients never assert their own identity.

use crate::error::AppError;
use crate::models::ResolvedProfile;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// HttpOnly cookie carrying the session JWT.
pub const SESSION_COOKIE: &str = "trading_hub_session";
/// HttpOnly cookie carrying the OAuth state for the pending sign-in.
pub const STATE_COOKIE: &str = "trading_hub_oauth_state";
/// The state cookie is only sent to the callback.
pub const STATE_COOKIE_PATH: &str = "/api/auth/roblox/callback";

const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const STATE_TTL_SECS: i64 = 10 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (Roblox user ID)
    pub sub: String,
    pub username: String,
    pub display_name: String,
    pub picture: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from a verified session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub profile: ResolvedProfile,
}

/// Create a JWT for a user session.
pub fn create_session_token(profile: &ResolvedProfile, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: profile.id.to_string(),
        username: profile.username.clone(),
        display_name: profile.display_name.clone(),
        picture: profile.profile_image_url.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session JWT and recover the profile it was issued for.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Option<SessionUser> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<Claims>(token, &key, &validation).ok()?.claims;
    let id = claims.sub.parse().ok()?;

    Some(SessionUser {
        profile: ResolvedProfile {
            id,
            username: claims.username,
            display_name: claims.display_name,
            profile_image_url: claims.picture,
        },
    })
}

/// Find the session token in the cookie jar, then the Authorization header.
fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Resolve the caller's session, if any.
pub fn current_session(
    jar: &CookieJar,
    headers: &HeaderMap,
    signing_key: &[u8],
) -> Option<SessionUser> {
    let token = session_token(jar, headers)?;
    verify_session_token(&token, signing_key)
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = current_session(&jar, request.headers(), &state.config.session_signing_key)
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

// ─── Cookies ─────────────────────────────────────────────────

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

pub fn session_cookie_removal(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

pub fn state_cookie(state: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, state))
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(STATE_TTL_SECS))
        .build()
}

pub fn state_cookie_removal(secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, ""))
        .path(STATE_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}
