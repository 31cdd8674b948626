// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test harness: app construction and a fake Roblox provider.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trading_hub::config::Config;
use trading_hub::db::{MemoryStorage, Storage, StorageError};
use trading_hub::middleware::auth::{create_session_token, STATE_COOKIE};
use trading_hub::models::{
    ChatMessage, CommunityStats, NewChatMessage, NewTradeAd, NewTradingItem, NewUser,
    ResolvedProfile, TradeAd, TradingItem, User,
};
use trading_hub::routes::create_router;
use trading_hub::services::oauth_state::issue_state;
use trading_hub::time_utils::unix_millis;
use trading_hub::AppState;

pub const VALID_CODE: &str = "abc123";
pub const ACCESS_TOKEN: &str = "tok1";
pub const TEST_ORIGIN: &str = "http://localhost:5000";

// ─── Fake Provider ───────────────────────────────────────────

/// How the fake thumbnail endpoint answers.
#[derive(Clone, Debug)]
pub enum AvatarBehavior {
    Image(String),
    Status(u16),
    Malformed,
    MissingImageUrl,
    Hang,
}

#[derive(Clone, Debug)]
pub struct ProviderBehavior {
    pub token_status: Option<u16>,
    pub userinfo_status: Option<u16>,
    pub claims: Value,
    pub avatar: AvatarBehavior,
}

impl Default for ProviderBehavior {
    fn default() -> Self {
        Self {
            token_status: None,
            userinfo_status: None,
            claims: json!({
                "sub": "555",
                "preferred_username": "Neo",
                "name": "Neo Anderson"
            }),
            avatar: AvatarBehavior::Image("https://x/y.png".to_string()),
        }
    }
}

/// Call counters and captured requests.
#[derive(Default)]
pub struct ProviderLog {
    pub token_calls: AtomicUsize,
    pub userinfo_calls: AtomicUsize,
    pub avatar_calls: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub avatar_queries: Mutex<Vec<HashMap<String, String>>>,
    used_codes: Mutex<HashSet<String>>,
}

impl ProviderLog {
    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn userinfo_calls(&self) -> usize {
        self.userinfo_calls.load(Ordering::SeqCst)
    }

    pub fn avatar_calls(&self) -> usize {
        self.avatar_calls.load(Ordering::SeqCst)
    }

    pub fn last_token_form(&self) -> HashMap<String, String> {
        self.token_forms
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no token request recorded")
    }
}

#[derive(Clone)]
struct ProviderState {
    behavior: ProviderBehavior,
    log: Arc<ProviderLog>,
}

/// A fake Roblox OAuth + thumbnails server on a random local port.
pub struct FakeRoblox {
    pub base_url: String,
    pub log: Arc<ProviderLog>,
}

impl FakeRoblox {
    pub async fn start(behavior: ProviderBehavior) -> Self {
        let log = Arc::new(ProviderLog::default());
        let state = ProviderState {
            behavior,
            log: log.clone(),
        };

        let app = Router::new()
            .route("/oauth/v1/token", post(fake_token))
            .route("/oauth/v1/userinfo", get(fake_userinfo))
            .route("/v1/users/avatar-headshot", get(fake_avatar))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake provider");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            log,
        }
    }

    /// Test config pointed at this provider.
    pub fn config(&self) -> Config {
        let mut config = Config::test_default();
        config.roblox_oauth_base_url = format!("{}/oauth/v1", self.base_url);
        config.roblox_thumbnails_base_url = format!("{}/v1", self.base_url);
        config.upstream_timeout = Duration::from_secs(2);
        config
    }
}

async fn fake_token(
    State(state): State<ProviderState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.log.token_calls.fetch_add(1, Ordering::SeqCst);
    state.log.token_forms.lock().unwrap().push(form.clone());

    if let Some(status) = state.behavior.token_status {
        return (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({ "error": "server_error" })),
        )
            .into_response();
    }

    let credentials_ok = form.get("client_id").map(String::as_str) == Some("test_client_id")
        && form.get("client_secret").map(String::as_str) == Some("test_secret")
        && form.get("grant_type").map(String::as_str) == Some("authorization_code");

    let code = form.get("code").cloned().unwrap_or_default();
    // Codes are single use
    let code_ok = code == VALID_CODE && state.log.used_codes.lock().unwrap().insert(code);

    if !credentials_ok || !code_ok {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 900,
        "id_token": "ignored"
    }))
    .into_response()
}

async fn fake_userinfo(State(state): State<ProviderState>, headers: HeaderMap) -> Response {
    state.log.userinfo_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(status) = state.behavior.userinfo_status {
        return StatusCode::from_u16(status).unwrap().into_response();
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        == Some(&format!("Bearer {}", ACCESS_TOKEN));
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(state.behavior.claims.clone()).into_response()
}

async fn fake_avatar(
    State(state): State<ProviderState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.log.avatar_calls.fetch_add(1, Ordering::SeqCst);
    state.log.avatar_queries.lock().unwrap().push(query);

    match &state.behavior.avatar {
        AvatarBehavior::Image(url) => Json(json!({
            "data": [{ "targetId": 555, "state": "Completed", "imageUrl": url }]
        }))
        .into_response(),
        AvatarBehavior::Status(status) => StatusCode::from_u16(*status).unwrap().into_response(),
        AvatarBehavior::Malformed => (
            [(header::CONTENT_TYPE, "application/json")],
            "{not json",
        )
            .into_response(),
        AvatarBehavior::MissingImageUrl => {
            Json(json!({ "data": [{ "targetId": 555, "state": "Pending" }] })).into_response()
        }
        AvatarBehavior::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK.into_response()
        }
    }
}

// ─── Failing Storage ─────────────────────────────────────────

/// Storage whose every operation fails.
pub struct FailingStorage;

fn down() -> StorageError {
    StorageError::Backend("database unavailable".to_string())
}

#[async_trait]
impl Storage for FailingStorage {
    async fn find_user_by_username(&self, _: &str) -> Result<Option<User>, StorageError> {
        Err(down())
    }
    async fn create_user(&self, _: NewUser) -> Result<User, StorageError> {
        Err(down())
    }
    async fn get_all_trading_items(&self) -> Result<Vec<TradingItem>, StorageError> {
        Err(down())
    }
    async fn get_trading_item(&self, _: i64) -> Result<Option<TradingItem>, StorageError> {
        Err(down())
    }
    async fn create_trading_item(&self, _: NewTradingItem) -> Result<TradingItem, StorageError> {
        Err(down())
    }
    async fn get_all_trade_ads(&self) -> Result<Vec<TradeAd>, StorageError> {
        Err(down())
    }
    async fn get_trade_ad(&self, _: i64) -> Result<Option<TradeAd>, StorageError> {
        Err(down())
    }
    async fn create_trade_ad(&self, _: NewTradeAd, _: Option<i64>) -> Result<TradeAd, StorageError> {
        Err(down())
    }
    async fn get_chat_messages_by_trade_ad(&self, _: i64) -> Result<Vec<ChatMessage>, StorageError> {
        Err(down())
    }
    async fn create_chat_message(
        &self,
        _: NewChatMessage,
        _: Option<i64>,
    ) -> Result<ChatMessage, StorageError> {
        Err(down())
    }
    async fn get_community_stats(&self) -> Result<CommunityStats, StorageError> {
        Err(down())
    }
}

// ─── App Helpers ─────────────────────────────────────────────

/// Create a test app over the given config and storage.
pub fn create_test_app_with(
    config: Config,
    storage: Arc<dyn Storage>,
) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, storage).expect("build app state"));
    (create_router(state.clone()), state)
}

/// Create a test app with default config and in-memory storage.
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Arc::new(MemoryStorage::new()))
}

/// Issue a state token as the start endpoint would for `origin`.
pub fn issue_test_state(config: &Config, origin: &str) -> String {
    issue_state(&config.oauth_state_key, origin, unix_millis()).unwrap()
}

/// Build a callback POST carrying the state cookie.
pub fn callback_request(body: Value, state_cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/auth/roblox/callback")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(state) = state_cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", STATE_COOKIE, state));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A complete, correctly bound callback request for `code`.
pub fn signed_callback_request(config: &Config, code: &str) -> Request<Body> {
    let state = issue_test_state(config, TEST_ORIGIN);
    callback_request(json!({ "code": code, "state": state }), Some(&state))
}

/// Create a session JWT for a test profile.
pub fn create_test_session(config: &Config, username: &str) -> String {
    let profile = ResolvedProfile {
        id: 555,
        username: username.to_string(),
        display_name: username.to_string(),
        profile_image_url: "https://x/y.png".to_string(),
    };
    create_session_token(&profile, &config.session_signing_key).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

pub fn find_cookie(headers: &[String], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
}
