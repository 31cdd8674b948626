// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trade ad board and per-ad chat routes.

use crate::db::Storage;
use crate::error::{AppError, Result};
use crate::middleware::{require_auth, SessionUser};
use crate::models::{ChatMessage, NewChatMessage, NewTradeAd, TradeAd};
use crate::routes::extract::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let auth = from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route(
            "/api/trade-ads",
            get(list_trade_ads).merge(post(create_trade_ad).route_layer(auth.clone())),
        )
        .route("/api/chat-messages/{trade_ad_id}", get(list_chat_messages))
        .route(
            "/api/chat-messages",
            post(create_chat_message).route_layer(auth),
        )
}

/// Local user ID for the signed-in Roblox user, if the record exists.
async fn local_user_id(storage: &dyn Storage, user: &SessionUser) -> Result<Option<i64>> {
    Ok(storage
        .find_user_by_username(&user.profile.username)
        .await?
        .map(|u| u.id))
}

/// List all trade ads, newest first.
async fn list_trade_ads(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TradeAd>>> {
    Ok(Json(state.storage.get_all_trade_ads().await?))
}

/// Post a trade ad as the signed-in user.
async fn create_trade_ad(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(new_ad): ValidatedJson<NewTradeAd>,
) -> Result<(StatusCode, Json<TradeAd>)> {
    let user_id = local_user_id(state.storage.as_ref(), &user).await?;
    let ad = state.storage.create_trade_ad(new_ad, user_id).await?;

    tracing::info!(
        trade_ad_id = ad.id,
        roblox_id = user.profile.id,
        "Trade ad created"
    );

    Ok((StatusCode::CREATED, Json(ad)))
}

/// List the chat for one trade ad, oldest first.
async fn list_chat_messages(
    State(state): State<Arc<AppState>>,
    Path(trade_ad_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>> {
    let trade_ad_id: i64 = trade_ad_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid trade ad id".to_string()))?;

    Ok(Json(
        state
            .storage
            .get_chat_messages_by_trade_ad(trade_ad_id)
            .await?,
    ))
}

/// Post a chat message on a trade ad as the signed-in user.
async fn create_chat_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(new_message): ValidatedJson<NewChatMessage>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let user_id = local_user_id(state.storage.as_ref(), &user).await?;
    let message = state
        .storage
        .create_chat_message(new_message, user_id)
        .await?;

    tracing::debug!(
        message_id = message.id,
        trade_ad_id = message.trade_ad_id,
        "Chat message posted"
    );

    Ok((StatusCode::CREATED, Json(message)))
}
