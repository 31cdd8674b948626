// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trading item catalog routes.

use crate::error::{AppError, Result};
use crate::middleware::{require_auth, SessionUser};
use crate::models::{NewTradingItem, TradingItem};
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
    Router::new()
        .route(
            "/api/trading-items",
            get(list_items).merge(
                post(create_item).route_layer(from_fn_with_state(state.clone(), require_auth)),
            ),
        )
        .route("/api/trading-items/{id}", get(get_item))
}

/// List tradeable catalog items.
async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TradingItem>>> {
    let items = state
        .storage
        .get_all_trading_items()
        .await?
        .into_iter()
        .filter(TradingItem::is_tradeable)
        .collect();
    Ok(Json(items))
}

/// Get one catalog item.
async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TradingItem>> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid trading item id".to_string()))?;

    let item = state
        .storage
        .get_trading_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Trading item not found".to_string()))?;

    Ok(Json(item))
}

/// Add an item to the catalog.
async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(new_item): ValidatedJson<NewTradingItem>,
) -> Result<(StatusCode, Json<TradingItem>)> {
    let item = state.storage.create_trading_item(new_item).await?;

    tracing::info!(
        item_id = item.id,
        name = %item.name,
        by = %user.profile.username,
        "Trading item created"
    );

    Ok((StatusCode::CREATED, Json(item)))
}
