// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image proxy route for item artwork hosted off-site.

use crate::services::image_proxy::ProxyError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/image-proxy", get(proxy_image))
}

#[derive(Deserialize)]
pub struct ProxyParams {
    #[serde(default)]
    url: Option<String>,
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Fetch an allowed image and relay it with a day of caching.
async fn proxy_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
) -> Response {
    let Some(url) = params.url else {
        return json_error(StatusCode::BAD_REQUEST, "Invalid image URL");
    };

    match state.image_proxy.fetch(&url).await {
        Ok(image) => {
            let content_type = HeaderValue::from_str(&image.content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("image/png"));
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (
                        header::CACHE_CONTROL,
                        HeaderValue::from_static("public, max-age=86400"),
                    ),
                    (
                        header::ACCESS_CONTROL_ALLOW_ORIGIN,
                        HeaderValue::from_static("*"),
                    ),
                ],
                image.bytes,
            )
                .into_response()
        }
        Err(ProxyError::Disallowed) => json_error(StatusCode::BAD_REQUEST, "Invalid image URL"),
        Err(ProxyError::NotFound(status)) => {
            tracing::debug!(status = %status, url = %url, "Proxied image not found");
            json_error(StatusCode::NOT_FOUND, "Image not found")
        }
        Err(e) => {
            tracing::error!(error = %e, url = %url, "Image proxy error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to proxy image")
        }
    }
}
