// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors that reject with `AppError` JSON bodies.

use crate::error::AppError;
use axum::body::Body;
use axum::extract::{FromRequest, Json};
use axum::http::Request;
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that is deserialized and then validated.
///
/// Malformed bodies and failed validation both become 400 responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}
