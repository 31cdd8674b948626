// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

const STATIC_HEADERS: &[(&str, &str)] = &[
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    (
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains",
    ),
    (
        "Content-Security-Policy",
        "default-src 'none'; img-src 'self'; frame-ancestors 'none'",
    ),
    ("Referrer-Policy", "no-referrer"),
];

/// Add security headers to all responses.
///
/// Auth responses carry profiles and session cookies, so they are also
/// marked uncacheable.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let is_auth = req.uri().path().starts_with("/api/auth/") || req.uri().path().starts_with("/auth/");

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in STATIC_HEADERS {
        headers.insert(*name, HeaderValue::from_static(value));
    }

    if is_auth {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    response
}
