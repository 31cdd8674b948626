// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trading Hub: a marketplace for tradable in-game items
//!
//! This crate provides the backend API: the item catalog, the trade-ad
//! board with per-ad chat, and Roblox OAuth sign-in with server-issued
//! sessions.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Storage;
use services::{ImageProxy, LoginService, RobloxClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub login_service: LoginService,
    pub image_proxy: ImageProxy,
}

impl AppState {
    /// Wire up services for the given configuration and storage backend.
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Result<Self, reqwest::Error> {
        let roblox = RobloxClient::new(
            config.roblox_oauth_base_url.clone(),
            config.roblox_thumbnails_base_url.clone(),
            config.upstream_timeout,
        )?;
        let login_service = LoginService::new(roblox, storage.clone());
        let image_proxy = ImageProxy::new(config.upstream_timeout)?;

        Ok(Self {
            config,
            storage,
            login_service,
            image_proxy,
        })
    }
}
