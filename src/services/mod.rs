// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod avatar;
pub mod image_proxy;
pub mod login;
pub mod oauth_state;
pub mod roblox;

pub use avatar::generate_avatar;
pub use image_proxy::ImageProxy;
pub use login::{ClientCredentials, LoginService};
pub use roblox::RobloxClient;
