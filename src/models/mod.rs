// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod chat;
pub mod profile;
pub mod stats;
pub mod trade_ad;
pub mod trading_item;
pub mod user;

pub use chat::{ChatMessage, NewChatMessage};
pub use profile::ResolvedProfile;
pub use stats::CommunityStats;
pub use trade_ad::{NewTradeAd, TradeAd, TradeAdStatus};
pub use trading_item::{NewTradingItem, TradingItem};
pub use user::{NewUser, User};
