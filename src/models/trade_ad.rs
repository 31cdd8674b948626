// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trade advertisement posted on the board.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub enum TradeAdStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

/// Stored trade ad.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct TradeAd {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    /// Local user who posted the ad, when known
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub offering_items: Vec<String>,
    pub wanting_items: Vec<String>,
    #[serde(default)]
    pub status: TradeAdStatus,
    pub created_at: String,
}

/// Request body for posting a trade ad.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTradeAd {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub offering_items: Vec<String>,
    #[validate(length(min = 1, max = 20))]
    pub wanting_items: Vec<String>,
    #[serde(default)]
    pub status: Option<TradeAdStatus>,
}

impl NewTradeAd {
    pub fn into_trade_ad(self, id: i64, user_id: Option<i64>, created_at: String) -> TradeAd {
        TradeAd {
            id,
            user_id,
            title: self.title,
            description: self.description,
            offering_items: self.offering_items,
            wanting_items: self.wanting_items,
            status: self.status.unwrap_or_default(),
            created_at,
        }
    }
}
