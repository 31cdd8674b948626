// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Tradable catalog item with price history.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Stored catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct TradingItem {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub name: String,
    /// "crop", "gear", "egg", ...
    #[serde(rename = "type")]
    pub item_type: String,
    /// "common" through "legendary" and beyond
    pub rarity: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub current_value: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub previous_value: Option<i64>,
    pub change_percent: Option<String>,
    pub image_url: Option<String>,
    /// Items explicitly marked `false` are hidden from the catalog.
    pub tradeable: Option<bool>,
    pub updated_at: String,
}

impl TradingItem {
    pub fn is_tradeable(&self) -> bool {
        self.tradeable != Some(false)
    }
}

/// Request body for creating a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTradingItem {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub item_type: String,
    #[validate(length(min = 1, max = 50))]
    pub rarity: String,
    #[validate(range(min = 0))]
    pub current_value: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub previous_value: Option<i64>,
    #[serde(default)]
    pub change_percent: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tradeable: Option<bool>,
}

impl NewTradingItem {
    pub fn into_item(self, id: i64, updated_at: String) -> TradingItem {
        TradingItem {
            id,
            name: self.name,
            item_type: self.item_type,
            rarity: self.rarity,
            current_value: self.current_value,
            previous_value: self.previous_value,
            change_percent: self.change_percent,
            image_url: self.image_url,
            tradeable: Some(self.tradeable.unwrap_or(true)),
            updated_at,
        }
    }
}
