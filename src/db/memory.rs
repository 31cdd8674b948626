// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory storage backend.
//!
//! Used for local development and tests. Data lives for the lifetime of
//! the process.

use super::{Storage, StorageError};
use crate::models::{
    ChatMessage, CommunityStats, NewChatMessage, NewTradeAd, NewTradingItem, NewUser, TradeAd,
    TradeAdStatus, TradingItem, User,
};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory storage backed by concurrent maps.
#[derive(Default)]
pub struct MemoryStorage {
    /// Keyed by username (the uniqueness constraint)
    users: DashMap<String, User>,
    trading_items: DashMap<i64, TradingItem>,
    trade_ads: DashMap<i64, TradeAd>,
    chat_messages: DashMap<i64, ChatMessage>,
    user_seq: AtomicI64,
    item_seq: AtomicI64,
    ad_seq: AtomicI64,
    message_seq: AtomicI64,
}

fn next_id(seq: &AtomicI64) -> i64 {
    seq.fetch_add(1, Ordering::Relaxed) + 1
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a few catalog items so the board is
    /// usable without a database.
    pub fn with_sample_catalog() -> Self {
        let storage = Self::new();
        let now = now_rfc3339();

        let samples = [
            ("Candy Blossom", "crop", "divine", 1200, Some(1000)),
            ("Dragon Fruit", "crop", "mythical", 850, Some(900)),
            ("Master Sprinkler", "gear", "mythical", 600, None),
            ("Bug Egg", "egg", "divine", 400, Some(350)),
            ("Raccoon", "pet", "prismatic", 5000, Some(4500)),
        ];

        for (name, item_type, rarity, current, previous) in samples {
            let id = next_id(&storage.item_seq);
            let new_item = NewTradingItem {
                name: name.to_string(),
                item_type: item_type.to_string(),
                rarity: rarity.to_string(),
                current_value: current,
                previous_value: previous,
                change_percent: previous.map(|p| change_percent(p, current)),
                image_url: None,
                tradeable: Some(true),
            };
            storage
                .trading_items
                .insert(id, new_item.into_item(id, now.clone()));
        }

        storage
    }
}

/// Signed percentage change, e.g. "+20.0%".
fn change_percent(previous: i64, current: i64) -> String {
    if previous == 0 {
        return "0.0%".to_string();
    }
    let pct = (current - previous) as f64 / previous as f64 * 100.0;
    format!("{:+.1}%", pct)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(username).map(|u| u.clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists(format!(
                "User {}",
                user.username
            ))),
            Entry::Vacant(slot) => {
                let id = next_id(&self.user_seq);
                let stored = user.into_user(id, now_rfc3339());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn get_all_trading_items(&self) -> Result<Vec<TradingItem>, StorageError> {
        let mut items: Vec<TradingItem> = self.trading_items.iter().map(|e| e.clone()).collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn get_trading_item(&self, id: i64) -> Result<Option<TradingItem>, StorageError> {
        Ok(self.trading_items.get(&id).map(|i| i.clone()))
    }

    async fn create_trading_item(&self, item: NewTradingItem) -> Result<TradingItem, StorageError> {
        let id = next_id(&self.item_seq);
        let stored = item.into_item(id, now_rfc3339());
        self.trading_items.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_all_trade_ads(&self) -> Result<Vec<TradeAd>, StorageError> {
        let mut ads: Vec<TradeAd> = self.trade_ads.iter().map(|e| e.clone()).collect();
        // IDs are monotonic, so they order by creation
        ads.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(ads)
    }

    async fn get_trade_ad(&self, id: i64) -> Result<Option<TradeAd>, StorageError> {
        Ok(self.trade_ads.get(&id).map(|a| a.clone()))
    }

    async fn create_trade_ad(
        &self,
        ad: NewTradeAd,
        user_id: Option<i64>,
    ) -> Result<TradeAd, StorageError> {
        let id = next_id(&self.ad_seq);
        let stored = ad.into_trade_ad(id, user_id, now_rfc3339());
        self.trade_ads.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_chat_messages_by_trade_ad(
        &self,
        trade_ad_id: i64,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let mut messages: Vec<ChatMessage> = self
            .chat_messages
            .iter()
            .filter(|m| m.trade_ad_id == trade_ad_id)
            .map(|m| m.clone())
            .collect();
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    async fn create_chat_message(
        &self,
        message: NewChatMessage,
        user_id: Option<i64>,
    ) -> Result<ChatMessage, StorageError> {
        if !self.trade_ads.contains_key(&message.trade_ad_id) {
            return Err(StorageError::NotFound(format!(
                "Trade ad {} not found",
                message.trade_ad_id
            )));
        }
        let id = next_id(&self.message_seq);
        let stored = message.into_message(id, user_id, now_rfc3339());
        self.chat_messages.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_community_stats(&self) -> Result<CommunityStats, StorageError> {
        Ok(CommunityStats {
            total_users: self.users.len() as u64,
            total_trading_items: self.trading_items.len() as u64,
            active_trade_ads: self
                .trade_ads
                .iter()
                .filter(|a| a.status == TradeAdStatus::Active)
                .count() as u64,
            total_messages: self.chat_messages.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_ad(title: &str) -> NewTradeAd {
        NewTradeAd {
            title: title.to_string(),
            description: None,
            offering_items: vec!["Bug Egg".to_string()],
            wanting_items: vec!["Raccoon".to_string()],
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_username() {
        let storage = MemoryStorage::new();

        let first = storage.create_user(NewUser::from_roblox("Neo")).await.unwrap();
        assert_eq!(first.id, 1);

        let second = storage.create_user(NewUser::from_roblox("Neo")).await;
        assert!(matches!(second, Err(StorageError::AlreadyExists(_))));

        let found = storage.find_user_by_username("Neo").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn test_trade_ads_newest_first() {
        let storage = MemoryStorage::new();
        storage.create_trade_ad(new_ad("first"), None).await.unwrap();
        storage.create_trade_ad(new_ad("second"), Some(4)).await.unwrap();

        let ads = storage.get_all_trade_ads().await.unwrap();
        let titles: Vec<_> = ads.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        assert_eq!(ads[0].user_id, Some(4));
    }

    #[tokio::test]
    async fn test_chat_messages_require_existing_ad() {
        let storage = MemoryStorage::new();
        let orphan = NewChatMessage {
            trade_ad_id: 99,
            message: "still available?".to_string(),
        };
        assert!(matches!(
            storage.create_chat_message(orphan, None).await,
            Err(StorageError::NotFound(_))
        ));

        let ad = storage.create_trade_ad(new_ad("ad"), None).await.unwrap();
        for text in ["hi", "still available?"] {
            storage
                .create_chat_message(
                    NewChatMessage {
                        trade_ad_id: ad.id,
                        message: text.to_string(),
                    },
                    Some(1),
                )
                .await
                .unwrap();
        }

        let messages = storage.get_chat_messages_by_trade_ad(ad.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "hi");
    }

    #[tokio::test]
    async fn test_community_stats_counts() {
        let storage = MemoryStorage::with_sample_catalog();
        storage.create_user(NewUser::from_roblox("Neo")).await.unwrap();
        storage.create_trade_ad(new_ad("ad"), None).await.unwrap();

        let stats = storage.get_community_stats().await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_trading_items, 5);
        assert_eq!(stats.active_trade_ads, 1);
        assert_eq!(stats.total_messages, 0);
    }

    #[test]
    fn test_change_percent_format() {
        assert_eq!(change_percent(1000, 1200), "+20.0%");
        assert_eq!(change_percent(900, 850), "-5.6%");
        assert_eq!(change_percent(0, 10), "0.0%");
    }
}
