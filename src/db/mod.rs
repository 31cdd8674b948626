//! Persistence layer.
//!
//! Handlers talk to an `Arc<dyn Storage>` chosen once at startup by
//! [`connect`]; nothing downstream knows which backend is in use.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStorage;
pub use memory::MemoryStorage;

use crate::config::{Config, StorageBackend};
use crate::models::{
    ChatMessage, CommunityStats, NewChatMessage, NewTradeAd, NewTradingItem, NewUser, TradeAd,
    TradingItem, User,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TRADING_ITEMS: &str = "trading_items";
    pub const TRADE_ADS: &str = "trade_ads";
    pub const CHAT_MESSAGES: &str = "chat_messages";
    /// Numeric ID sequences, one document per collection
    pub const COUNTERS: &str = "counters";
}

/// Storage errors. Never surfaced verbatim to API clients.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The persistence interface for users, catalog, trade ads and chat.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Create a user; fails with [`StorageError::AlreadyExists`] when the
    /// username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    async fn get_all_trading_items(&self) -> Result<Vec<TradingItem>, StorageError>;

    async fn get_trading_item(&self, id: i64) -> Result<Option<TradingItem>, StorageError>;

    async fn create_trading_item(&self, item: NewTradingItem) -> Result<TradingItem, StorageError>;

    /// All trade ads, newest first.
    async fn get_all_trade_ads(&self) -> Result<Vec<TradeAd>, StorageError>;

    async fn get_trade_ad(&self, id: i64) -> Result<Option<TradeAd>, StorageError>;

    async fn create_trade_ad(
        &self,
        ad: NewTradeAd,
        user_id: Option<i64>,
    ) -> Result<TradeAd, StorageError>;

    /// Messages for one trade ad, oldest first.
    async fn get_chat_messages_by_trade_ad(
        &self,
        trade_ad_id: i64,
    ) -> Result<Vec<ChatMessage>, StorageError>;

    async fn create_chat_message(
        &self,
        message: NewChatMessage,
        user_id: Option<i64>,
    ) -> Result<ChatMessage, StorageError>;

    async fn get_community_stats(&self) -> Result<CommunityStats, StorageError>;
}

/// Build the storage backend named by the configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn Storage>, StorageError> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage with sample catalog");
            Ok(Arc::new(MemoryStorage::with_sample_catalog()))
        }
        StorageBackend::Firestore => {
            let storage = FirestoreStorage::new(&config.gcp_project_id).await?;
            Ok(Arc::new(storage))
        }
    }
}
