// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore storage backend.
//!
//! Provides typed operations for:
//! - Users (document ID = username, which enforces uniqueness)
//! - Trading items, trade ads and chat messages (document ID = numeric id)
//! - Counters (one sequence document per collection)

use super::{collections, Storage, StorageError};
use crate::models::{
    ChatMessage, CommunityStats, NewChatMessage, NewTradeAd, NewTradingItem, NewUser, TradeAd,
    TradeAdStatus, TradingItem, User,
};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreConsistencySelector;
use serde::{Deserialize, Serialize};

/// Sequence document stored at `counters/{collection}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Counter {
    value: i64,
}

fn backend_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// Map an insert failure; an existing document ID is a conflict, not an outage.
fn insert_err(e: FirestoreError, what: &str) -> StorageError {
    match e {
        FirestoreError::DataConflictError(_) => StorageError::AlreadyExists(what.to_string()),
        other => backend_err(other),
    }
}

/// Firestore-backed storage.
#[derive(Clone)]
pub struct FirestoreStorage {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStorage {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StorageError> {
        // The emulator needs an unauthenticated connection
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StorageError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StorageError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StorageError> {
        self.client.as_ref().ok_or_else(|| {
            StorageError::Backend("Database not connected (offline mode)".to_string())
        })
    }

    /// Allocate the next numeric ID for `collection` from its counter
    /// document.
    async fn next_id(&self, collection: &str) -> Result<i64, StorageError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to begin transaction: {}", e)))?;

        // Reads tied to the transaction so concurrent allocations conflict
        let current: Option<Counter> = client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::COUNTERS)
            .obj()
            .one(collection)
            .await
            .map_err(|e| {
                StorageError::Backend(format!("Failed to read counter in transaction: {}", e))
            })?;

        let next = Counter {
            value: current.unwrap_or_default().value + 1,
        };

        client
            .fluent()
            .update()
            .in_col(collections::COUNTERS)
            .document_id(collection)
            .object(&next)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StorageError::Backend(format!("Failed to add counter to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| StorageError::Backend(format!("Counter commit failed: {}", e)))?;

        Ok(next.value)
    }

    /// Insert a new document, failing if the ID is already taken.
    async fn insert<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<(), StorageError>
    where
        T: Serialize + for<'de> Deserialize<'de> + Send + Sync,
    {
        let _: T = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| insert_err(e, &format!("{}/{}", collection, doc_id)))?;
        Ok(())
    }

    async fn get_by_id<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, StorageError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(backend_err)
    }

    async fn list_all<T>(&self, collection: &str) -> Result<Vec<T>, StorageError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(backend_err)
    }
}

#[async_trait]
impl Storage for FirestoreStorage {
    // ─── User Operations ─────────────────────────────────────────

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        self.get_by_id(collections::USERS, username).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        if self.find_user_by_username(&user.username).await?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "User {}",
                user.username
            )));
        }

        let id = self.next_id(collections::USERS).await?;
        let stored = user.into_user(id, now_rfc3339());
        self.insert(collections::USERS, &stored.username, &stored)
            .await?;
        Ok(stored)
    }

    // ─── Catalog Operations ──────────────────────────────────────

    async fn get_all_trading_items(&self) -> Result<Vec<TradingItem>, StorageError> {
        let mut items: Vec<TradingItem> = self.list_all(collections::TRADING_ITEMS).await?;
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    async fn get_trading_item(&self, id: i64) -> Result<Option<TradingItem>, StorageError> {
        self.get_by_id(collections::TRADING_ITEMS, &id.to_string())
            .await
    }

    async fn create_trading_item(&self, item: NewTradingItem) -> Result<TradingItem, StorageError> {
        let id = self.next_id(collections::TRADING_ITEMS).await?;
        let stored = item.into_item(id, now_rfc3339());
        self.insert(collections::TRADING_ITEMS, &id.to_string(), &stored)
            .await?;
        Ok(stored)
    }

    // ─── Trade Ad Operations ─────────────────────────────────────

    async fn get_all_trade_ads(&self) -> Result<Vec<TradeAd>, StorageError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRADE_ADS)
            .order_by([("id", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(backend_err)
    }

    async fn get_trade_ad(&self, id: i64) -> Result<Option<TradeAd>, StorageError> {
        self.get_by_id(collections::TRADE_ADS, &id.to_string()).await
    }

    async fn create_trade_ad(
        &self,
        ad: NewTradeAd,
        user_id: Option<i64>,
    ) -> Result<TradeAd, StorageError> {
        let id = self.next_id(collections::TRADE_ADS).await?;
        let stored = ad.into_trade_ad(id, user_id, now_rfc3339());
        self.insert(collections::TRADE_ADS, &id.to_string(), &stored)
            .await?;
        Ok(stored)
    }

    // ─── Chat Operations ─────────────────────────────────────────

    async fn get_chat_messages_by_trade_ad(
        &self,
        trade_ad_id: i64,
    ) -> Result<Vec<ChatMessage>, StorageError> {
        let mut messages: Vec<ChatMessage> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CHAT_MESSAGES)
            .filter(move |q| q.for_all([q.field("tradeAdId").eq(trade_ad_id)]))
            .obj()
            .query()
            .await
            .map_err(backend_err)?;
        // Sorted here to avoid a composite index on (tradeAdId, id)
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    async fn create_chat_message(
        &self,
        message: NewChatMessage,
        user_id: Option<i64>,
    ) -> Result<ChatMessage, StorageError> {
        if self.get_trade_ad(message.trade_ad_id).await?.is_none() {
            return Err(StorageError::NotFound(format!(
                "Trade ad {} not found",
                message.trade_ad_id
            )));
        }

        let id = self.next_id(collections::CHAT_MESSAGES).await?;
        let stored = message.into_message(id, user_id, now_rfc3339());
        self.insert(collections::CHAT_MESSAGES, &id.to_string(), &stored)
            .await?;
        Ok(stored)
    }

    async fn get_community_stats(&self) -> Result<CommunityStats, StorageError> {
        let users: Vec<User> = self.list_all(collections::USERS).await?;
        let items: Vec<TradingItem> = self.list_all(collections::TRADING_ITEMS).await?;
        let ads: Vec<TradeAd> = self.list_all(collections::TRADE_ADS).await?;
        let messages: Vec<ChatMessage> = self.list_all(collections::CHAT_MESSAGES).await?;

        Ok(CommunityStats {
            total_users: users.len() as u64,
            total_trading_items: items.len() as u64,
            active_trade_ads: ads
                .iter()
                .filter(|a| a.status == TradeAdStatus::Active)
                .count() as u64,
            total_messages: messages.len() as u64,
        })
    }
}
