//! Chat message attached to a trade ad.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Stored chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct ChatMessage {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub user_id: Option<i64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub trade_ad_id: i64,
    pub message: String,
    pub created_at: String,
}

/// Request body for posting a chat message.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    pub trade_ad_id: i64,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}

impl NewChatMessage {
    pub fn into_message(self, id: i64, user_id: Option<i64>, created_at: String) -> ChatMessage {
        ChatMessage {
            id,
            user_id,
            trade_ad_id: self.trade_ad_id,
            message: self.message,
            created_at,
        }
    }
}
