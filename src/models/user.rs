//! Local user record for storage.

use serde::{Deserialize, Serialize};

/// Password placeholder stored for accounts created through Roblox sign-in.
///
/// Such accounts never authenticate with a password.
pub const OAUTH_PASSWORD_SENTINEL: &str = "oauth_user";

/// Local user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Local numeric ID (not the Roblox subject)
    pub id: i64,
    /// Unique username (also the Firestore document ID)
    pub username: String,
    /// Never a real credential for Roblox accounts
    pub password: String,
    pub roblox_username: Option<String>,
    pub discord_username: Option<String>,
    #[serde(default)]
    pub reputation: i32,
    /// When the user was created (RFC 3339)
    pub created_at: String,
}

/// Fields needed to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub roblox_username: Option<String>,
    pub discord_username: Option<String>,
    pub reputation: i32,
}

impl NewUser {
    /// Local record for a user who signed in with Roblox.
    pub fn from_roblox(username: &str) -> Self {
        Self {
            username: username.to_string(),
            password: OAUTH_PASSWORD_SENTINEL.to_string(),
            roblox_username: Some(username.to_string()),
            discord_username: None,
            reputation: 0,
        }
    }

    /// Materialize into a stored record.
    pub fn into_user(self, id: i64, created_at: String) -> User {
        User {
            id,
            username: self.username,
            password: self.password,
            roblox_username: self.roblox_username,
            discord_username: self.discord_username,
            reputation: self.reputation,
            created_at,
        }
    }
}
