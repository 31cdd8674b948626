// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized profile returned by a successful Roblox sign-in.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The externally visible result of a sign-in.
///
/// `id` is always the provider's subject claim parsed as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/lib/generated/")
)]
pub struct ResolvedProfile {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub profile_image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_wire_names() {
        let profile = ResolvedProfile {
            id: 555,
            username: "Neo".to_string(),
            display_name: "Neo Anderson".to_string(),
            profile_image_url: "https://x/y.png".to_string(),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 555,
                "username": "Neo",
                "displayName": "Neo Anderson",
                "profileImageUrl": "https://x/y.png"
            })
        );
    }
}
