// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed OAuth `state` tokens.
//!
//! A state token binds one sign-in attempt to the frontend origin that
//! started it. Format before base64url encoding:
//!
//! ```text
//! origin|nonce_hex|issued_ms_hex|hmac_sha256_hex
//! ```
//!
//! The nonce is 128 bits from the system CSPRNG. The callback verifies the
//! MAC and age, and recovers the origin so the token-exchange redirect URI
//! matches the authorization request byte for byte.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How long a sign-in attempt may take before its state expires.
pub const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

const NONCE_LEN: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state is not valid base64url")]
    Encoding,
    #[error("state is malformed")]
    Malformed,
    #[error("state signature mismatch")]
    Signature,
    #[error("state expired")]
    Expired,
    #[error("state does not match the one issued to this browser")]
    Mismatch,
    #[error("random source unavailable")]
    Rng,
    #[error("invalid HMAC key")]
    Key,
}

/// A verified state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedState {
    /// Frontend origin captured when the sign-in started
    pub origin: String,
    pub issued_at_ms: u128,
}

fn mac_for(key: &[u8], payload: &str) -> Result<HmacSha256, StateError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| StateError::Key)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Issue a new state token for `origin`.
pub fn issue_state(key: &[u8], origin: &str, now_ms: u128) -> Result<String, StateError> {
    let mut nonce = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| StateError::Rng)?;

    let payload = format!("{}|{}|{:x}", origin, hex::encode(nonce), now_ms);
    let signature = mac_for(key, &payload)?.finalize().into_bytes();
    let signed = format!("{}|{}", payload, hex::encode(signature));

    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify a state token's signature and age.
pub fn verify_state(key: &[u8], state: &str, now_ms: u128) -> Result<VerifiedState, StateError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(state)
        .map_err(|_| StateError::Encoding)?;
    let decoded = String::from_utf8(bytes).map_err(|_| StateError::Encoding)?;

    // Split from the right so the origin is whatever remains
    let mut parts = decoded.rsplitn(4, '|');
    let (Some(signature_hex), Some(issued_hex), Some(nonce_hex), Some(origin)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(StateError::Malformed);
    };

    if origin.is_empty() || nonce_hex.len() != NONCE_LEN * 2 {
        return Err(StateError::Malformed);
    }

    let signature = hex::decode(signature_hex).map_err(|_| StateError::Malformed)?;
    let payload = format!("{}|{}|{}", origin, nonce_hex, issued_hex);
    mac_for(key, &payload)?
        .verify_slice(&signature)
        .map_err(|_| StateError::Signature)?;

    let issued_at_ms = u128::from_str_radix(issued_hex, 16).map_err(|_| StateError::Malformed)?;
    if now_ms.saturating_sub(issued_at_ms) > STATE_MAX_AGE_MS {
        return Err(StateError::Expired);
    }

    Ok(VerifiedState {
        origin: origin.to_string(),
        issued_at_ms,
    })
}

/// Verify a returned state against the copy stored in the browser cookie.
pub fn verify_returned_state(
    key: &[u8],
    returned: &str,
    stored: Option<&str>,
    now_ms: u128,
) -> Result<VerifiedState, StateError> {
    let stored = stored.ok_or(StateError::Mismatch)?;
    if !bool::from(returned.as_bytes().ct_eq(stored.as_bytes())) {
        return Err(StateError::Mismatch);
    }
    verify_state(key, returned, now_ms)
}
