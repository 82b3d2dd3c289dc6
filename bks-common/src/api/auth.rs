//! Shared-secret request signing for administrative endpoints
//!
//! A signed request body is a JSON object carrying `timestamp` (Unix epoch ms)
//! and `hash`. The hash is the SHA-256 hex digest of the canonical JSON of the
//! body, with `hash` replaced by 64 zeros, followed by the shared secret in
//! decimal. A shared secret of 0 disables checking.

use crate::db::settings::{get_setting, set_setting};
use crate::Result;
use chrono::Utc;
use rand::Rng;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;

/// Settings key holding the shared secret
pub const SHARED_SECRET_KEY: &str = "api_shared_secret";

/// Secret value that turns authentication off
pub const AUTH_DISABLED: i64 = 0;

/// Oldest accepted timestamp, relative to now
pub const MAX_PAST_SKEW_MS: i64 = 1000;

/// Newest accepted timestamp, relative to now (clock drift only)
pub const MAX_FUTURE_SKEW_MS: i64 = 1;

const HASH_PLACEHOLDER: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("Timestamp {age_ms}ms too old (max 1000ms past)")]
    StaleTimestamp { age_ms: i64 },

    #[error("Timestamp {ahead_ms}ms in future (max 1ms future)")]
    FutureTimestamp { ahead_ms: i64 },

    #[error("Invalid hash")]
    HashMismatch,
}

/// Load the shared secret, generating and storing a non-zero one on first use
pub async fn load_or_create_shared_secret(db: &SqlitePool) -> Result<i64> {
    if let Some(secret) = get_setting::<i64>(db, SHARED_SECRET_KEY).await? {
        return Ok(secret);
    }

    let secret = {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: i64 = rng.gen();
            if candidate != AUTH_DISABLED {
                break candidate;
            }
        }
    };

    set_setting(db, SHARED_SECRET_KEY, secret).await?;
    tracing::info!("Generated new API shared secret");
    Ok(secret)
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Check `timestamp` against the accepted window around `now`
///
/// Timestamps too far from `now` to subtract are rejected, never wrapped.
pub fn check_timestamp(timestamp: i64, now: i64) -> std::result::Result<(), SignatureError> {
    let Some(age_ms) = now.checked_sub(timestamp) else {
        return Err(if timestamp < now {
            SignatureError::StaleTimestamp { age_ms: i64::MAX }
        } else {
            SignatureError::FutureTimestamp { ahead_ms: i64::MAX }
        });
    };

    if age_ms > MAX_PAST_SKEW_MS {
        return Err(SignatureError::StaleTimestamp { age_ms });
    }
    if age_ms < -MAX_FUTURE_SKEW_MS {
        return Err(SignatureError::FutureTimestamp {
            ahead_ms: age_ms.saturating_neg(),
        });
    }
    Ok(())
}

/// Serialize with object keys sorted and no whitespace
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        scalar => scalar.to_string(),
    }
}

/// Compute the hash for a request body
pub fn sign(body: &Value, secret: i64) -> String {
    let mut value = body.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(HASH_PLACEHOLDER.to_string()));
    }

    let mut hasher = Sha256::new();
    hasher.update(canonical_json(&value).as_bytes());
    hasher.update(secret.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_signature(
    provided: &str,
    body: &Value,
    secret: i64,
) -> std::result::Result<(), SignatureError> {
    if sign(body, secret) == provided {
        Ok(())
    } else {
        Err(SignatureError::HashMismatch)
    }
}

/// Build a signed body from `fields` (client side)
pub fn sign_request(fields: Map<String, Value>, secret: i64, timestamp: i64) -> Value {
    let mut body = Value::Object(fields);
    if let Some(obj) = body.as_object_mut() {
        obj.insert("timestamp".to_string(), Value::from(timestamp));
    }
    let hash = sign(&body, secret);
    if let Some(obj) = body.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(hash));
    }
    body
}
