//! Opaque continuation tokens for paged notification queries.
//!
//! A token is the base64 of a small JSON object holding the last evaluated
//! primary key. Callers replay it unmodified; a token that fails to decode is
//! the caller's fault (`InvalidCursor`), since it can only originate from a
//! previous response.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::NotificationError;

/// Position where the previous page stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKey {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
}

/// `None` (no further pages) encodes to the empty string.
pub fn encode(last_key: Option<&LastKey>) -> String {
    let Some(key) = last_key else {
        return String::new();
    };
    let payload = json!({ "PK": key.pk, "SK": key.sk });
    BASE64.encode(payload.to_string())
}

/// The empty string decodes to "no position"; anything else must be a token
/// produced by [`encode`].
pub fn decode(token: &str) -> Result<Option<LastKey>, NotificationError> {
    if token.is_empty() {
        return Ok(None);
    }

    let bytes = BASE64
        .decode(token)
        .map_err(|err| NotificationError::InvalidCursor(err.to_string()))?;
    let key = serde_json::from_slice::<LastKey>(&bytes)
        .map_err(|err| NotificationError::InvalidCursor(err.to_string()))?;

    Ok(Some(key))
}
