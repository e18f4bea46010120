//! Single-table key layout for notification records.
//!
//! Primary key: `USER#<user_id>` / `NOTIF#<created_at>#<id>` — the sort key
//! grows lexicographically with creation time, so a partition range scan
//! returns a user's notifications in chronological order. The by-id index
//! projects the same record under `NOTIF#<id>` for direct lookup.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::consts;

/// RFC 3339 with second precision and a `Z` suffix, the stored timestamp
/// format. Lexicographic order matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn partition_key(user_id: &str) -> String {
    format!("{}{}", consts::USER_KEY_PREFIX, user_id)
}

pub fn sort_key(created_at: DateTime<Utc>, id: &str) -> String {
    format!(
        "{}{}#{}",
        consts::NOTIF_KEY_PREFIX,
        format_timestamp(created_at),
        id
    )
}

pub fn primary_key(user_id: &str, created_at: DateTime<Utc>, id: &str) -> (String, String) {
    (partition_key(user_id), sort_key(created_at, id))
}

pub fn secondary_partition_key(id: &str) -> String {
    format!("{}{}", consts::NOTIF_KEY_PREFIX, id)
}

/// By-id lookups need no ordering, so the index sort key is the same
/// constant derived from the id.
pub fn secondary_key(id: &str) -> (String, String) {
    (secondary_partition_key(id), secondary_partition_key(id))
}
