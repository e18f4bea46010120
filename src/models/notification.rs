use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::errors::NotificationError;

/// Closed set of delivery channels a notification can be addressed to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    #[display("email")]
    Email,
    #[display("sms")]
    Sms,
    #[display("push")]
    Push,
}

impl FromStr for ChannelKind {
    type Err = NotificationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(ChannelKind::Email),
            "sms" => Ok(ChannelKind::Sms),
            "push" => Ok(ChannelKind::Push),
            other => Err(NotificationError::InvalidChannel(format!(
                "unknown channel name: {other}"
            ))),
        }
    }
}

/// Persisted notification entity.
///
/// `id`, `user_id`, `created_at` and `channel_name` never change after
/// creation. A populated `deleted_at` marks the record soft-deleted and hides
/// it from every read path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub channel_name: ChannelKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub channel_name: ChannelKind,
    #[serde(default)]
    pub meta: HashMap<String, String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Field presence is explicit: `None` means "leave untouched" while
/// `Some("")` intentionally clears the field to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub meta: Option<HashMap<String, String>>,
}

/// Tagged set of mutable field updates. Immutable fields (`id`, `user_id`,
/// `created_at`, `channel_name`) have no slot here, so an update cannot touch
/// them by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdates {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl FieldUpdates {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Conversion used at boundaries where updates arrive as a raw field map.
/// Any name outside the mutable set is rejected.
impl TryFrom<HashMap<String, String>> for FieldUpdates {
    type Error = NotificationError;

    fn try_from(fields: HashMap<String, String>) -> Result<Self, Self::Error> {
        let mut updates = FieldUpdates::default();
        for (field, value) in fields {
            match field.as_str() {
                "title" => updates.title = Some(value),
                "content" => updates.content = Some(value),
                _ => return Err(NotificationError::ImmutableField(field)),
            }
        }
        Ok(updates)
    }
}

/// Transient payload handed to the dispatch queue; consumed by an external
/// worker, never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchMessage {
    pub notification_id: String,
    pub user_id: String,
    pub channel_name: ChannelKind,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub meta: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    pub user_id: String,
    pub limit: i32,
    /// Opaque continuation token from a previous page; empty on the first
    /// request.
    pub next_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub notifications: Vec<Notification>,
    pub next_token: String,
    pub has_more: bool,
}
