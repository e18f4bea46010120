pub mod cursor;
pub mod dynamodb;
pub mod keys;

use async_trait::async_trait;

use crate::errors::NotificationError;
use crate::models::notification::{FieldUpdates, ListQuery, ListResponse, Notification};

/// Storage contract for notification records. Implementations own the key
/// layout, soft-delete semantics and cursor pagination.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepo: Send + Sync {
    /// Writes the record with both its primary and by-id index projections as
    /// one item. When the underlying call fails the write may or may not have
    /// applied.
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError>;

    /// Looks the record up through the by-id index. A soft-deleted record is
    /// indistinguishable from an absent one.
    async fn get_by_id(&self, id: &str) -> Result<Notification, NotificationError>;

    /// Returns one page of the user's live notifications in ascending
    /// creation order. An empty page is a valid response.
    async fn list(&self, query: ListQuery) -> Result<ListResponse, NotificationError>;

    /// Conditional write over the mutable fields; always bumps `updated_at`.
    /// Fails with `NotFound` when the record vanished between the id lookup
    /// and the write.
    async fn update(&self, id: &str, updates: FieldUpdates) -> Result<(), NotificationError>;

    /// Soft delete. A second delete on an already-deleted record fails with
    /// `Conflict`, leaving the first delete's timestamp untouched.
    async fn delete(&self, id: &str) -> Result<(), NotificationError>;
}

pub type ImplNotificationRepo = Box<dyn NotificationRepo>;
