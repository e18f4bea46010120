//! Error taxonomy shared across the repository, queue and service layers.
//!
//! Caller-fault variants (`InvalidChannel`, `NotFound`, `ImmutableField`,
//! `InvalidCursor`, `Conflict`) are distinguishable from infrastructure
//! failures (`StoreWrite`, `StoreRead`, `Publish`) so the consuming layer can
//! map them to 4xx vs 5xx responses.

use derive_more::{Display, Error};

use crate::models::notification::Notification;

#[derive(Debug, Display, Error)]
pub enum NotificationError {
    #[display("invalid channel: {_0}")]
    InvalidChannel(#[error(not(source))] String),

    #[display("notification not found")]
    NotFound,

    #[display("field {_0} is immutable and cannot be updated")]
    ImmutableField(#[error(not(source))] String),

    #[display("invalid pagination token: {_0}")]
    InvalidCursor(#[error(not(source))] String),

    #[display("conflict: {_0}")]
    Conflict(#[error(not(source))] String),

    #[display("failed to store notification: {_0}")]
    StoreWrite(#[error(not(source))] String),

    #[display("failed to read notification: {_0}")]
    StoreRead(#[error(not(source))] String),

    #[display("failed to publish dispatch message: {_0}")]
    Publish(#[error(not(source))] String),

    /// The record was persisted but the dispatch hand-off failed. There is no
    /// cross-system transaction, so the stored entity is returned inside the
    /// error for a caller or reconciliation job to re-drive the publish.
    #[display("notification {} persisted but enqueue failed: {reason}", notification.id)]
    EnqueueFailed {
        notification: Box<Notification>,
        reason: String,
    },
}

impl NotificationError {
    /// True for errors caused by the caller's input or by state the caller
    /// already observed changing, rather than by the infrastructure.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            NotificationError::InvalidChannel(_)
                | NotificationError::NotFound
                | NotificationError::ImmutableField(_)
                | NotificationError::InvalidCursor(_)
                | NotificationError::Conflict(_)
        )
    }
}
