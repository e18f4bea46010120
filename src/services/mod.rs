pub mod sqs;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::NotificationError;
use crate::models::notification::{ChannelKind, DispatchMessage};

/// Hand-off point to the asynchronous delivery pipeline. Publishing does not
/// retry internally; retry policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchQueue: Send + Sync {
    async fn publish(&self, message: &DispatchMessage) -> Result<(), NotificationError>;
}

/// Validates channel-specific metadata before a notification is accepted.
#[cfg_attr(test, mockall::automock)]
pub trait ChannelValidator: Send + Sync {
    fn validate(
        &self,
        channel: ChannelKind,
        meta: &HashMap<String, String>,
    ) -> Result<(), NotificationError>;
}

pub type ImplDispatchQueue = Box<dyn DispatchQueue>;
pub type ImplChannelValidator = Box<dyn ChannelValidator>;
