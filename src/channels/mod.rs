//! Delivery channel collaborators.
//!
//! Each channel validates its own metadata and prepares the dispatch message
//! before the (out-of-scope) sender runs. The registry dispatches over the
//! closed channel set and backs the service's `ChannelValidator`.

pub mod email;
pub mod push;
pub mod sms;

use std::collections::HashMap;

use crate::errors::NotificationError;
use crate::models::notification::{ChannelKind, DispatchMessage};

pub trait Channel: Send + Sync {
    fn name(&self) -> ChannelKind;

    fn validate(&self, meta: &HashMap<String, String>) -> Result<(), NotificationError>;

    /// Channel-specific adjustments applied before sending, e.g. truncation
    /// or template rendering.
    fn prepare(&self, message: &mut DispatchMessage) -> Result<(), NotificationError>;
}

pub struct ChannelRegistry {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelRegistry {
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }

    fn get(&self, channel: ChannelKind) -> Result<&dyn Channel, NotificationError> {
        self.channels
            .iter()
            .find(|c| c.name() == channel)
            .map(Box::as_ref)
            .ok_or_else(|| {
                NotificationError::InvalidChannel(format!("no channel registered for {channel}"))
            })
    }

    pub fn prepare(&self, message: &mut DispatchMessage) -> Result<(), NotificationError> {
        self.get(message.channel_name)?.prepare(message)
    }
}

impl crate::services::ChannelValidator for ChannelRegistry {
    fn validate(
        &self,
        channel: ChannelKind,
        meta: &HashMap<String, String>,
    ) -> Result<(), NotificationError> {
        self.get(channel)?.validate(meta)
    }
}
