use std::collections::HashMap;

use super::Channel;
use crate::consts;
use crate::errors::NotificationError;
use crate::models::notification::{ChannelKind, DispatchMessage};

pub struct PushChannel;

impl Channel for PushChannel {
    fn name(&self) -> ChannelKind {
        ChannelKind::Push
    }

    fn validate(&self, meta: &HashMap<String, String>) -> Result<(), NotificationError> {
        let token = meta.get("token").map(String::as_str).unwrap_or_default();
        if token.len() < consts::PUSH_TOKEN_MIN_LEN || token.len() > consts::PUSH_TOKEN_MAX_LEN {
            return Err(NotificationError::InvalidChannel(
                "invalid token".to_string(),
            ));
        }
        Ok(())
    }

    fn prepare(&self, message: &mut DispatchMessage) -> Result<(), NotificationError> {
        // Optional structured payload; the sender expects it to be JSON.
        if let Some(data) = message.meta.get("data") {
            if !data.is_empty() {
                serde_json::from_str::<HashMap<String, String>>(data).map_err(|err| {
                    NotificationError::InvalidChannel(format!("invalid data json: {err}"))
                })?;
            }
        }
        Ok(())
    }
}
