use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::Channel;
use crate::consts;
use crate::errors::NotificationError;
use crate::models::notification::{ChannelKind, DispatchMessage};

/// E.164 international phone number format.
static PHONE_E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

pub struct SmsChannel;

impl Channel for SmsChannel {
    fn name(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    fn validate(&self, meta: &HashMap<String, String>) -> Result<(), NotificationError> {
        let phone = meta.get("phone").map(String::as_str).unwrap_or_default();
        if !PHONE_E164.is_match(phone) {
            return Err(NotificationError::InvalidChannel(
                "phone field with valid phone number is required".to_string(),
            ));
        }

        let carrier = meta.get("carrier").map(String::as_str).unwrap_or_default();
        if carrier.is_empty() {
            return Err(NotificationError::InvalidChannel(
                "carrier field is required".to_string(),
            ));
        }

        Ok(())
    }

    fn prepare(&self, message: &mut DispatchMessage) -> Result<(), NotificationError> {
        if message.content.chars().count() > consts::SMS_MAX_CONTENT_CHARS {
            message.content = message
                .content
                .chars()
                .take(consts::SMS_MAX_CONTENT_CHARS)
                .collect();
        }
        Ok(())
    }
}
