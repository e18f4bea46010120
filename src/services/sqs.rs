use async_trait::async_trait;
use log::info;

use crate::errors::NotificationError;
use crate::models::notification::DispatchMessage;

/// Publishes dispatch messages to an SQS FIFO queue. The user id keys the
/// ordering group and the notification id deduplicates retried publishes
/// within the queue's deduplication window.
#[derive(Clone)]
pub struct SqsDispatchQueue {
    pub client: aws_sdk_sqs::Client,
    pub queue_url: String,
}

#[async_trait]
impl crate::services::DispatchQueue for SqsDispatchQueue {
    async fn publish(&self, message: &DispatchMessage) -> Result<(), NotificationError> {
        if self.queue_url.is_empty() {
            return Err(NotificationError::Publish("queue URL is not set".to_string()));
        }

        let body = serde_json::to_string(message).map_err(|err| {
            NotificationError::Publish(format!("failed to serialize message: {err}"))
        })?;

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(&message.user_id)
            .message_deduplication_id(&message.notification_id)
            .send()
            .await
            .map_err(|err| NotificationError::Publish(err.to_string()))?;

        info!(
            "dispatch message for notification {} sent to queue: {}",
            message.notification_id,
            output.message_id().unwrap_or_default()
        );

        Ok(())
    }
}
