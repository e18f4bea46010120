//! Dependency wiring for the notification core.
//!
//! Builds the AWS clients, the channel registry and the service from the
//! environment configuration. The consuming layer (an HTTP server or a
//! lambda entry point) calls [`init_dependencies`] once at startup.

use std::sync::Arc;

use anyhow::Context;

use crate::channels::email::{EmailChannel, EmailTemplates};
use crate::channels::push::PushChannel;
use crate::channels::sms::SmsChannel;
use crate::channels::ChannelRegistry;
use crate::config;
use crate::repo::dynamodb::DynamoDbNotificationRepo;
use crate::service::NotificationService;
use crate::services::sqs::SqsDispatchQueue;

pub async fn init_dependencies() -> anyhow::Result<NotificationService> {
    let app_config = &*config::APP_CONFIG;

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(app_config.aws_region.clone()))
        .load()
        .await;

    let repo = DynamoDbNotificationRepo::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        app_config.notifications_table.clone(),
    );

    let queue = SqsDispatchQueue {
        client: aws_sdk_sqs::Client::new(&aws_config),
        queue_url: app_config.dispatch_queue_url.clone(),
    };

    let templates = Arc::new(
        EmailTemplates::new(app_config.email_from.clone())
            .context("failed to build email templates")?,
    );
    let registry = ChannelRegistry::new(vec![
        Box::new(EmailChannel::new(templates)),
        Box::new(SmsChannel),
        Box::new(PushChannel),
    ]);

    Ok(NotificationService::new(
        Box::new(repo),
        Box::new(queue),
        Box::new(registry),
    ))
}
