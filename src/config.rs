//! Application configuration loaded from environment variables.

use envconfig::Envconfig;
use std::sync::LazyLock;

/// Environment variables used to configure the notification core.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app.
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// AWS region hosting the notifications table and dispatch queue.
    #[envconfig(default = "us-east-1")]
    pub aws_region: String,

    /// Name of the DynamoDB table holding notification records.
    /// Example: "notifications"
    pub notifications_table: String,

    /// URL of the SQS queue receiving dispatch messages.
    /// Example: "https://sqs.us-east-1.amazonaws.com/123456789012/dispatch.fifo"
    pub dispatch_queue_url: String,

    /// Sender address stamped on outgoing email dispatches.
    #[envconfig(default = "no-reply@localhost")]
    pub email_from: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }
}

/// Global application configuration instance, validated on first access.
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    AppConfig::init_from_env()
        .expect("Failed to load application configuration. Check environment variables.")
});
