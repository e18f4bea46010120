use std::collections::HashMap;
use std::sync::Arc;

use email_address::EmailAddress;
use tera::{Context, Tera};

use super::Channel;
use crate::errors::NotificationError;
use crate::models::notification::{ChannelKind, DispatchMessage};

pub const TEMPLATE_TITLED: &str = "titled";
pub const TEMPLATE_PLAIN: &str = "plain";

/// Immutable template set and sender address shared by every email channel
/// instance. Built once at startup and passed in; the channel holds no lazily
/// initialized state.
pub struct EmailTemplates {
    engine: Tera,
    pub from: String,
}

impl EmailTemplates {
    pub fn new(from: String) -> anyhow::Result<Self> {
        let mut engine = Tera::default();
        engine.add_raw_templates(vec![
            (
                TEMPLATE_TITLED,
                include_str!("../../templates/email/titled.html.tera"),
            ),
            (
                TEMPLATE_PLAIN,
                include_str!("../../templates/email/plain.txt.tera"),
            ),
        ])?;

        Ok(Self { engine, from })
    }

    /// Unknown or missing template names fall back to the plain template.
    fn render(&self, template_name: &str, message: &DispatchMessage) -> tera::Result<String> {
        let name = match template_name {
            TEMPLATE_TITLED => TEMPLATE_TITLED,
            _ => TEMPLATE_PLAIN,
        };

        let mut context = Context::new();
        context.insert("title", &message.title);
        context.insert("content", &message.content);

        self.engine.render(name, &context)
    }
}

pub struct EmailChannel {
    templates: Arc<EmailTemplates>,
}

impl EmailChannel {
    pub fn new(templates: Arc<EmailTemplates>) -> Self {
        Self { templates }
    }
}

impl Channel for EmailChannel {
    fn name(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn validate(&self, meta: &HashMap<String, String>) -> Result<(), NotificationError> {
        let to = meta.get("to").map(String::as_str).unwrap_or_default();
        if to.is_empty() {
            return Err(NotificationError::InvalidChannel(
                "to field with valid email is required".to_string(),
            ));
        }
        if !EmailAddress::is_valid(to) {
            return Err(NotificationError::InvalidChannel(
                "invalid email address".to_string(),
            ));
        }
        Ok(())
    }

    fn prepare(&self, message: &mut DispatchMessage) -> Result<(), NotificationError> {
        let template_name = message
            .meta
            .get("template")
            .cloned()
            .unwrap_or_else(|| TEMPLATE_PLAIN.to_string());

        message.content = self
            .templates
            .render(&template_name, message)
            .map_err(|err| {
                NotificationError::InvalidChannel(format!("failed to render email body: {err}"))
            })?;
        message
            .meta
            .entry("from".to_string())
            .or_insert_with(|| self.templates.from.clone());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> EmailChannel {
        let templates = Arc::new(EmailTemplates::new("no-reply@example.com".to_string()).unwrap());
        EmailChannel::new(templates)
    }

    fn message(meta: HashMap<String, String>) -> DispatchMessage {
        DispatchMessage {
            notification_id: "n1".to_string(),
            user_id: "u1".to_string(),
            channel_name: ChannelKind::Email,
            title: "Welcome".to_string(),
            content: "Hello there".to_string(),
            meta,
            scheduled_at: None,
        }
    }

    #[test]
    fn accepts_valid_address() {
        let meta = HashMap::from([("to".to_string(), "user@example.com".to_string())]);

        assert!(channel().validate(&meta).is_ok());
    }

    #[test]
    fn rejects_missing_or_empty_to() {
        assert!(channel().validate(&HashMap::new()).is_err());

        let meta = HashMap::from([("to".to_string(), String::new())]);
        assert!(channel().validate(&meta).is_err());
    }

    #[test]
    fn rejects_malformed_address() {
        let meta = HashMap::from([("to".to_string(), "not-an-email".to_string())]);

        let err = channel().validate(&meta).unwrap_err();

        assert!(matches!(err, NotificationError::InvalidChannel(_)));
    }

    #[test]
    fn prepare_renders_plain_template_by_default() {
        let mut msg = message(HashMap::new());

        channel().prepare(&mut msg).unwrap();

        assert!(msg.content.contains("Welcome"));
        assert!(msg.content.contains("Hello there"));
        assert!(!msg.content.contains("<h1>"));
        assert_eq!(msg.meta.get("from").unwrap(), "no-reply@example.com");
    }

    #[test]
    fn prepare_renders_titled_template_when_requested() {
        let mut msg = message(HashMap::from([(
            "template".to_string(),
            TEMPLATE_TITLED.to_string(),
        )]));

        channel().prepare(&mut msg).unwrap();

        assert!(msg.content.contains("<h1>Welcome</h1>"));
    }

    #[test]
    fn unknown_template_falls_back_to_plain() {
        let mut msg = message(HashMap::from([(
            "template".to_string(),
            "does-not-exist".to_string(),
        )]));

        channel().prepare(&mut msg).unwrap();

        assert!(msg.content.contains("Hello there"));
    }
}
