//! Orchestration over the store, the dispatch queue and the channel
//! validators. These are the only entry points external callers use.

use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::errors::NotificationError;
use crate::models::notification::{
    CreateRequest, DispatchMessage, FieldUpdates, ListQuery, ListResponse, Notification,
    UpdateRequest,
};
use crate::repo::ImplNotificationRepo;
use crate::services::{ImplChannelValidator, ImplDispatchQueue};

pub struct NotificationService {
    repo: ImplNotificationRepo,
    queue: ImplDispatchQueue,
    validator: ImplChannelValidator,
}

impl NotificationService {
    pub fn new(
        repo: ImplNotificationRepo,
        queue: ImplDispatchQueue,
        validator: ImplChannelValidator,
    ) -> Self {
        Self {
            repo,
            queue,
            validator,
        }
    }

    /// Validates, persists and enqueues a new notification.
    ///
    /// The two writes are not transactional: when the enqueue fails the
    /// stored record stays in place and is returned inside
    /// [`NotificationError::EnqueueFailed`] so the caller can re-drive the
    /// dispatch.
    pub async fn create(
        &self,
        request: CreateRequest,
    ) -> Result<Notification, NotificationError> {
        self.validator
            .validate(request.channel_name, &request.meta)?;

        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            title: request.title,
            content: request.content,
            channel_name: request.channel_name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.repo.create(&notification).await?;

        let message = DispatchMessage {
            notification_id: notification.id.clone(),
            user_id: notification.user_id.clone(),
            channel_name: notification.channel_name,
            title: notification.title.clone(),
            content: notification.content.clone(),
            meta: request.meta,
            scheduled_at: request.scheduled_at,
        };

        if let Err(err) = self.queue.publish(&message).await {
            warn!(
                "notification {} persisted but enqueue failed: {err}",
                notification.id
            );
            return Err(NotificationError::EnqueueFailed {
                notification: Box::new(notification),
                reason: err.to_string(),
            });
        }

        Ok(notification)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Notification, NotificationError> {
        self.repo.get_by_id(id).await
    }

    pub async fn list(&self, query: ListQuery) -> Result<ListResponse, NotificationError> {
        self.repo.list(query).await
    }

    /// Applies the fields present in the request. Absent fields are left
    /// untouched; metadata, when supplied, is re-validated against the
    /// notification's existing channel.
    pub async fn update(&self, id: &str, request: UpdateRequest) -> Result<(), NotificationError> {
        let existing = self.repo.get_by_id(id).await?;

        if let Some(meta) = &request.meta {
            self.validator.validate(existing.channel_name, meta)?;
        }

        let updates = FieldUpdates {
            title: request.title,
            content: request.content,
        };

        self.repo.update(id, updates).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), NotificationError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use mockall::predicate::*;

    use super::*;
    use crate::models::notification::ChannelKind;
    use crate::repo::MockNotificationRepo;
    use crate::services::{MockChannelValidator, MockDispatchQueue};

    fn build_service(
        repo: MockNotificationRepo,
        queue: MockDispatchQueue,
        validator: MockChannelValidator,
    ) -> NotificationService {
        NotificationService::new(Box::new(repo), Box::new(queue), Box::new(validator))
    }

    fn create_request() -> CreateRequest {
        CreateRequest {
            user_id: "u1".to_string(),
            title: "Hi".to_string(),
            content: "Body".to_string(),
            channel_name: ChannelKind::Email,
            meta: HashMap::from([("to".to_string(), "a@b.com".to_string())]),
            scheduled_at: None,
        }
    }

    fn stored_notification(id: &str, channel: ChannelKind) -> Notification {
        let now = Utc::now();
        Notification {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: "Hi".to_string(),
            content: "Body".to_string(),
            channel_name: channel,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn create_persists_then_publishes_with_ordering_keys() {
        let mut validator = MockChannelValidator::new();
        validator
            .expect_validate()
            .withf(|channel, meta| {
                *channel == ChannelKind::Email && meta.get("to").is_some_and(|to| to == "a@b.com")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut repo = MockNotificationRepo::new();
        repo.expect_create()
            .withf(|n| {
                n.user_id == "u1"
                    && n.title == "Hi"
                    && n.deleted_at.is_none()
                    && n.created_at == n.updated_at
                    && !n.id.is_empty()
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut queue = MockDispatchQueue::new();
        queue
            .expect_publish()
            .withf(|msg| {
                msg.user_id == "u1"
                    && msg.channel_name == ChannelKind::Email
                    && !msg.notification_id.is_empty()
                    && msg.meta.get("to").is_some_and(|to| to == "a@b.com")
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = build_service(repo, queue, validator);

        let created = service.create(create_request()).await.unwrap();

        assert_eq!(created.title, "Hi");
        assert_eq!(created.content, "Body");
        assert!(created.deleted_at.is_none());
    }

    #[tokio::test]
    async fn create_rejects_invalid_channel_metadata_before_persisting() {
        let mut validator = MockChannelValidator::new();
        validator
            .expect_validate()
            .times(1)
            .returning(|_, _| Err(NotificationError::InvalidChannel("to is required".into())));

        let mut repo = MockNotificationRepo::new();
        repo.expect_create().never();
        let mut queue = MockDispatchQueue::new();
        queue.expect_publish().never();

        let service = build_service(repo, queue, validator);

        let err = service.create(create_request()).await.unwrap_err();

        assert!(matches!(err, NotificationError::InvalidChannel(_)));
    }

    #[tokio::test]
    async fn create_surfaces_enqueue_failure_with_the_persisted_entity() {
        let mut validator = MockChannelValidator::new();
        validator.expect_validate().returning(|_, _| Ok(()));

        let mut repo = MockNotificationRepo::new();
        repo.expect_create().times(1).returning(|_| Ok(()));

        let mut queue = MockDispatchQueue::new();
        queue
            .expect_publish()
            .times(1)
            .returning(|_| Err(NotificationError::Publish("queue unreachable".into())));

        let service = build_service(repo, queue, validator);

        let err = service.create(create_request()).await.unwrap_err();

        match err {
            NotificationError::EnqueueFailed {
                notification,
                reason,
            } => {
                assert_eq!(notification.user_id, "u1");
                assert_eq!(notification.title, "Hi");
                assert!(reason.contains("queue unreachable"));
            }
            other => panic!("expected EnqueueFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_does_not_publish_when_the_store_write_fails() {
        let mut validator = MockChannelValidator::new();
        validator.expect_validate().returning(|_, _| Ok(()));

        let mut repo = MockNotificationRepo::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(NotificationError::StoreWrite("throttled".into())));

        let mut queue = MockDispatchQueue::new();
        queue.expect_publish().never();

        let service = build_service(repo, queue, validator);

        let err = service.create(create_request()).await.unwrap_err();

        assert!(matches!(err, NotificationError::StoreWrite(_)));
    }

    #[tokio::test]
    async fn update_revalidates_meta_against_the_existing_channel() {
        let mut repo = MockNotificationRepo::new();
        repo.expect_get_by_id()
            .with(eq("notif-1"))
            .times(1)
            .returning(|_| Ok(stored_notification("notif-1", ChannelKind::Sms)));
        repo.expect_update()
            .withf(|id, updates| {
                id == "notif-1"
                    && updates.title.as_deref() == Some("New title")
                    && updates.content.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut validator = MockChannelValidator::new();
        validator
            .expect_validate()
            .withf(|channel, _| *channel == ChannelKind::Sms)
            .times(1)
            .returning(|_, _| Ok(()));

        let queue = MockDispatchQueue::new();
        let service = build_service(repo, queue, validator);

        let request = UpdateRequest {
            title: Some("New title".to_string()),
            content: None,
            meta: Some(HashMap::from([(
                "phone".to_string(),
                "+1234567890".to_string(),
            )])),
        };

        service.update("notif-1", request).await.unwrap();
    }

    #[tokio::test]
    async fn update_without_meta_skips_validation() {
        let mut repo = MockNotificationRepo::new();
        repo.expect_get_by_id()
            .returning(|_| Ok(stored_notification("notif-1", ChannelKind::Email)));
        repo.expect_update().times(1).returning(|_, _| Ok(()));

        let mut validator = MockChannelValidator::new();
        validator.expect_validate().never();

        let queue = MockDispatchQueue::new();
        let service = build_service(repo, queue, validator);

        let request = UpdateRequest {
            title: None,
            content: Some("fresh content".to_string()),
            meta: None,
        };

        service.update("notif-1", request).await.unwrap();
    }

    #[tokio::test]
    async fn update_on_missing_record_reports_not_found() {
        let mut repo = MockNotificationRepo::new();
        repo.expect_get_by_id()
            .returning(|_| Err(NotificationError::NotFound));
        repo.expect_update().never();

        let validator = MockChannelValidator::new();
        let queue = MockDispatchQueue::new();
        let service = build_service(repo, queue, validator);

        let err = service
            .update("ghost", UpdateRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::NotFound));
    }

    #[tokio::test]
    async fn get_and_list_and_delete_pass_through_to_the_store() {
        let mut repo = MockNotificationRepo::new();
        repo.expect_get_by_id()
            .with(eq("notif-1"))
            .times(1)
            .returning(|_| Ok(stored_notification("notif-1", ChannelKind::Push)));
        repo.expect_list()
            .withf(|query| query.user_id == "u1" && query.limit == 5)
            .times(1)
            .returning(|_| {
                Ok(ListResponse {
                    notifications: vec![],
                    next_token: String::new(),
                    has_more: false,
                })
            });
        repo.expect_delete()
            .with(eq("notif-1"))
            .times(1)
            .returning(|_| Ok(()));

        let validator = MockChannelValidator::new();
        let queue = MockDispatchQueue::new();
        let service = build_service(repo, queue, validator);

        let found = service.get_by_id("notif-1").await.unwrap();
        assert_eq!(found.id, "notif-1");

        let page = service
            .list(ListQuery {
                user_id: "u1".to_string(),
                limit: 5,
                next_token: String::new(),
            })
            .await
            .unwrap();
        assert!(page.notifications.is_empty());
        assert!(!page.has_more);

        service.delete("notif-1").await.unwrap();
    }
}
