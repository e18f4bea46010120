//! DynamoDB implementation of the notification store.
//!
//! One table holds both projections of every record: the per-user primary key
//! and the by-id `GSI1` index keys are written together in a single `PutItem`,
//! so a record is never reachable by user but not by id.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use log::error;

use super::NotificationRepo;
use super::cursor::{self, LastKey};
use super::keys;
use crate::consts;
use crate::errors::NotificationError;
use crate::models::notification::{
    ChannelKind, FieldUpdates, ListQuery, ListResponse, Notification,
};

const ATTR_PK: &str = "PK";
const ATTR_SK: &str = "SK";
const ATTR_GSI1_PK: &str = "GSI1PK";
const ATTR_GSI1_SK: &str = "GSI1SK";
const ATTR_ID: &str = "id";
const ATTR_USER_ID: &str = "user_id";
const ATTR_TITLE: &str = "title";
const ATTR_CONTENT: &str = "content";
const ATTR_CHANNEL_NAME: &str = "channel_name";
const ATTR_CREATED_AT: &str = "created_at";
const ATTR_UPDATED_AT: &str = "updated_at";
const ATTR_DELETED_AT: &str = "deleted_at";

#[derive(Clone)]
pub struct DynamoDbNotificationRepo {
    pub client: aws_sdk_dynamodb::Client,
    pub table_name: String,
}

impl DynamoDbNotificationRepo {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    /// By-id index lookup that does not hide soft-deleted records. The public
    /// `get_by_id` adds the deletion check; `delete` needs the raw record so
    /// its conditional write can observe an existing `deleted_at` and report
    /// the conflict instead of pretending the record is absent.
    async fn find_item_by_id(&self, id: &str) -> Result<Notification, NotificationError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(consts::GSI1_INDEX_NAME)
            .key_condition_expression("GSI1PK = :pk")
            .expression_attribute_values(":pk", AttributeValue::S(keys::secondary_partition_key(id)))
            .send()
            .await
            .map_err(|err| {
                error!("dynamodb Query on GSI1 failed: {err}");
                NotificationError::StoreRead(err.to_string())
            })?;

        // At most one live record exists per id; the index is not a source of
        // ordering guarantees, so the first match is taken.
        let Some(item) = result.items().first() else {
            return Err(NotificationError::NotFound);
        };

        from_item(item)
    }
}

fn to_item(notification: &Notification) -> HashMap<String, AttributeValue> {
    let (pk, sk) = keys::primary_key(
        &notification.user_id,
        notification.created_at,
        &notification.id,
    );
    let (gsi1_pk, gsi1_sk) = keys::secondary_key(&notification.id);

    let mut item = HashMap::from([
        (ATTR_PK.to_string(), AttributeValue::S(pk)),
        (ATTR_SK.to_string(), AttributeValue::S(sk)),
        (ATTR_GSI1_PK.to_string(), AttributeValue::S(gsi1_pk)),
        (ATTR_GSI1_SK.to_string(), AttributeValue::S(gsi1_sk)),
        (
            ATTR_ID.to_string(),
            AttributeValue::S(notification.id.clone()),
        ),
        (
            ATTR_USER_ID.to_string(),
            AttributeValue::S(notification.user_id.clone()),
        ),
        (
            ATTR_TITLE.to_string(),
            AttributeValue::S(notification.title.clone()),
        ),
        (
            ATTR_CONTENT.to_string(),
            AttributeValue::S(notification.content.clone()),
        ),
        (
            ATTR_CHANNEL_NAME.to_string(),
            AttributeValue::S(notification.channel_name.to_string()),
        ),
        (
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(keys::format_timestamp(notification.created_at)),
        ),
        (
            ATTR_UPDATED_AT.to_string(),
            AttributeValue::S(keys::format_timestamp(notification.updated_at)),
        ),
    ]);

    // Absent for live records: the list filter relies on attribute_not_exists.
    if let Some(deleted_at) = notification.deleted_at {
        item.insert(
            ATTR_DELETED_AT.to_string(),
            AttributeValue::S(keys::format_timestamp(deleted_at)),
        );
    }

    item
}

fn string_attr(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<String, NotificationError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| NotificationError::StoreRead(format!("missing string attribute {name}")))
}

fn timestamp_attr(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<DateTime<Utc>, NotificationError> {
    let raw = string_attr(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| NotificationError::StoreRead(format!("failed to parse {name}: {err}")))
}

fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Notification, NotificationError> {
    let channel_raw = string_attr(item, ATTR_CHANNEL_NAME)?;
    let channel_name = ChannelKind::from_str(&channel_raw)
        .map_err(|err| NotificationError::StoreRead(err.to_string()))?;

    let deleted_at = match item.get(ATTR_DELETED_AT) {
        Some(_) => Some(timestamp_attr(item, ATTR_DELETED_AT)?),
        None => None,
    };

    Ok(Notification {
        id: string_attr(item, ATTR_ID)?,
        user_id: string_attr(item, ATTR_USER_ID)?,
        title: string_attr(item, ATTR_TITLE)?,
        content: string_attr(item, ATTR_CONTENT)?,
        channel_name,
        created_at: timestamp_attr(item, ATTR_CREATED_AT)?,
        updated_at: timestamp_attr(item, ATTR_UPDATED_AT)?,
        deleted_at,
    })
}

fn last_key_from_attrs(
    attrs: &HashMap<String, AttributeValue>,
) -> Result<LastKey, NotificationError> {
    Ok(LastKey {
        pk: string_attr(attrs, ATTR_PK)?,
        sk: string_attr(attrs, ATTR_SK)?,
    })
}

fn is_condition_failure(err: &UpdateItemError) -> bool {
    matches!(err, UpdateItemError::ConditionalCheckFailedException(_))
}

fn is_conditional_check_failed<R>(err: &SdkError<UpdateItemError, R>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => is_condition_failure(service_err.err()),
        _ => false,
    }
}

#[async_trait]
impl NotificationRepo for DynamoDbNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(notification)))
            .send()
            .await
            .map_err(|err| {
                error!("dynamodb PutItem failed: {err}");
                NotificationError::StoreWrite(err.to_string())
            })?;

        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Notification, NotificationError> {
        let notification = self.find_item_by_id(id).await?;

        // A soft-deleted record is indistinguishable from an absent one.
        if notification.deleted_at.is_some() {
            return Err(NotificationError::NotFound);
        }

        Ok(notification)
    }

    async fn list(&self, query: ListQuery) -> Result<ListResponse, NotificationError> {
        let start_key = cursor::decode(&query.next_token)?;
        let limit = if query.limit > 0 {
            query.limit
        } else {
            consts::DEFAULT_PAGE_LIMIT
        };

        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk")
            .expression_attribute_values(
                ":pk",
                AttributeValue::S(keys::partition_key(&query.user_id)),
            )
            .filter_expression("attribute_not_exists(deleted_at)")
            .limit(limit);

        if let Some(key) = start_key {
            request = request.set_exclusive_start_key(Some(HashMap::from([
                (ATTR_PK.to_string(), AttributeValue::S(key.pk)),
                (ATTR_SK.to_string(), AttributeValue::S(key.sk)),
            ])));
        }

        let result = request.send().await.map_err(|err| {
            error!("dynamodb Query failed: {err}");
            NotificationError::StoreRead(err.to_string())
        })?;

        let notifications = result
            .items()
            .iter()
            .map(from_item)
            .collect::<Result<Vec<_>, _>>()?;

        let last_key = result
            .last_evaluated_key()
            .map(last_key_from_attrs)
            .transpose()?;
        let next_token = cursor::encode(last_key.as_ref());

        Ok(ListResponse {
            notifications,
            next_token,
            has_more: last_key.is_some(),
        })
    }

    async fn update(&self, id: &str, updates: FieldUpdates) -> Result<(), NotificationError> {
        // Read-then-write: the id lookup resolves the sort key. The condition
        // below only guards existence, not field versions, so a concurrent
        // writer between the two calls wins on last-conditional-write.
        let existing = self.get_by_id(id).await?;
        let (pk, sk) = keys::primary_key(&existing.user_id, existing.created_at, &existing.id);

        let mut set_parts = vec![format!("{ATTR_UPDATED_AT} = :updated_at")];
        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(pk))
            .key(ATTR_SK, AttributeValue::S(sk))
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_values(
                ":updated_at",
                AttributeValue::S(keys::format_timestamp(Utc::now())),
            );

        if let Some(title) = updates.title {
            set_parts.push(format!("{ATTR_TITLE} = :title"));
            request = request.expression_attribute_values(":title", AttributeValue::S(title));
        }
        if let Some(content) = updates.content {
            set_parts.push(format!("{ATTR_CONTENT} = :content"));
            request = request.expression_attribute_values(":content", AttributeValue::S(content));
        }

        request
            .update_expression(format!("SET {}", set_parts.join(", ")))
            .send()
            .await
            .map_err(|err| {
                if is_conditional_check_failed(&err) {
                    // Record vanished between the read and the write.
                    return NotificationError::NotFound;
                }
                error!("dynamodb UpdateItem failed: {err}");
                NotificationError::StoreWrite(err.to_string())
            })?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), NotificationError> {
        // The lookup must see soft-deleted records: resolving the sort key
        // through `get_by_id` would turn a repeated delete into `NotFound`
        // before the conditional write could report the conflict.
        let existing = self.find_item_by_id(id).await?;
        let (pk, sk) = keys::primary_key(&existing.user_id, existing.created_at, &existing.id);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_PK, AttributeValue::S(pk))
            .key(ATTR_SK, AttributeValue::S(sk))
            .update_expression(format!("SET {ATTR_DELETED_AT} = :deleted_at"))
            .condition_expression("attribute_not_exists(deleted_at)")
            .expression_attribute_values(
                ":deleted_at",
                AttributeValue::S(keys::format_timestamp(Utc::now())),
            )
            .send()
            .await
            .map_err(|err| {
                if is_conditional_check_failed(&err) {
                    // First writer wins; a repeated delete is a conflict, not
                    // a silent success.
                    return NotificationError::Conflict(
                        "notification already deleted".to_string(),
                    );
                }
                error!("dynamodb UpdateItem failed: {err}");
                NotificationError::StoreWrite(err.to_string())
            })?;

        Ok(())
    }
}
