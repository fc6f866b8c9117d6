use okrbot_core::domain::node::NodeKind;
use okrbot_core::domain::subscription::{ChannelSubscription, SubscriptionRecord};
use okrbot_core::stores::{StoreError, SubscriptionStore};
use sqlx::Row;

use super::backend;
use crate::DbPool;

/// Whole-document subscription persistence: one row per slug, the
/// channel list serialized as JSON. `put` replaces the row in full, so
/// emptied records stay present with an empty channel list.
pub struct SqlSubscriptionStore {
    pool: DbPool,
}

impl SqlSubscriptionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for SqlSubscriptionStore {
    async fn get(&self, slug: &str) -> Result<Option<SubscriptionRecord>, StoreError> {
        let Some(row) =
            sqlx::query("SELECT node_kind, channels FROM slack_subscriptions WHERE slug = ?1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?
        else {
            return Ok(None);
        };

        let kind = row
            .get::<String, _>("node_kind")
            .parse::<NodeKind>()
            .map_err(|error| StoreError::Decode(error.to_string()))?;
        let channels: Vec<ChannelSubscription> =
            serde_json::from_str(&row.get::<String, _>("channels"))
                .map_err(|error| StoreError::Decode(error.to_string()))?;

        Ok(Some(SubscriptionRecord { kind, slug: slug.to_owned(), channels }))
    }

    async fn put(&self, record: SubscriptionRecord) -> Result<(), StoreError> {
        let channels = serde_json::to_string(&record.channels)
            .map_err(|error| StoreError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO slack_subscriptions (slug, node_kind, channels) VALUES (?1, ?2, ?3)
             ON CONFLICT (slug) DO UPDATE
             SET node_kind = excluded.node_kind, channels = excluded.channels",
        )
        .bind(&record.slug)
        .bind(record.kind.as_str())
        .bind(channels)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }
}
