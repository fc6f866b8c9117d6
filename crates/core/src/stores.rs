//! Collaborator interfaces for the two external document stores.
//!
//! The bot never owns catalog data and never patches subscription
//! documents field-by-field: catalog reads are slug/parent lookups, and
//! subscription writes replace the whole document. Implementations live
//! in `okrbot-db`; the engine only ever sees these traits.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::node::{Node, NodeKind};
use crate::domain::subscription::SubscriptionRecord;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("store decode error: {0}")]
    Decode(String),
}

/// Read-only lookup into the OKR catalog hierarchy.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Resolves a node by slug within its kind. Slugs are unique per kind,
    /// so anything other than exactly one row is reported as `None`.
    async fn find_by_slug(&self, kind: NodeKind, slug: &str) -> Result<Option<Node>, StoreError>;

    /// Direct children of `parent` that are of `child_kind`: departments
    /// and products match an organization parent by their organization
    /// ref, products match a department parent by their department ref.
    /// Results are ordered by slug.
    async fn find_children(
        &self,
        child_kind: NodeKind,
        parent: &Node,
    ) -> Result<Vec<Node>, StoreError>;
}

/// Whole-document key-value store for subscription records, keyed by slug.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(&self, slug: &str) -> Result<Option<SubscriptionRecord>, StoreError>;

    /// Full overwrite, used for create and update alike. There is no
    /// multi-key transaction; cascades tolerate per-key failure instead.
    async fn put(&self, record: SubscriptionRecord) -> Result<(), StoreError>;
}
