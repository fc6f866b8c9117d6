//! Subscription state transitions.
//!
//! Per (slug, channel) pair the engine moves between three states:
//! unsubscribed, subscribed directly, subscribed deeply. The cascading
//! operations fan out over a node's descendants; descendant reads all
//! complete before any write is computed, and writes run concurrently
//! with per-item failure tolerance. Nothing rolls back: a cascade that
//! fails partway stays partially applied until a later command fixes it.

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::warn;

use crate::domain::node::{Node, NodeKind};
use crate::domain::subscription::{ChannelId, SubscriptionRecord};
use crate::hierarchy::{HierarchyResolver, ResolveError};
use crate::stores::{StoreError, SubscriptionStore};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no {kind} found for slug `{slug}`")]
    NotFound { kind: NodeKind, slug: String },
    #[error("channel is already subscribed to `{slug}`")]
    AlreadySubscribed { slug: String },
    #[error("channel has no subscription for `{slug}`")]
    NotSubscribed { slug: String, record_missing: bool },
    #[error("channel has no cascading subscription for `{slug}`")]
    NoDeepSubscription { slug: String },
    #[error("cascading operations are not allowed on a {kind}")]
    InvalidScope { kind: NodeKind },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ResolveError> for EngineError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::NotFound { kind, slug } => Self::NotFound { kind, slug },
            ResolveError::Store(error) => Self::Store(error),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeFailure {
    pub slug: String,
    pub error: StoreError,
}

/// Per-descendant outcome of a cascading operation.
///
/// `applied` lists descendants whose record was written, `unchanged`
/// those that needed no write (entry already present, or nothing to
/// remove), `failed` those whose read or write failed. A failed item
/// never aborts its siblings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub root: String,
    pub applied: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<CascadeFailure>,
}

impl CascadeReport {
    fn new(root: &str) -> Self {
        Self { root: root.to_owned(), ..Self::default() }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SubscriptionEngine {
    resolver: HierarchyResolver,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl SubscriptionEngine {
    pub fn new(resolver: HierarchyResolver, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self { resolver, subscriptions }
    }

    /// Subscribes the channel directly to one node.
    pub async fn subscribe(
        &self,
        kind: NodeKind,
        slug: &str,
        channel: &ChannelId,
    ) -> Result<(), EngineError> {
        let node = self.resolver.resolve(kind, slug).await?;
        self.subscribe_node(&node, channel, false).await
    }

    /// Removes the channel's entry from one node's record. Emptied
    /// records are written back, not deleted.
    pub async fn unsubscribe(
        &self,
        kind: NodeKind,
        slug: &str,
        channel: &ChannelId,
    ) -> Result<(), EngineError> {
        let node = self.resolver.resolve(kind, slug).await?;
        let Some(mut record) = self.subscriptions.get(&node.slug).await? else {
            return Err(EngineError::NotSubscribed { slug: node.slug, record_missing: true });
        };
        if !record.remove_channel(channel) {
            return Err(EngineError::NotSubscribed { slug: node.slug, record_missing: false });
        }
        self.subscriptions.put(record).await?;
        Ok(())
    }

    /// Subscribes the channel to `slug` and every descendant. Descendants
    /// that already carry an entry for the channel are left untouched, so
    /// a retry after a partial cascade only fills the remaining gaps. The
    /// root itself is subscribed last, with the deep flag; if the root
    /// pair already exists this reports `AlreadySubscribed` after the
    /// descendant fill has run.
    pub async fn subscribe_all(
        &self,
        kind: NodeKind,
        slug: &str,
        channel: &ChannelId,
    ) -> Result<CascadeReport, EngineError> {
        if !kind.allows_cascade() {
            return Err(EngineError::InvalidScope { kind });
        }
        let root = self.resolver.resolve(kind, slug).await?;
        let descendants = self.resolver.children(&root).await?;

        let mut report = CascadeReport::new(&root.slug);
        let mut writes = Vec::new();
        for (node, read) in self.read_records(&descendants).await {
            match read {
                Ok(existing) => {
                    let mut record = existing
                        .unwrap_or_else(|| SubscriptionRecord::new(node.kind, &node.slug));
                    if record.push_channel(channel.clone(), false) {
                        writes.push(record);
                    } else {
                        report.unchanged.push(node.slug.clone());
                    }
                }
                Err(error) => report.failed.push(CascadeFailure { slug: node.slug.clone(), error }),
            }
        }
        self.write_records(writes, &mut report).await;

        self.subscribe_node(&root, channel, true).await?;
        Ok(report)
    }

    /// Tears a cascade down: removes the channel from every descendant
    /// record that has it, then from the root. Requires the root entry to
    /// exist with the deep flag; a direct-only root subscription is not
    /// unwound this way.
    pub async fn unsubscribe_all(
        &self,
        kind: NodeKind,
        slug: &str,
        channel: &ChannelId,
    ) -> Result<CascadeReport, EngineError> {
        if !kind.allows_cascade() {
            return Err(EngineError::InvalidScope { kind });
        }
        let root = self.resolver.resolve(kind, slug).await?;
        let Some(mut root_record) = self.subscriptions.get(&root.slug).await? else {
            return Err(EngineError::NoDeepSubscription { slug: root.slug });
        };
        if root_record.deep_for(channel) != Some(true) {
            return Err(EngineError::NoDeepSubscription { slug: root.slug });
        }
        let descendants = self.resolver.children(&root).await?;

        let mut report = CascadeReport::new(&root.slug);
        let mut writes = Vec::new();
        for (node, read) in self.read_records(&descendants).await {
            match read {
                Ok(Some(mut record)) => {
                    if record.remove_channel(channel) {
                        writes.push(record);
                    } else {
                        report.unchanged.push(node.slug.clone());
                    }
                }
                Ok(None) => report.unchanged.push(node.slug.clone()),
                Err(error) => report.failed.push(CascadeFailure { slug: node.slug.clone(), error }),
            }
        }
        self.write_records(writes, &mut report).await;

        root_record.remove_channel(channel);
        self.subscriptions.put(root_record).await?;
        Ok(report)
    }

    async fn subscribe_node(
        &self,
        node: &Node,
        channel: &ChannelId,
        deep: bool,
    ) -> Result<(), EngineError> {
        let mut record = self
            .subscriptions
            .get(&node.slug)
            .await?
            .unwrap_or_else(|| SubscriptionRecord::new(node.kind, &node.slug));
        if !record.push_channel(channel.clone(), deep) {
            return Err(EngineError::AlreadySubscribed { slug: node.slug.clone() });
        }
        self.subscriptions.put(record).await?;
        Ok(())
    }

    /// Fetches every descendant record concurrently. All reads complete
    /// before the caller computes any write.
    async fn read_records<'a>(
        &self,
        nodes: &'a [Node],
    ) -> Vec<(&'a Node, Result<Option<SubscriptionRecord>, StoreError>)> {
        let reads = join_all(nodes.iter().map(|node| {
            let store = Arc::clone(&self.subscriptions);
            async move { store.get(&node.slug).await }
        }))
        .await;
        nodes.iter().zip(reads).collect()
    }

    /// Issues the computed writes concurrently. A failed write is logged
    /// and recorded in the report without touching its siblings.
    async fn write_records(&self, records: Vec<SubscriptionRecord>, report: &mut CascadeReport) {
        let outcomes = join_all(records.into_iter().map(|record| {
            let store = Arc::clone(&self.subscriptions);
            async move {
                let slug = record.slug.clone();
                (slug, store.put(record).await)
            }
        }))
        .await;

        for (slug, outcome) in outcomes {
            match outcome {
                Ok(()) => report.applied.push(slug),
                Err(error) => {
                    warn!(root = %report.root, slug = %slug, error = %error, "cascade write failed");
                    report.failed.push(CascadeFailure { slug, error });
                }
            }
        }
    }
}
