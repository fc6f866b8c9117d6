//! Core domain of the OKR notification bot: the catalog hierarchy, the
//! per-slug subscription records, and the engine that moves channels
//! between unsubscribed, directly subscribed, and deeply subscribed —
//! including the cascading fan-out over a node's descendants.
//!
//! External effects are behind injected collaborator traits
//! ([`stores::CatalogStore`], [`stores::SubscriptionStore`]); real
//! backends live in `okrbot-db`, the Slack surface in `okrbot-slack`.

pub mod config;
pub mod domain;
pub mod engine;
pub mod hierarchy;
pub mod stores;

pub use domain::node::{Node, NodeId, NodeKind, ParseNodeKindError};
pub use domain::subscription::{ChannelId, ChannelSubscription, SubscriptionRecord};
pub use engine::{CascadeFailure, CascadeReport, EngineError, SubscriptionEngine};
pub use hierarchy::{HierarchyResolver, ResolveError};
pub use stores::{CatalogStore, StoreError, SubscriptionStore};
