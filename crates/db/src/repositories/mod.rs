//! Store implementations behind the collaborator traits in
//! `okrbot-core::stores`: SQLite-backed for the running service,
//! in-memory for tests and seeding.

pub mod catalog;
pub mod memory;
pub mod subscription;

pub use catalog::SqlCatalogStore;
pub use memory::{InMemoryCatalogStore, InMemorySubscriptionStore};
pub use subscription::SqlSubscriptionStore;

use okrbot_core::stores::StoreError;

pub(crate) fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}
