pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{oslo_demo_dataset, seed_catalog, seed_memory, SeedDataset, SeedReport};
