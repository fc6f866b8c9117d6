use okrbot_core::config::{AppConfig, LoadOptions};
use okrbot_db::fixtures::{oslo_demo_dataset, seed_catalog};
use okrbot_db::{connect, migrations};

use super::{block_on, CommandResult};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("seed", "config", error.to_string(), 2),
    };

    let outcome = block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| format!("failed to apply migrations: {error}"))?;
        let report = seed_catalog(&pool, &oslo_demo_dataset())
            .await
            .map_err(|error| format!("failed to seed demo catalog: {error}"))?;
        pool.close().await;
        Ok(report)
    });

    match outcome {
        Ok(report) => CommandResult::success(
            "seed",
            format!(
                "demo catalog seeded: {} organizations, {} departments, {} products",
                report.organizations, report.departments, report.products
            ),
        ),
        Err(message) => CommandResult::failure("seed", "database", message, 3),
    }
}
