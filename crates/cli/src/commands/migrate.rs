use okrbot_core::config::{AppConfig, LoadOptions};
use okrbot_db::{connect, migrations};

use super::{block_on, CommandResult};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("migrate", "config", error.to_string(), 2),
    };

    let outcome = block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| format!("failed to apply migrations: {error}"))?;
        pool.close().await;
        Ok(())
    });

    match outcome {
        Ok(()) => CommandResult::success(
            "migrate",
            format!("pending migrations applied to {}", config.database.url),
        ),
        Err(message) => CommandResult::failure("migrate", "database", message, 3),
    }
}
