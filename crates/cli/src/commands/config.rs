use okrbot_core::config::{AppConfig, LoadOptions, LogFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigView {
    database: DatabaseView,
    slack: SlackView,
    server: ServerView,
    logging: LoggingView,
}

#[derive(Debug, Serialize)]
struct DatabaseView {
    url: String,
    max_connections: u32,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct SlackView {
    bot_token: &'static str,
}

#[derive(Debug, Serialize)]
struct ServerView {
    bind_address: String,
    port: u16,
}

#[derive(Debug, Serialize)]
struct LoggingView {
    level: String,
    format: &'static str,
}

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let view = ConfigView {
                database: DatabaseView {
                    url: config.database.url.clone(),
                    max_connections: config.database.max_connections,
                    timeout_secs: config.database.timeout_secs,
                },
                slack: SlackView {
                    bot_token: if config.slack.is_configured() {
                        "***redacted***"
                    } else {
                        "(not set)"
                    },
                },
                server: ServerView {
                    bind_address: config.server.bind_address.clone(),
                    port: config.server.port,
                },
                logging: LoggingView {
                    level: config.logging.level.clone(),
                    format: match config.logging.format {
                        LogFormat::Compact => "compact",
                        LogFormat::Pretty => "pretty",
                        LogFormat::Json => "json",
                    },
                },
            };
            serde_json::to_string_pretty(&view)
                .unwrap_or_else(|error| format!("config serialization failed: {error}"))
        }
        Err(error) => format!("configuration failed to load: {error}"),
    }
}
