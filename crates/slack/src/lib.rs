//! Slack surface of the OKR notification bot.
//!
//! - **Slash command dispatch** (`commands`) — parses the `/okr` command
//!   text into a typed command, routes it through the subscription
//!   engine, and flattens every outcome into a reply the chat platform
//!   accepts (always HTTP 200, body text only on help/error).
//! - **Block Kit payloads** (`blocks`) — the help message and the
//!   builders behind it.
//! - **Notifier** (`notifier`) — `chat.postMessage` confirmations via
//!   the Slack Web API, fire-and-forget from the dispatcher's view.

pub mod blocks;
pub mod commands;
pub mod notifier;
