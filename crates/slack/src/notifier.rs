use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use okrbot_core::domain::subscription::ChannelId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageId(pub String);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("chat transport error: {0}")]
    Transport(String),
    #[error("chat api error: {0}")]
    Api(String),
}

/// Confirmation channel back into the chat workspace. Callers treat it
/// as fire-and-forget: a failed post is logged, never reported to the
/// commanding user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post_message(&self, channel: &ChannelId, text: &str)
        -> Result<MessageId, NotifyError>;
}

const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// `chat.postMessage` over the Slack Web API.
pub struct WebApiNotifier {
    http: reqwest::Client,
    bot_token: SecretString,
    base_url: String,
}

impl WebApiNotifier {
    pub fn new(bot_token: SecretString) -> Self {
        Self::with_base_url(bot_token, DEFAULT_BASE_URL)
    }

    /// Point the notifier at a different API root (test servers).
    pub fn with_base_url(bot_token: SecretString, base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), bot_token, base_url: base_url.into() }
    }
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Notifier for WebApiNotifier {
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> Result<MessageId, NotifyError> {
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&PostMessageRequest { channel: &channel.0, text })
            .send()
            .await
            .map_err(|error| NotifyError::Transport(error.to_string()))?;

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|error| NotifyError::Transport(error.to_string()))?;

        if !body.ok {
            return Err(NotifyError::Api(body.error.unwrap_or_else(|| "unknown".to_owned())));
        }
        Ok(MessageId(body.ts.unwrap_or_default()))
    }
}

/// Stand-in for when no bot token is configured: commands still work,
/// confirmations go nowhere.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn post_message(
        &self,
        _channel: &ChannelId,
        _text: &str,
    ) -> Result<MessageId, NotifyError> {
        Ok(MessageId("noop".to_owned()))
    }
}

/// Test notifier that captures every message it is asked to post.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.messages.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn post_message(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> Result<MessageId, NotifyError> {
        let mut messages = self.messages.lock().expect("notifier lock");
        messages.push((channel.0.clone(), text.to_owned()));
        Ok(MessageId(format!("{}.0", messages.len())))
    }
}

#[cfg(test)]
mod tests {
    use okrbot_core::domain::subscription::ChannelId;

    use super::{Notifier, RecordingNotifier};

    #[tokio::test]
    async fn recording_notifier_captures_posts_in_order() {
        let notifier = RecordingNotifier::default();
        notifier.post_message(&ChannelId("C1".into()), "first").await.expect("post");
        notifier.post_message(&ChannelId("C2".into()), "second").await.expect("post");

        assert_eq!(
            notifier.sent(),
            [("C1".to_owned(), "first".to_owned()), ("C2".to_owned(), "second".to_owned())]
        );
    }
}
