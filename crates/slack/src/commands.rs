use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use okrbot_core::domain::node::NodeKind;
use okrbot_core::domain::subscription::ChannelId;
use okrbot_core::engine::{CascadeReport, EngineError, SubscriptionEngine};

use crate::blocks::{self, MessageTemplate};
use crate::notifier::Notifier;

/// The form fields Slack posts for a slash command invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub request_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubscriptionCommand {
    Subscribe { kind: NodeKind, slug: String },
    Unsubscribe { kind: NodeKind, slug: String },
    SubscribeAll { kind: NodeKind, slug: String },
    UnsubscribeAll { kind: NodeKind, slug: String },
    Help,
}

/// Parses the free-text field into `[action, scope, slug]`.
///
/// Anything that does not parse — empty text, unknown action, unknown
/// scope, missing slug — falls back to `Help` rather than an error.
/// Tokens after the first three are ignored. A `/all` action with a
/// product scope parses fine; the engine rejects it as an invalid
/// scope, which gives the user a pointed message instead of the full
/// help text.
pub fn parse_subscription_command(text: &str) -> SubscriptionCommand {
    let mut tokens = text.split_whitespace();
    let (Some(action), Some(scope), Some(slug)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return SubscriptionCommand::Help;
    };
    let Ok(kind) = scope.to_ascii_lowercase().parse::<NodeKind>() else {
        return SubscriptionCommand::Help;
    };
    let slug = slug.to_owned();

    match action.to_ascii_lowercase().as_str() {
        "subscribe" => SubscriptionCommand::Subscribe { kind, slug },
        "unsubscribe" => SubscriptionCommand::Unsubscribe { kind, slug },
        "subscribe/all" => SubscriptionCommand::SubscribeAll { kind, slug },
        "unsubscribe/all" => SubscriptionCommand::UnsubscribeAll { kind, slug },
        _ => SubscriptionCommand::Help,
    }
}

/// What goes back over the slash-command HTTP response. The transport
/// always answers 200; this only decides the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandReply {
    /// Success: empty body, confirmation arrives via the notifier.
    Empty,
    /// A short human-readable error line.
    Text(String),
    /// The Block Kit usage message.
    Help(MessageTemplate),
}

#[async_trait]
pub trait SubscriptionCommandService: Send + Sync {
    async fn subscribe(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply;

    async fn unsubscribe(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply;

    async fn subscribe_all(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply;

    async fn unsubscribe_all(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply;
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: SubscriptionCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(&self, payload: &SlashCommandPayload) -> CommandReply {
        match parse_subscription_command(&payload.text) {
            SubscriptionCommand::Subscribe { kind, slug } => {
                self.service.subscribe(kind, &slug, payload).await
            }
            SubscriptionCommand::Unsubscribe { kind, slug } => {
                self.service.unsubscribe(kind, &slug, payload).await
            }
            SubscriptionCommand::SubscribeAll { kind, slug } => {
                self.service.subscribe_all(kind, &slug, payload).await
            }
            SubscriptionCommand::UnsubscribeAll { kind, slug } => {
                self.service.unsubscribe_all(kind, &slug, payload).await
            }
            SubscriptionCommand::Help => CommandReply::Help(blocks::help_message()),
        }
    }
}

/// The production service: drives the subscription engine and posts
/// confirmations through the notifier.
pub struct EngineCommandService {
    engine: SubscriptionEngine,
    notifier: Arc<dyn Notifier>,
}

impl EngineCommandService {
    pub fn new(engine: SubscriptionEngine, notifier: Arc<dyn Notifier>) -> Self {
        Self { engine, notifier }
    }

    /// Fire-and-forget confirmation; a failed post never changes the
    /// command outcome.
    async fn confirm(&self, payload: &SlashCommandPayload, text: &str) {
        let channel = ChannelId(payload.channel_id.clone());
        match self.notifier.post_message(&channel, text).await {
            Ok(message_id) => info!(
                event_name = "egress.slack.confirmation_posted",
                correlation_id = %payload.request_id,
                channel_id = %payload.channel_id,
                channel_name = %payload.channel_name,
                message_id = %message_id.0,
                "confirmation message posted"
            ),
            Err(error) => warn!(
                event_name = "egress.slack.confirmation_failed",
                correlation_id = %payload.request_id,
                channel_id = %payload.channel_id,
                error = %error,
                "confirmation message failed to post"
            ),
        }
    }

    fn log_cascade(&self, payload: &SlashCommandPayload, action: &str, report: &CascadeReport) {
        info!(
            event_name = "subscription.cascade.completed",
            correlation_id = %payload.request_id,
            action,
            root = %report.root,
            applied = report.applied.len(),
            unchanged = report.unchanged.len(),
            failed = report.failed.len(),
            "cascade completed"
        );
        for failure in &report.failed {
            warn!(
                event_name = "subscription.cascade.item_failed",
                correlation_id = %payload.request_id,
                action,
                root = %report.root,
                slug = %failure.slug,
                error = %failure.error,
                "cascade item was not applied"
            );
        }
    }

    fn reply_for_error(
        &self,
        payload: &SlashCommandPayload,
        kind: NodeKind,
        error: EngineError,
    ) -> CommandReply {
        let text = match error {
            EngineError::NotFound { kind, .. } => {
                format!("Could not find the {kind}, are you sure you've typed in the correct name?")
            }
            EngineError::AlreadySubscribed { slug } => {
                format!("You have already subscribed to {slug} in this channel")
            }
            EngineError::NotSubscribed { record_missing: true, .. } => {
                format!("No subscription found for {kind}?")
            }
            EngineError::NotSubscribed { record_missing: false, .. } => {
                "You do not have a subscription".to_owned()
            }
            EngineError::NoDeepSubscription { slug } => {
                format!("You do not subscribe to everything for {slug}")
            }
            EngineError::InvalidScope { .. } => {
                "You can only run subscribe/all on a department or organization".to_owned()
            }
            EngineError::Store(store_error) => {
                warn!(
                    event_name = "subscription.store_failure",
                    correlation_id = %payload.request_id,
                    error = %store_error,
                    "subscription update failed"
                );
                "Something went wrong while updating subscriptions, please try again".to_owned()
            }
        };
        CommandReply::Text(text)
    }
}

#[async_trait]
impl SubscriptionCommandService for EngineCommandService {
    async fn subscribe(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply {
        let channel = ChannelId(payload.channel_id.clone());
        match self.engine.subscribe(kind, slug, &channel).await {
            Ok(()) => {
                self.confirm(payload, &format!("You have successfully subscribed to {slug}")).await;
                CommandReply::Empty
            }
            Err(error) => self.reply_for_error(payload, kind, error),
        }
    }

    async fn unsubscribe(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply {
        let channel = ChannelId(payload.channel_id.clone());
        match self.engine.unsubscribe(kind, slug, &channel).await {
            Ok(()) => {
                self.confirm(payload, &format!("You have successfully unsubscribed to {slug}"))
                    .await;
                CommandReply::Empty
            }
            Err(error) => self.reply_for_error(payload, kind, error),
        }
    }

    async fn subscribe_all(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply {
        let channel = ChannelId(payload.channel_id.clone());
        match self.engine.subscribe_all(kind, slug, &channel).await {
            Ok(report) => {
                self.log_cascade(payload, "subscribe/all", &report);
                self.confirm(payload, &format!("You have successfully subscribed to {slug}")).await;
                CommandReply::Empty
            }
            Err(error) => self.reply_for_error(payload, kind, error),
        }
    }

    async fn unsubscribe_all(
        &self,
        kind: NodeKind,
        slug: &str,
        payload: &SlashCommandPayload,
    ) -> CommandReply {
        let channel = ChannelId(payload.channel_id.clone());
        match self.engine.unsubscribe_all(kind, slug, &channel).await {
            Ok(report) => {
                self.log_cascade(payload, "unsubscribe/all", &report);
                self.confirm(payload, &format!("You have successfully unsubscribed to {slug}"))
                    .await;
                CommandReply::Empty
            }
            Err(error) => self.reply_for_error(payload, kind, error),
        }
    }
}
