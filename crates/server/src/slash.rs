use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use okrbot_slack::commands::{
    CommandReply, CommandRouter, EngineCommandService, SlashCommandPayload,
};

#[derive(Clone)]
pub struct SlashState {
    router: Arc<CommandRouter<EngineCommandService>>,
}

/// The urlencoded body Slack posts for a slash command. Every field is
/// defaulted: a missing `text` must land in the help path, not a 422.
#[derive(Debug, Default, Deserialize)]
pub struct SlashCommandForm {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub user_id: String,
}

pub fn router(service: EngineCommandService) -> Router {
    Router::new()
        .route("/slack/command", post(slash_command))
        .with_state(SlashState { router: Arc::new(CommandRouter::new(service)) })
}

/// Always answers 200: the chat platform shows the body to the user,
/// and non-200 responses would surface as a platform-side error
/// instead of our help/error text.
pub async fn slash_command(
    State(state): State<SlashState>,
    Form(form): Form<SlashCommandForm>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let payload = SlashCommandPayload {
        command: form.command,
        text: form.text,
        channel_id: form.channel_id,
        channel_name: form.channel_name,
        user_id: form.user_id,
        request_id: request_id.clone(),
    };

    info!(
        event_name = "ingress.slack.command_received",
        correlation_id = %request_id,
        channel_id = %payload.channel_id,
        command_text = %payload.text,
        "slash command received"
    );

    match state.router.route(&payload).await {
        CommandReply::Empty => StatusCode::OK.into_response(),
        CommandReply::Text(text) => (StatusCode::OK, text).into_response(),
        CommandReply::Help(template) => (StatusCode::OK, Json(template)).into_response(),
    }
}
