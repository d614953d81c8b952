//! Best-effort chat notifications.
//!
//! Sends plain messages or messages with inline approve/reject actions
//! through the Telegram Bot API. Delivery is fire-and-forget: failures
//! are logged and never propagated to the surrounding operation. An
//! empty bot token disables sending entirely, which is also what the
//! test harness relies on.

use gigboard_core::types::{DbId, ExternalId};
use gigboard_db::models::post::Post;
use gigboard_db::models::site_config::SiteConfig;
use serde_json::{json, Value};

/// Callback-data prefix for admin approval actions.
pub const CALLBACK_APPROVE_PREFIX: &str = "approve_post_";

/// Callback-data prefix for admin rejection actions.
pub const CALLBACK_REJECT_PREFIX: &str = "reject_post_";

#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    api_base: String,
}

impl Notifier {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Plain message to the admin channel from the site configuration.
    pub async fn send_admin_message(&self, config: &SiteConfig, text: &str) {
        let body = json!({
            "chat_id": config.admin_chat_id,
            "text": text,
        });
        self.send(config, &body).await;
    }

    /// Review prompt to the admin channel: post summary plus inline
    /// approve/reject buttons carrying the post id.
    pub async fn send_review_prompt(&self, config: &SiteConfig, post: &Post) {
        let body = json!({
            "chat_id": config.admin_chat_id,
            "text": review_message_text(post),
            "reply_markup": review_keyboard(post.id),
        });
        self.send(config, &body).await;
    }

    /// Plain message to an end user's chat.
    pub async fn send_user_message(&self, config: &SiteConfig, chat_id: ExternalId, text: &str) {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        self.send(config, &body).await;
    }

    async fn send(&self, config: &SiteConfig, body: &Value) {
        if config.notification_bot_token.is_empty() {
            tracing::debug!("Notification bot token not configured, skipping send");
            return;
        }

        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base, config.notification_bot_token
        );
        match self.http.post(&url).json(body).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Notification send rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notification send failed");
            }
        }
    }
}

/// Inline keyboard with the two admin actions for a post.
pub fn review_keyboard(post_id: DbId) -> Value {
    json!({
        "inline_keyboard": [[
            { "text": "Approve", "callback_data": format!("{CALLBACK_APPROVE_PREFIX}{post_id}") },
            { "text": "Reject", "callback_data": format!("{CALLBACK_REJECT_PREFIX}{post_id}") },
        ]]
    })
}

/// Admin-facing summary of a post awaiting review.
pub fn review_message_text(post: &Post) -> String {
    format!(
        "Post #{id} awaiting review\n\n{title}\n{description}\n\nPrice: {price} {currency}",
        id = post.id,
        title = post.title,
        description = post.description,
        price = post.price,
        currency = post.currency,
    )
}
