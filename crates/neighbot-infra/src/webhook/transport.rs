//! Outbound side of the webhook bridge.

use serde::Serialize;

use neighbot_core::conversation::transport::ChatTransport;
use neighbot_types::error::AdapterError;

/// Body POSTed to the callback URL.
#[derive(Debug, Serialize)]
struct Outbound<'a> {
    channel_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    typing: bool,
}

/// Delivers replies and typing notices to the bridge's callback URL.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: reqwest::Client,
    callback_url: String,
    token: String,
    bot_id: String,
}

impl WebhookTransport {
    pub fn new(
        client: reqwest::Client,
        callback_url: impl Into<String>,
        token: impl Into<String>,
        bot_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            callback_url: callback_url.into(),
            token: token.into(),
            bot_id: bot_id.into(),
        }
    }

    async fn post(&self, body: &Outbound<'_>) -> Result<(), AdapterError> {
        self.client
            .post(&self.callback_url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AdapterError::Delivery(e.to_string()))?;
        Ok(())
    }
}

impl ChatTransport for WebhookTransport {
    fn self_id(&self) -> &str {
        &self.bot_id
    }

    fn self_mention(&self) -> String {
        self.mention(&self.bot_id)
    }

    fn mention(&self, user_id: &str) -> String {
        format!("<@{user_id}>")
    }

    async fn typing(&self, channel_id: &str) -> Result<(), AdapterError> {
        self.post(&Outbound {
            channel_id,
            content: None,
            typing: true,
        })
        .await
    }

    async fn send_text(&self, channel_id: &str, text: &str) -> Result<(), AdapterError> {
        self.post(&Outbound {
            channel_id,
            content: Some(text),
            typing: false,
        })
        .await
    }
}
