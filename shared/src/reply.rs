//! LINE reply messages and the reply API client.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::carousel::{Carousel, ALT_TEXT};
use crate::{Error, Result};

/// Outbound message sent with a reply token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text {
        text: String,
    },
    Template {
        #[serde(rename = "altText")]
        alt_text: String,
        template: Carousel,
    },
}

impl ReplyMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyMessage::Text { text: text.into() }
    }

    pub fn carousel(carousel: Carousel) -> Self {
        ReplyMessage::Template {
            alt_text: ALT_TEXT.to_string(),
            template: carousel,
        }
    }
}

/// Reply API request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [ReplyMessage],
}

/// Delivers replies to the messaging platform.
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// Send `messages` once for `reply_token`; failures are reported synchronously.
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> Result<()>;
}

/// Client for the LINE Messaging API reply endpoint.
pub struct LineReplyClient {
    http_client: reqwest::Client,
    endpoint: String,
    channel_token: String,
}

impl LineReplyClient {
    pub fn new(api_base_url: &str, channel_token: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/v2/bot/message/reply", api_base_url.trim_end_matches('/')),
            channel_token,
        })
    }
}

#[async_trait]
impl ReplySender for LineReplyClient {
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> Result<()> {
        let request = ReplyRequest {
            reply_token,
            messages: &messages,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.channel_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Reply(format!("Failed to send reply: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("LINE reply failed: {} - {}", status, body);
            return Err(Error::Reply(format!("LINE reply failed: {}", status)));
        }

        info!(reply_token, messages = messages.len(), "Reply sent");
        Ok(())
    }
}
