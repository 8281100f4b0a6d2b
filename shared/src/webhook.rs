//! Webhook request handling: signature check, parsing, dispatch.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::dispatch::{DispatchSummary, Dispatcher};
use crate::reply::LineReplyClient;
use crate::search::HotPepperClient;
use crate::{events, signature, Config, Error, Result};

/// Body returned with status 200 when a request is rejected, so LINE does not redeliver.
pub const CONNECTION_ERROR_BODY: &str = "接続エラー";

/// Outcome returned to the invoking platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status_code: u16,
    pub body: String,
}

impl WebhookResponse {
    fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }
}

pub struct WebhookHandler {
    dispatcher: Dispatcher,
    channel_secret: String,
    verify_signature: bool,
}

impl WebhookHandler {
    pub fn new(dispatcher: Dispatcher, channel_secret: String, verify_signature: bool) -> Self {
        Self {
            dispatcher,
            channel_secret,
            verify_signature,
        }
    }

    /// Build the search and reply clients once from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let searcher = HotPepperClient::new(
            config.search_url.clone(),
            config.api_key.clone(),
            config.http_timeout,
        )?;
        let replier = LineReplyClient::new(
            &config.line_api_url,
            config.channel_token.clone(),
            config.http_timeout,
        )?;

        let dispatcher = Dispatcher::new(Arc::new(searcher), Arc::new(replier))
            .with_search_failure_fallback(config.search_failure_fallback);

        Ok(Self::new(
            dispatcher,
            config.channel_secret.clone(),
            config.verify_signature,
        ))
    }

    /// Handle one webhook delivery.
    ///
    /// Signature and parse failures answer 200 with [`CONNECTION_ERROR_BODY`];
    /// search and reply failures are returned as errors.
    pub async fn handle(&self, body: &str, signature: Option<&str>) -> Result<WebhookResponse> {
        match self.process(body, signature).await {
            Ok(summary) => {
                info!(
                    replies_sent = summary.replies_sent,
                    events_ignored = summary.events_ignored,
                    "Webhook delivery complete"
                );
                Ok(WebhookResponse::ok(body))
            }
            Err(e) if e.is_rejected_request() => {
                warn!(error = %e, "Rejected webhook request");
                Ok(WebhookResponse::ok(CONNECTION_ERROR_BODY))
            }
            Err(e) => Err(e),
        }
    }

    /// Handle one delivery, giving up once `budget` has elapsed.
    ///
    /// Dropping the handling future on expiry cancels the in-flight search,
    /// and no reply is attempted afterwards.
    pub async fn handle_within(
        &self,
        body: &str,
        signature: Option<&str>,
        budget: Duration,
    ) -> Result<WebhookResponse> {
        match tokio::time::timeout(budget, self.handle(body, signature)).await {
            Ok(result) => result,
            Err(_) => {
                error!(budget_ms = budget.as_millis() as u64, "Invocation deadline reached, aborting");
                Err(Error::Deadline(format!(
                    "Handling exceeded {}ms",
                    budget.as_millis()
                )))
            }
        }
    }

    async fn process(&self, body: &str, signature: Option<&str>) -> Result<DispatchSummary> {
        if self.verify_signature {
            let provided = signature
                .ok_or_else(|| Error::Signature("Missing X-Line-Signature header".to_string()))?;
            signature::verify(&self.channel_secret, provided, body.as_bytes())?;
        }

        let events = events::parse(body.as_bytes())?;
        info!(events = events.len(), "Received LINE events");

        self.dispatcher.dispatch(&events).await
    }
}
