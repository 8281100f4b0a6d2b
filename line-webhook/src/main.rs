//! LINE Webhook Lambda - Handles LINE Messaging API callbacks.
//!
//! Text messages are echoed back; location messages are answered with a
//! carousel of nearby ramen shops. Configuration and HTTP clients are built
//! once per cold start and reused across invocations.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Config, WebhookHandler, CONNECTION_ERROR_BODY};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Time reserved before the Lambda deadline to return a response.
const DEADLINE_MARGIN: Duration = Duration::from_millis(500);

/// API Gateway proxy request (simplified)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGatewayRequest {
    headers: Option<HashMap<String, String>>,
    body: Option<String>,
    is_base64_encoded: Option<bool>,
}

impl ApiGatewayRequest {
    /// Case-insensitive header lookup.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw request body; the error describes why an encoded body is unreadable.
    fn decoded_body(&self) -> Result<String, String> {
        let body = self.body.clone().unwrap_or_default();
        if !self.is_base64_encoded.unwrap_or(false) {
            return Ok(body);
        }

        let bytes = STANDARD
            .decode(body.as_bytes())
            .map_err(|e| format!("Invalid base64 body: {}", e))?;
        String::from_utf8(bytes).map_err(|e| format!("Body is not UTF-8: {}", e))
    }
}

/// API Gateway proxy response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGatewayResponse {
    status_code: u16,
    headers: HashMap<String, String>,
    body: String,
    is_base64_encoded: bool,
}

impl ApiGatewayResponse {
    fn new(status_code: u16, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/plain; charset=utf-8".to_string());
        Self {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }
    }
}

/// Application state
struct AppState {
    webhook: WebhookHandler,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let secret = match std::env::var("BOT_SECRET_ARN") {
            Ok(arn) => {
                let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws);
                Some(shared::get_bot_secret(&secrets_client, &arn).await?)
            }
            Err(_) => None,
        };

        let config = Config::from_env(secret)?;
        info!(
            search_url = %config.search_url,
            verify_signature = config.verify_signature,
            "Configuration loaded"
        );

        Ok(Self {
            webhook: WebhookHandler::from_config(&config)?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();

    let request: ApiGatewayRequest = serde_json::from_value(payload)?;
    let body = match request.decoded_body() {
        Ok(body) => body,
        Err(reason) => {
            warn!(request_id = %context.request_id, reason = %reason, "Unreadable webhook body");
            return Ok(serde_json::to_value(ApiGatewayResponse::new(
                200,
                CONNECTION_ERROR_BODY.to_string(),
            ))?);
        }
    };
    let signature = request.header("x-line-signature");

    let budget = context
        .deadline()
        .duration_since(SystemTime::now())
        .unwrap_or_default()
        .saturating_sub(DEADLINE_MARGIN);

    let response = state
        .webhook
        .handle_within(&body, signature, budget)
        .await?;

    Ok(serde_json::to_value(ApiGatewayResponse::new(
        response.status_code,
        response.body,
    ))?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    lambda_runtime::run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
