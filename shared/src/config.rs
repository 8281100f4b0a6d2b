//! Configuration management for the webhook Lambda.

use std::env;
use std::time::Duration;

use crate::secrets::BotSecret;
use crate::{Error, Result};

/// Default Hot Pepper Gourmet search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://webservice.recruit.co.jp/hotpepper/gourmet/v1/";

/// Default LINE Messaging API host.
pub const DEFAULT_LINE_API_URL: &str = "https://api.line.me";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

/// Application configuration loaded once per cold start.
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE channel secret (signature verification)
    pub channel_secret: String,
    /// LINE channel access token (reply API)
    pub channel_token: String,
    /// Hot Pepper API key
    pub api_key: String,
    /// Shop search endpoint
    pub search_url: String,
    /// LINE Messaging API host
    pub line_api_url: String,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
    /// Reject requests whose X-Line-Signature does not match
    pub verify_signature: bool,
    /// Reply with a text fallback instead of failing when the search API errors
    pub search_failure_fallback: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Credentials absent from the environment are taken from `secret` when given.
    pub fn from_env(secret: Option<BotSecret>) -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok(), secret)
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F, secret: Option<BotSecret>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = secret.unwrap_or_default();
        let required = |key: &str, fallback: Option<String>| -> Result<String> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .or(fallback.filter(|v| !v.is_empty()))
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("Invalid HTTP_TIMEOUT_SECS: {}", e)))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            channel_secret: required("LINE_BOT_CHANNEL_SECRET", secret.channel_secret)?,
            channel_token: required("LINE_BOT_CHANNEL_TOKEN", secret.channel_token)?,
            api_key: required("API_KEY", secret.api_key)?,
            search_url: lookup("HOTPEPPER_API_URL").unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            line_api_url: lookup("LINE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LINE_API_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout),
            verify_signature: parse_flag(lookup("LINE_VERIFY_SIGNATURE"), true),
            search_failure_fallback: parse_flag(lookup("SEARCH_FAILURE_FALLBACK"), false),
        })
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("TRUE") | Some("yes") => true,
        Some("0") | Some("false") | Some("FALSE") | Some("no") => false,
        _ => default,
    }
}
