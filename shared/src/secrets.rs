//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;

use crate::{Error, Result};

/// Bot credentials stored as a JSON secret.
///
/// Every field is optional; values present in the environment take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct BotSecret {
    pub channel_secret: Option<String>,
    pub channel_token: Option<String>,
    pub api_key: Option<String>,
}

/// Get a secret value from Secrets Manager.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    Ok(secret_string)
}

/// Get bot credentials from Secrets Manager.
pub async fn get_bot_secret(client: &SecretsClient, secret_arn: &str) -> Result<BotSecret> {
    let secret_string = get_secret(client, secret_arn).await?;
    parse_bot_secret(&secret_string)
}

fn parse_bot_secret(raw: &str) -> Result<BotSecret> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Config(format!("Failed to parse bot credentials: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bot_secret() {
        let json = r#"{"channel_secret":"abc","channel_token":"tok","api_key":"k123"}"#;
        let secret = parse_bot_secret(json).unwrap();
        assert_eq!(secret.channel_secret, Some("abc".to_string()));
        assert_eq!(secret.channel_token, Some("tok".to_string()));
        assert_eq!(secret.api_key, Some("k123".to_string()));
    }

    #[test]
    fn test_parse_partial_bot_secret() {
        let secret = parse_bot_secret(r#"{"api_key":"k123"}"#).unwrap();
        assert!(secret.channel_secret.is_none());
        assert_eq!(secret.api_key.as_deref(), Some("k123"));
    }

    #[test]
    fn test_parse_invalid_bot_secret() {
        assert!(matches!(parse_bot_secret("not json"), Err(Error::Config(_))));
    }
}
