//! Process-wide configuration.
//!
//! Loaded once at startup (after `.env` is applied) and passed down to the
//! client constructors. Nothing else in the crate reads the environment.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use std::net::SocketAddr;
use tracing::info;

pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// Textract's synchronous API rejects documents above 10 MB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Region and credential values for the AWS clients.
#[derive(Clone)]
pub struct AwsSettings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub aws: AwsSettings,
    pub model_id: String,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("{} environment variable not set", key))
        };

        let aws = AwsSettings {
            region: require("AWS_REGION")?,
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            session_token: get("AWS_SESSION_TOKEN"),
        };

        let model_id = get("BEDROCK_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_UPLOAD_BYTES is not a number: {}", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            aws,
            model_id,
            bind_addr,
            max_upload_bytes,
        })
    }
}

/// Build the shared AWS SDK config from explicit settings.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        settings.session_token.clone(),
        None,
        "pdf-analyzer-config",
    );

    info!("Building AWS SDK config for region {}", settings.region);

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .load()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("AWS_REGION", "us-east-1"),
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "secret"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.aws.session_token.is_none());
    }

    #[test]
    fn test_missing_credentials_fail() {
        let err = AppConfig::from_lookup(lookup_from(&[("AWS_REGION", "eu-west-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("AWS_ACCESS_KEY_ID"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("AWS_REGION", "  ");
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BEDROCK_MODEL_ID", "anthropic.claude-3-haiku-20240307-v1:0"));
        pairs.push(("BIND_ADDR", "127.0.0.1:8080"));
        pairs.push(("MAX_UPLOAD_BYTES", "2048"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.model_id, "anthropic.claude-3-haiku-20240307-v1:0");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret\""));
        assert!(debug.contains("***"));
    }
}
