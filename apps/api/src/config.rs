use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Application configuration loaded from environment variables.
/// Start-up fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Absent key means proposals are generated in template mode only.
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: String,
    pub llm_retry_attempts: u32,
    pub llm_retry_delay: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_retry_attempts: u32 = optional_env("LLM_RETRY_ATTEMPTS", 3)?;
        if llm_retry_attempts == 0 {
            bail!("LLM_RETRY_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            anthropic_base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            llm_retry_attempts,
            llm_retry_delay: Duration::from_millis(optional_env("LLM_RETRY_DELAY_MS", 500)?),
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_env_falls_back_to_default() {
        let value: u32 = optional_env("BIDSMITH_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_optional_env_rejects_garbage() {
        std::env::set_var("BIDSMITH_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = optional_env("BIDSMITH_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
    }

    #[test]
    fn test_require_env_names_the_missing_key() {
        let err = require_env("BIDSMITH_TEST_MISSING_KEY").unwrap_err();
        assert!(err.to_string().contains("BIDSMITH_TEST_MISSING_KEY"));
    }
}
