use crate::error::{Error, Result};
use std::env;

const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";

/// Process configuration. Both secrets are required; a missing one is fatal
/// before the bot starts polling.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub news_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Ok(Self {
            telegram_token: require_var(TELEGRAM_TOKEN_VAR)?,
            news_api_key: require_var(NEWS_API_KEY_VAR)?,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "required environment variable {} is not set",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_is_a_config_error() {
        env::remove_var("CRYPTO_BOT_TEST_UNSET");
        let err = require_var("CRYPTO_BOT_TEST_UNSET").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn blank_secret_is_rejected() {
        env::set_var("CRYPTO_BOT_TEST_BLANK", "   ");
        let err = require_var("CRYPTO_BOT_TEST_BLANK").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        env::remove_var("CRYPTO_BOT_TEST_BLANK");
    }

    #[test]
    fn present_secret_is_returned() {
        env::set_var("CRYPTO_BOT_TEST_SET", "secret");
        assert_eq!(require_var("CRYPTO_BOT_TEST_SET").unwrap(), "secret");
        env::remove_var("CRYPTO_BOT_TEST_SET");
    }
}
