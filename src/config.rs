use std::time::Duration;

use anyhow::{Context, bail};

#[derive(Clone, Debug)]
pub struct Config {
    pub feed_url: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_base: String,
    pub database_url: String,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| -> anyhow::Result<String> {
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => bail!("{key} must be set"),
            }
        };
        let seconds = |key: &str, default: u64| -> anyhow::Result<Duration> {
            let secs = match lookup(key) {
                Some(raw) => raw.trim().parse().with_context(|| format!("{key}={raw:?}"))?,
                None => default,
            };
            Ok(Duration::from_secs(secs))
        };

        let feed_url = required("FEED_URL")?;
        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let telegram_chat_id = required("TELEGRAM_CHAT_ID")?;

        let telegram_api_base = lookup("TELEGRAM_API_BASE")
            .unwrap_or_else(|| "https://api.telegram.org".to_string());
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://reelfeed.db?mode=rwc".to_string());

        let poll_interval = seconds("POLL_INTERVAL_SECS", 3600)?;
        let http_timeout = seconds("HTTP_TIMEOUT_SECS", 30)?;

        let user_agent = lookup("USER_AGENT").unwrap_or_else(|| "reelfeed/0.1".to_string());

        Ok(Self {
            feed_url,
            telegram_bot_token,
            telegram_chat_id,
            telegram_api_base,
            database_url,
            poll_interval,
            http_timeout,
            user_agent,
        })
    }
}
