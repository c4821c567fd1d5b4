use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::DeliveryError, models::Release, templates};

/// Channel that announces new releases.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, release: &Release) -> Result<(), DeliveryError>;
}

pub struct TelegramNotifier {
    client: wreq::Client,
    bot_token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(client: wreq::Client, bot_token: String, chat_id: String, base_url: String) -> Self {
        Self { client, bot_token, chat_id, base_url }
    }

    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url.trim_end_matches('/'), self.bot_token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        let resp = self.client.post(url).json(&body).send().await?;
        let status = resp.status().as_u16();
        let raw = resp.text().await?;

        check_response(status, &raw)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, release: &Release) -> Result<(), DeliveryError> {
        let text = templates::release_message(release);
        debug!(chat_id = %self.chat_id, title = %release.title, "sending telegram message");
        self.send_message(&text).await
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error_code: Option<i64>,
    description: Option<String>,
}

/// Bot API replies carry `ok: false` plus a description on failure, for
/// both 4xx and 5xx statuses.
fn check_response(status: u16, raw: &str) -> Result<(), DeliveryError> {
    match serde_json::from_str::<ApiResponse>(raw) {
        Ok(ApiResponse { ok: true, .. }) => Ok(()),
        Ok(resp) => Err(DeliveryError::Rejected {
            code: resp.error_code.unwrap_or(i64::from(status)),
            description: resp.description.unwrap_or_default(),
        }),
        Err(_) => Err(DeliveryError::Rejected {
            code: i64::from(status),
            description: raw.chars().take(200).collect(),
        }),
    }
}
