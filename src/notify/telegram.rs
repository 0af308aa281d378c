// Telegram delivery
//
// Messages are Markdown formatted and sent through the Bot API
// `sendMessage` endpoint. Delivery failures never leave this module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    error::{AppError, AppResult},
    notify::{NotificationSink, NotifyTarget},
};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Telegram Bot API client
pub struct TelegramNotifier {
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new() -> Self {
        Self::with_api_base(TELEGRAM_API)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }

    async fn deliver(&self, text: &str, target: &NotifyTarget) -> AppResult<()> {
        let request = SendMessageRequest {
            chat_id: &target.chat_id,
            text,
            parse_mode: "Markdown",
        };

        let response = self
            .client
            .post(self.endpoint(&target.bot_token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body: SendMessageResponse = response.json().await?;

        if !status.is_success() || !body.ok {
            return Err(AppError::Notification(format!(
                "Telegram API error ({}): {}",
                status,
                body.description.unwrap_or_default()
            )));
        }

        Ok(())
    }
}

impl Default for TelegramNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, text: &str, target: &NotifyTarget) {
        match self.deliver(text, target).await {
            Ok(()) => debug!("📨 Telegram message delivered to chat {}", target.chat_id),
            Err(e) => error!("Failed to send Telegram message: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let notifier = TelegramNotifier::with_api_base("https://example.test/");
        assert_eq!(
            notifier.endpoint("123:abc"),
            "https://example.test/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_request_body() {
        let request = SendMessageRequest {
            chat_id: "-100200",
            text: "✅ *era 42*",
            parse_mode: "Markdown",
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "chat_id": "-100200",
                "text": "✅ *era 42*",
                "parse_mode": "Markdown",
            })
        );
    }

    #[tokio::test]
    async fn test_delivery_error_hides_bot_token() {
        let notifier = TelegramNotifier::with_api_base("http://127.0.0.1:9");
        let target = NotifyTarget::from_parts(Some("123456:SECRET-token"), Some("42")).unwrap();

        let err = notifier.deliver("hello", &target).await.unwrap_err();

        assert!(matches!(err, AppError::Notification(_)));
        assert!(!err.to_string().contains("SECRET-token"), "{}", err);
        assert!(!format!("{:?}", err).contains("SECRET-token"));
    }

    #[tokio::test]
    async fn test_send_swallows_transport_errors() {
        // nothing listens on port 9 locally; delivery fails and is only logged
        let notifier = TelegramNotifier::with_api_base("http://127.0.0.1:9");
        let target = NotifyTarget::from_parts(Some("123:abc"), Some("42")).unwrap();

        notifier.send("hello", &target).await;
    }
}
