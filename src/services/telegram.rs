use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::core::{Notifier, NotifyError};
use crate::models::ParticipantId;

/// Errors that can occur when building the Telegram client
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP client error: {0}")]
    ClientError(#[from] reqwest::Error),

    #[error("Bot token is not configured")]
    MissingToken,
}

/// Telegram Bot API client used to notify participants
pub struct TelegramNotifier {
    api_base: String,
    bot_token: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(api_base: String, bot_token: String, timeout_secs: u64) -> Result<Self, TelegramError> {
        if bot_token.trim().is_empty() {
            return Err(TelegramError::MissingToken);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            api_base,
            bot_token,
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient: ParticipantId, text: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "chat_id": recipient,
            "text": text,
        });

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("Sent message to {}", recipient);
            return Ok(());
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let description = body
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("no description")
            .to_string();

        Err(NotifyError::Rejected {
            status: status.as_u16(),
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_rejected() {
        let result = TelegramNotifier::new("https://api.telegram.org".into(), "  ".into(), 5);
        assert!(matches!(result, Err(TelegramError::MissingToken)));
    }

    #[test]
    fn test_method_url() {
        let notifier =
            TelegramNotifier::new("https://api.telegram.org/".into(), "123:abc".into(), 5).unwrap();
        assert_eq!(
            notifier.method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[tokio::test]
    async fn test_send_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({ "chat_id": 42 })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let notifier = TelegramNotifier::new(server.url(), "123:abc".into(), 5).unwrap();
        notifier.send(42, "hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_blocked_user() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(403)
            .with_body(r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#)
            .create_async()
            .await;

        let notifier = TelegramNotifier::new(server.url(), "123:abc".into(), 5).unwrap();
        let err = notifier.send(42, "hello").await.unwrap_err();
        assert_eq!(
            err,
            NotifyError::Rejected {
                status: 403,
                description: "Forbidden: bot was blocked by the user".into(),
            }
        );
    }
}
