use async_trait::async_trait;
use serde_json::Value;

use crate::error::{NotifyError, Result};
use crate::NotificationChannel;

pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    fn payload(title: &str, message: &str) -> Value {
        serde_json::json!({
            "title": title,
            "message": message,
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, title: &str, message: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(&Self::payload(title, message))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                service: "webhook".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(url = %self.url, "Notification sent via webhook");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_title_and_message() {
        let payload = WebhookChannel::payload("Temperature Alert", "body");
        assert_eq!(payload["title"], "Temperature Alert");
        assert_eq!(payload["message"], "body");
    }
}
