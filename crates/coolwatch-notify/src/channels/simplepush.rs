use async_trait::async_trait;
use serde_json::Value;

use crate::error::{NotifyError, Result};
use crate::NotificationChannel;

const SIMPLEPUSH_URL: &str = "https://api.simplepush.io/send";

pub struct SimplePushChannel {
    client: reqwest::Client,
    key: String,
}

impl SimplePushChannel {
    pub fn new(key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            key: key.to_string(),
        }
    }

    fn payload(&self, title: &str, message: &str) -> Value {
        serde_json::json!({
            "key": self.key,
            "title": title,
            "msg": message,
        })
    }
}

#[async_trait]
impl NotificationChannel for SimplePushChannel {
    async fn send(&self, title: &str, message: &str) -> Result<()> {
        let resp = self
            .client
            .post(SIMPLEPUSH_URL)
            .json(&self.payload(title, message))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                service: "simplepush".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Notification sent via SimplePush");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "simplepush"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_key_title_and_message() {
        let channel = SimplePushChannel::new("AbCdEf");
        let payload = channel.payload("Temperature Alert", "15°C < 22°C");
        assert_eq!(payload["key"], "AbCdEf");
        assert_eq!(payload["title"], "Temperature Alert");
        assert_eq!(payload["msg"], "15°C < 22°C");
    }
}
