//! Notification delivery for temperature alerts.
//!
//! Each supported channel kind is a variant of the closed [`ChannelConfig`]
//! enum, carrying its own credential payload; [`build_channel`] matches the
//! variants exhaustively, so adding a channel kind is a compile-time-checked
//! extension. Delivery failures are surfaced to the caller — channels never
//! retry, since the next scheduled invocation retries naturally.

pub mod channels;
pub mod error;


use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A notification delivery channel that pushes an alert to an external
/// service (e.g., SimplePush, a generic webhook).
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers one notification through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service responds with a
    /// non-success status. Failures are not retried.
    async fn send(&self, title: &str, message: &str) -> Result<()>;

    /// Returns the channel kind name (e.g., `"simplepush"`, `"webhook"`).
    fn channel_name(&self) -> &str;
}

/// Configuration for one notification channel.
///
/// Deserializes from an internally tagged table, e.g.
///
/// ```toml
/// [[notifiers]]
/// type = "simplepush"
/// key = "AbCdEf"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelConfig {
    SimplePush { key: String },
    Webhook { url: String },
}

/// Builds a channel from its configuration.
pub fn build_channel(config: &ChannelConfig) -> Box<dyn NotificationChannel> {
    match config {
        ChannelConfig::SimplePush { key } => {
            Box::new(channels::simplepush::SimplePushChannel::new(key))
        }
        ChannelConfig::Webhook { url } => Box::new(channels::webhook::WebhookChannel::new(url)),
    }
}
