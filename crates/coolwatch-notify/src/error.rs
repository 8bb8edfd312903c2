/// Errors that can occur when delivering a notification.
///
/// # Examples
///
/// ```rust
/// use coolwatch_notify::error::NotifyError;
///
/// let err = NotifyError::Api {
///     service: "simplepush".to_string(),
///     status: 401,
///     body: "invalid key".to_string(),
/// };
/// assert!(err.to_string().contains("simplepush"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// An HTTP request to the notification endpoint failed at the transport
    /// level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The notification service responded with a non-success status.
    #[error("API error from {service}: status={status}, body={body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
