/// Errors that can occur when querying InfluxDB.
///
/// "No data for the measurement" is not an error — queries return
/// `Ok(None)` in that case, so callers can tell an empty retention window
/// apart from a failure to reach the database.
///
/// # Examples
///
/// ```rust
/// use coolwatch_influx::error::InfluxError;
///
/// let err = InfluxError::Query("measurement not found".to_string());
/// assert!(err.to_string().contains("measurement not found"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum InfluxError {
    /// An underlying HTTP transport error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// InfluxDB responded with a non-2xx status.
    #[error("InfluxDB HTTP error: status={status}, body={body}")]
    Api { status: u16, body: String },

    /// InfluxDB returned a 2xx status but the payload carries a query error.
    #[error("InfluxDB query error: {0}")]
    Query(String),

    /// The response body did not have the expected shape.
    #[error("unexpected InfluxDB response: {0}")]
    Response(String),
}

/// Convenience `Result` alias for InfluxDB operations.
pub type Result<T> = std::result::Result<T, InfluxError>;
