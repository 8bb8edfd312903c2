//! InfluxDB 1.x query client.
//!
//! The decision engine only ever needs the most recent value of a
//! measurement/field pair, so the client exposes a single operation:
//! [`InfluxClient::last_value`], which issues
//! `SELECT LAST("field") FROM "measurement"` against the `/query` endpoint
//! and extracts the `last` column from the response.

pub mod error;

use coolwatch_common::types::Measurement;
use serde::Deserialize;

use crate::error::{InfluxError, Result};

pub struct InfluxClient {
    client: reqwest::Client,
    query_url: String,
    database: String,
}

impl InfluxClient {
    pub fn new(host: &str, port: u16, database: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            query_url: format!("http://{host}:{port}/query"),
            database: database.to_string(),
        }
    }

    /// Queries the most recent value of the given measurement/field pair.
    ///
    /// Returns `Ok(None)` when the measurement holds no data within the
    /// database's retention.
    pub async fn last_value(&self, measurement: &Measurement) -> Result<Option<f64>> {
        let query = format!(
            r#"SELECT LAST("{field}") FROM "{name}""#,
            field = measurement.field,
            name = measurement.name,
        );
        tracing::debug!(db = %self.database, query = %query, "Querying InfluxDB");

        let resp = self
            .client
            .get(&self.query_url)
            .query(&[("db", self.database.as_str()), ("q", query.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InfluxError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: QueryResponse = resp.json().await?;
        let value = extract_last(response)?;
        if value.is_none() {
            tracing::warn!(
                measurement = %measurement.name,
                field = %measurement.field,
                "No data found for measurement"
            );
        }
        Ok(value)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Pulls the `last` column out of a query response.
///
/// An empty result set (no series, no rows, or a null value) maps to
/// `Ok(None)`; a structurally valid response with a non-numeric value in the
/// `last` column is an error.
fn extract_last(response: QueryResponse) -> Result<Option<f64>> {
    if let Some(message) = response.error {
        return Err(InfluxError::Query(message));
    }

    let Some(result) = response.results.into_iter().next() else {
        return Ok(None);
    };
    if let Some(message) = result.error {
        return Err(InfluxError::Query(message));
    }

    let Some(series) = result.series.into_iter().next() else {
        return Ok(None);
    };
    let Some(index) = series.columns.iter().position(|c| c == "last") else {
        return Err(InfluxError::Response(
            "series is missing the 'last' column".to_string(),
        ));
    };
    let Some(row) = series.values.into_iter().next() else {
        return Ok(None);
    };

    match row.get(index) {
        None => Err(InfluxError::Response(format!(
            "value row has no column {index}"
        ))),
        Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            InfluxError::Response(format!("'last' column is not a number: {value}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QueryResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_last_value() {
        let response = parse(
            r#"{"results":[{"statement_id":0,"series":[{"name":"outdoor",
                "columns":["time","last"],
                "values":[["2026-08-06T12:00:00Z",17.25]]}]}]}"#,
        );
        assert_eq!(extract_last(response).unwrap(), Some(17.25));
    }

    #[test]
    fn empty_series_means_no_data() {
        let response = parse(r#"{"results":[{"statement_id":0}]}"#);
        assert_eq!(extract_last(response).unwrap(), None);
    }

    #[test]
    fn null_value_means_no_data() {
        let response = parse(
            r#"{"results":[{"series":[{"columns":["time","last"],
                "values":[["2026-08-06T12:00:00Z",null]]}]}]}"#,
        );
        assert_eq!(extract_last(response).unwrap(), None);
    }

    #[test]
    fn statement_error_is_a_query_error() {
        let response = parse(r#"{"results":[{"error":"database not found: home"}]}"#);
        let err = extract_last(response).unwrap_err();
        assert!(matches!(err, InfluxError::Query(ref m) if m.contains("database not found")));
    }

    #[test]
    fn top_level_error_is_a_query_error() {
        let response = parse(r#"{"error":"missing required parameter \"q\""}"#);
        assert!(matches!(
            extract_last(response).unwrap_err(),
            InfluxError::Query(_)
        ));
    }

    #[test]
    fn non_numeric_value_is_a_response_error() {
        let response = parse(
            r#"{"results":[{"series":[{"columns":["time","last"],
                "values":[["2026-08-06T12:00:00Z","warm"]]}]}]}"#,
        );
        assert!(matches!(
            extract_last(response).unwrap_err(),
            InfluxError::Response(_)
        ));
    }
}
