use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::utils::errors::PipelineError;

/// Top-level response of GET /v8/finance/chart/{symbol}
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ApiErrorBody>,
}

/// One symbol's chart payload: metadata, epoch timestamps, and quote arrays
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
    pub events: Option<ChartEvents>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

/// Quote arrays run parallel to `timestamp`; entries are null on sessions
/// the provider has no value for
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Dividend/split maps keyed by epoch-second strings
#[derive(Debug, Clone, Deserialize)]
pub struct ChartEvents {
    #[serde(default)]
    pub dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    pub splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SplitEvent {
    pub date: i64,
    pub numerator: f64,
    pub denominator: f64,
}

/// Top-level response of GET /v10/finance/quoteSummary/{symbol}
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryEnvelope {
    pub result: Option<Vec<QuoteSummaryResult>>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryResult {
    #[serde(rename = "defaultKeyStatistics")]
    pub default_key_statistics: Option<KeyStatistics>,
    pub price: Option<PriceModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyStatistics {
    #[serde(rename = "bookValue")]
    pub book_value: Option<RawValue>,
}

/// The provider wraps scalars as `{"raw": 1.23, "fmt": "1.23"}`; only the
/// raw value matters here
#[derive(Debug, Clone, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceModule {
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub currency: Option<String>,
}

/// Error body the provider embeds in otherwise-200 responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.code.clone())
            .unwrap_or_else(|| "unknown provider error".to_string())
    }
}

/// Errors from the market-data API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 401 Unauthorized
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 404 Not Found (typically an unknown ticker)
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    /// Error body embedded in a 200 response
    #[error("Provider Error: {0}")]
    ProviderError(String),
}

impl From<ApiError> for PipelineError {
    fn from(err: ApiError) -> Self {
        PipelineError::Fetch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_response_deserializes() {
        let payload = serde_json::json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "7203.T", "currency": "JPY", "exchangeName": "JPX" },
                    "timestamp": [1672704000, 1672790400],
                    "indicators": { "quote": [{ "close": [2000.0, null] }] },
                    "events": {
                        "dividends": { "1672704000": { "amount": 25.0, "date": 1672704000 } }
                    }
                }],
                "error": null
            }
        });
        let parsed: ChartResponse = serde_json::from_value(payload).unwrap();
        let result = &parsed.chart.result.unwrap()[0];
        assert_eq!(result.meta.symbol, "7203.T");
        assert_eq!(result.timestamp.len(), 2);
        assert_eq!(result.indicators.quote[0].close, vec![Some(2000.0), None]);
        let events = result.events.as_ref().unwrap();
        assert_eq!(events.dividends["1672704000"].amount, 25.0);
        assert!(events.splits.is_empty());
    }

    #[test]
    fn test_quote_summary_deserializes() {
        let payload = serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "defaultKeyStatistics": {
                        "bookValue": { "raw": 51.3, "fmt": "51.30" }
                    },
                    "price": { "shortName": "Meta Platforms, Inc.", "currency": "USD" }
                }],
                "error": null
            }
        });
        let parsed: QuoteSummaryResponse = serde_json::from_value(payload).unwrap();
        let result = &parsed.quote_summary.result.unwrap()[0];
        let stats = result.default_key_statistics.as_ref().unwrap();
        assert_eq!(stats.book_value.as_ref().unwrap().raw, Some(51.3));
        assert_eq!(
            result.price.as_ref().unwrap().short_name.as_deref(),
            Some("Meta Platforms, Inc.")
        );
    }

    #[test]
    fn test_error_body_message_fallbacks() {
        let body = ApiErrorBody {
            code: Some("Not Found".to_string()),
            description: None,
        };
        assert_eq!(body.message(), "Not Found");
        let empty = ApiErrorBody {
            code: None,
            description: None,
        };
        assert_eq!(empty.message(), "unknown provider error");
    }
}
