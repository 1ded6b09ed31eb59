use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::models::{ApiError, ChartResponse, ChartResult, QuoteSummaryResponse, QuoteSummaryResult};

/// Market-data API client for the Yahoo-Finance-style chart and
/// quote-summary endpoints. One instance is created per run and shared by
/// the price, FX, and fundamentals fetches.
pub struct YahooClient {
    http_client: HttpClient,
    base_url: String,
}

impl YahooClient {
    const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";
    const USER_AGENT_VALUE: &'static str = "Mozilla/5.0 (compatible; pbrchart/0.1)";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for tests and mirrors)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Self::USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map an HTTP error status to an ApiError
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            400 => ApiError::BadRequest(body_text),
            401 => ApiError::Unauthorized(body_text),
            404 => ApiError::NotFound(body_text),
            429 => {
                warn!("Provider rate limited the request");
                ApiError::RateLimited(body_text)
            }
            500..=599 => {
                warn!("Provider server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .http_client
            .get(url)
            .headers(Self::create_headers())
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /v8/finance/chart/{symbol}
    ///
    /// Daily close history between two epoch-second bounds, optionally with
    /// dividend/split events. Also used for FX pairs such as `JPYUSD=X`.
    pub async fn get_chart(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
        with_events: bool,
    ) -> Result<ChartResult, ApiError> {
        let mut url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, period1, period2
        );
        if with_events {
            url.push_str("&events=div%2Csplits");
        }

        let parsed: ChartResponse = self.get_json(&url).await?;
        if let Some(err) = parsed.chart.error {
            return Err(ApiError::ProviderError(err.message()));
        }
        parsed
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| ApiError::ProviderError(format!("no chart data returned for '{}'", symbol)))
    }

    /// GET /v10/finance/quoteSummary/{symbol}
    ///
    /// Fundamentals (book value per share) and display metadata.
    pub async fn get_quote_summary(&self, symbol: &str) -> Result<QuoteSummaryResult, ApiError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=defaultKeyStatistics%2Cprice",
            self.base_url, symbol
        );

        let parsed: QuoteSummaryResponse = self.get_json(&url).await?;
        if let Some(err) = parsed.quote_summary.error {
            return Err(ApiError::ProviderError(err.message()));
        }
        parsed
            .quote_summary
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| {
                ApiError::ProviderError(format!("no quote summary returned for '{}'", symbol))
            })
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}
