//! Data fetcher: daily price history, derived PBR series, and provider
//! dividend/split events for one ticker.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tracing::{debug, info, warn};

use crate::api::yahoo::models::ChartResult;
use crate::api::yahoo::YahooClient;
use crate::models::{native_currency, Currency, EventMarker, PbrPoint, PricePoint};
use crate::utils::errors::PipelineError;

/// Ticker metadata gathered alongside the series
#[derive(Debug, Clone)]
pub struct TickerInfo {
    pub symbol: String,
    pub display_name: String,
    pub native_currency: Currency,
    pub book_value_per_share: Option<f64>,
}

/// Everything one fetch pass produces for a ticker
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub info: TickerInfo,
    pub prices: Vec<PricePoint>,
    pub events: Vec<EventMarker>,
}

/// Fetch price history and events for `ticker` over the inclusive
/// `[start, end]` window, so an explicit single-day range plots that day.
///
/// An empty range (start after end) yields empty series without touching
/// the network. An unreachable provider or unknown ticker is fatal; a
/// missing quote summary is not (the original data source is flaky there),
/// it only degrades the chart title and disables the PBR series.
pub async fn fetch_series(
    client: &YahooClient,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    with_events: bool,
) -> Result<FetchedSeries, PipelineError> {
    if start > end {
        debug!("Empty date range {}..{}, skipping fetch", start, end);
        return Ok(FetchedSeries {
            info: TickerInfo {
                symbol: ticker.to_string(),
                display_name: ticker.to_string(),
                native_currency: Currency::Usd,
                book_value_per_share: None,
            },
            prices: Vec::new(),
            events: Vec::new(),
        });
    }

    // Fundamentals and display name. Best effort: warn and fall back to
    // chart metadata when the module is unavailable.
    let (mut display_name, mut reported_currency, mut book_value) = (None, None, None);
    match client.get_quote_summary(ticker).await {
        Ok(summary) => {
            if let Some(price) = summary.price {
                display_name = price.short_name;
                reported_currency = price.currency;
            }
            book_value = summary
                .default_key_statistics
                .and_then(|stats| stats.book_value)
                .and_then(|bv| bv.raw)
                .filter(|v| *v > 0.0);
        }
        Err(e) => {
            warn!("Quote summary unavailable for {}: {}", ticker, e);
        }
    }

    let (period1, period2) = epoch_range(start, end);
    let chart = client
        .get_chart(ticker, period1, period2, with_events)
        .await?;

    if display_name.is_none() {
        display_name = chart.meta.short_name.clone();
    }
    if reported_currency.is_none() {
        reported_currency = chart.meta.currency.clone();
    }
    let native = native_currency(ticker, reported_currency.as_deref());

    let prices = points_from_chart(&chart, &native);
    let events = if with_events {
        events_from_chart(&chart, start, end)
    } else {
        Vec::new()
    };
    info!(
        "Fetched {} price points and {} events for {} ({})",
        prices.len(),
        events.len(),
        ticker,
        native
    );

    Ok(FetchedSeries {
        info: TickerInfo {
            symbol: chart.meta.symbol.clone(),
            display_name: display_name.unwrap_or_else(|| ticker.to_string()),
            native_currency: native,
            book_value_per_share: book_value,
        },
        prices,
        events,
    })
}

/// Derive the PBR series: native-currency close / book value per share.
/// Runs before currency conversion so the ratio stays currency-free.
pub fn pbr_series(prices: &[PricePoint], book_value_per_share: Option<f64>) -> Vec<PbrPoint> {
    if prices.is_empty() {
        return Vec::new();
    }
    let book_value = match book_value_per_share {
        Some(bv) if bv > 0.0 => bv,
        _ => {
            warn!("No positive book value per share available, skipping PBR series");
            return Vec::new();
        }
    };

    prices
        .iter()
        .map(|p| PbrPoint {
            date: p.date,
            ratio: p.close / book_value,
        })
        .filter(|p| p.ratio.is_finite() && p.ratio >= 0.0)
        .collect()
}

/// Convert a date range to provider epoch-second bounds. The upper bound is
/// pushed one day past `end` so the final session is not dropped.
pub fn epoch_range(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
    let period2 = end
        .checked_add_days(Days::new(1))
        .unwrap_or(end)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp();
    (period1, period2)
}

fn date_from_epoch(ts: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

/// Turn a chart payload into price points: null closes skipped, duplicate
/// dates dropped (first wins), output sorted ascending.
pub fn points_from_chart(chart: &ChartResult, currency: &Currency) -> Vec<PricePoint> {
    let closes = match chart.indicators.quote.first() {
        Some(quote) => &quote.close,
        None => return Vec::new(),
    };

    let mut points: Vec<PricePoint> = Vec::new();
    for (ts, close) in chart.timestamp.iter().zip(closes.iter()) {
        let close = match close {
            Some(c) if c.is_finite() => *c,
            _ => continue,
        };
        let date = match date_from_epoch(*ts) {
            Some(d) => d,
            None => continue,
        };
        points.push(PricePoint {
            date,
            close,
            currency: currency.clone(),
        });
    }

    // Provider data should already be ordered, but ensure it
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    points
}

/// Dividend and split events within the range, sorted by date
pub fn events_from_chart(chart: &ChartResult, start: NaiveDate, end: NaiveDate) -> Vec<EventMarker> {
    let mut markers: Vec<EventMarker> = Vec::new();
    if let Some(events) = &chart.events {
        for dividend in events.dividends.values() {
            if let Some(date) = date_from_epoch(dividend.date) {
                markers.push(EventMarker {
                    date,
                    label: format!("Dividend {}", dividend.amount),
                });
            }
        }
        for split in events.splits.values() {
            if let Some(date) = date_from_epoch(split.date) {
                markers.push(EventMarker {
                    date,
                    label: format!("Split {}:{}", split.numerator, split.denominator),
                });
            }
        }
    }
    markers.retain(|m| m.date >= start && m.date <= end);
    markers.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.label.cmp(&b.label)));
    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chart() -> ChartResult {
        serde_json::from_value(serde_json::json!({
            "meta": { "symbol": "7203.T", "currency": "JPY" },
            // 2023-01-03, 2023-01-04 (duplicate), 2023-01-05
            "timestamp": [1672704000, 1672790400, 1672790401, 1672876800],
            "indicators": {
                "quote": [{ "close": [2000.0, 2010.0, 2011.0, null] }]
            },
            "events": {
                "dividends": { "1672704000": { "amount": 25.0, "date": 1672704000 } },
                "splits": {
                    "1672790400": { "date": 1672790400, "numerator": 3.0, "denominator": 1.0 }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_points_skip_nulls_and_duplicates() {
        let points = points_from_chart(&sample_chart(), &Currency::Jpy);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(points[0].close, 2000.0);
        assert_eq!(points[0].currency, Currency::Jpy);
        // First value wins for the duplicated date
        assert_eq!(points[1].close, 2010.0);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_events_are_labeled_and_sorted() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let events = events_from_chart(&sample_chart(), start, end);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "Dividend 25");
        assert_eq!(events[1].label, "Split 3:1");
        assert!(events[0].date <= events[1].date);
    }

    #[test]
    fn test_events_outside_range_are_dropped() {
        let start = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        assert!(events_from_chart(&sample_chart(), start, end).is_empty());
    }

    #[test]
    fn test_pbr_series_uses_native_close() {
        let points = points_from_chart(&sample_chart(), &Currency::Jpy);
        let pbrs = pbr_series(&points, Some(1000.0));
        assert_eq!(pbrs.len(), 2);
        assert!((pbrs[0].ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pbr_series_skipped_without_book_value() {
        let points = points_from_chart(&sample_chart(), &Currency::Jpy);
        assert!(pbr_series(&points, None).is_empty());
        assert!(pbr_series(&points, Some(0.0)).is_empty());
        assert!(pbr_series(&points, Some(-5.0)).is_empty());
    }

    #[tokio::test]
    async fn test_reversed_range_skips_the_fetch() {
        // Port 0 is unroutable; reaching the network would fail the unwrap
        let client = YahooClient::with_base_url("http://127.0.0.1:0".to_string());
        let start = NaiveDate::from_ymd_opt(2023, 1, 4).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        let fetched = fetch_series(&client, "META", start, end, true)
            .await
            .unwrap();
        assert!(fetched.prices.is_empty());
        assert!(fetched.events.is_empty());
        assert_eq!(fetched.info.display_name, "META");
        assert!(fetched.info.book_value_per_share.is_none());
    }

    #[tokio::test]
    async fn test_single_day_range_reaches_the_provider() {
        let client = YahooClient::with_base_url("http://127.0.0.1:0".to_string());
        let day = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        let err = fetch_series(&client, "META", day, day, false)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(_)));
    }

    #[test]
    fn test_epoch_range_includes_final_session() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 4).unwrap();
        let (p1, p2) = epoch_range(start, end);
        assert_eq!(p1, 1672704000);
        // Upper bound is midnight after `end`
        assert_eq!(p2, 1672876800);
    }
}
