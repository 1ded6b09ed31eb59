//! Currency normalizer: fetches a per-day FX series and converts price
//! points to USD.
//!
//! The rate series is historical (one rate per provider trading day) rather
//! than a single latest rate, and is forward/backward-filled onto the price
//! dates, so older points convert at the rate of their own era.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::yahoo::models::ChartResult;
use crate::api::yahoo::YahooClient;
use crate::models::{Currency, ExchangeRate, PricePoint};
use crate::utils::errors::PipelineError;

/// Fetch the native-currency -> USD rate series for the inclusive
/// `[start, end]` window.
///
/// USD is a constant factor of 1. Otherwise the direct pair (`JPYUSD=X`) is
/// tried first; when it yields nothing the inverse pair (`USDJPY=X`) is
/// fetched and inverted. Both failing is a conversion error.
pub async fn fetch_fx_series(
    client: &YahooClient,
    currency: &Currency,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ExchangeRate>, PipelineError> {
    if currency.is_usd() {
        return Ok(vec![ExchangeRate {
            date: start,
            rate: 1.0,
        }]);
    }

    let (period1, period2) = super::fetch_service::epoch_range(start, end);

    let direct_pair = format!("{}USD=X", currency.code());
    match client.get_chart(&direct_pair, period1, period2, false).await {
        Ok(chart) => {
            let rates = rates_from_chart(&chart, false);
            if !rates.is_empty() {
                info!("Fetched {} FX rates via {}", rates.len(), direct_pair);
                return Ok(rates);
            }
            warn!("FX pair {} returned no usable rates", direct_pair);
        }
        Err(e) => warn!("FX pair {} unavailable: {}", direct_pair, e),
    }

    let inverse_pair = format!("USD{}=X", currency.code());
    match client.get_chart(&inverse_pair, period1, period2, false).await {
        Ok(chart) => {
            let rates = rates_from_chart(&chart, true);
            if !rates.is_empty() {
                info!(
                    "Fetched {} FX rates via inverted {}",
                    rates.len(),
                    inverse_pair
                );
                return Ok(rates);
            }
            warn!("FX pair {} returned no usable rates", inverse_pair);
        }
        Err(e) => warn!("FX pair {} unavailable: {}", inverse_pair, e),
    }

    Err(PipelineError::Conversion(format!(
        "no exchange rate available for {} (tried {} and {})",
        currency.code(),
        direct_pair,
        inverse_pair
    )))
}

/// Extract an ascending rate series from an FX chart payload. Non-positive
/// closes are dropped; `invert` takes the reciprocal for inverse pairs.
pub fn rates_from_chart(chart: &ChartResult, invert: bool) -> Vec<ExchangeRate> {
    super::fetch_service::points_from_chart(chart, &Currency::Usd)
        .into_iter()
        .filter(|p| p.close > 0.0)
        .map(|p| ExchangeRate {
            date: p.date,
            rate: if invert { 1.0 / p.close } else { p.close },
        })
        .collect()
}

/// Convert price points to USD using the rate of the closest covered day:
/// the latest rate on or before the point's date, else the earliest rate
/// after it. Points already in USD pass through untouched, which makes the
/// whole operation idempotent.
pub fn normalize_to_usd(
    points: &[PricePoint],
    rates: &[ExchangeRate],
) -> Result<Vec<PricePoint>, PipelineError> {
    let mut converted = Vec::with_capacity(points.len());
    for point in points {
        if point.currency.is_usd() {
            converted.push(point.clone());
            continue;
        }

        let rate = rate_for_date(rates, point.date).ok_or_else(|| {
            PipelineError::Conversion(format!(
                "no exchange rate covers {} ({})",
                point.date,
                point.currency.code()
            ))
        })?;
        converted.push(PricePoint {
            date: point.date,
            close: point.close * rate,
            currency: Currency::Usd,
        });
    }
    Ok(converted)
}

/// Forward-fill, then backward-fill: rates must be sorted ascending by date
fn rate_for_date(rates: &[ExchangeRate], date: NaiveDate) -> Option<f64> {
    let idx = rates.partition_point(|r| r.date <= date);
    if idx > 0 {
        return Some(rates[idx - 1].rate);
    }
    rates.first().map(|r| r.rate)
}
