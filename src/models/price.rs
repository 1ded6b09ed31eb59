//! Price series models

use chrono::NaiveDate;

use super::currency::Currency;

/// A single daily close, tagged with the currency it is denominated in.
/// Dates are UTC calendar dates derived from provider epoch timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub currency: Currency,
}
