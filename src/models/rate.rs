//! Exchange rate models

use chrono::NaiveDate;

/// One day's conversion factor: USD per 1 unit of the native currency.
/// A run holds one ascending series per native currency, fetched once.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    pub date: NaiveDate,
    pub rate: f64,
}
