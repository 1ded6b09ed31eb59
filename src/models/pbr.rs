//! Price-to-Book Ratio models

use chrono::NaiveDate;

/// PBR on a given date: native-currency close / book value per share.
/// May be sparser than the price series when closes are missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrPoint {
    pub date: NaiveDate,
    pub ratio: f64,
}
