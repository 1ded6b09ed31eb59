//! Aligned chart rows

use chrono::NaiveDate;
use serde::Serialize;

/// One row of the outer-joined series: whichever of price/PBR/events exist
/// on this date. Absent means absent, never zero. Serialized into the
/// interactive HTML page for hover pop-ups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub price: Option<f64>,
    pub pbr: Option<f64>,
    pub events: Vec<String>,
}

impl AlignedRow {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            price: None,
            pbr: None,
            events: Vec::new(),
        }
    }
}
