//! Discrete event annotations overlaid on the chart

use chrono::NaiveDate;

/// A labeled event on the time axis (dividend, split, or user-supplied)
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub date: NaiveDate,
    pub label: String,
}
