//! Command-line interface

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::models::EventMarker;
use crate::utils::errors::PipelineError;
use crate::utils::period::parse_period;

/// Fetch price and PBR history for a ticker, convert it to USD, and render
/// a chart with hover pop-ups
#[derive(Debug, Parser)]
#[command(name = "pbrchart", version, about)]
pub struct Cli {
    /// Ticker symbol, e.g. AAPL, META, 7203.T
    pub ticker: String,

    /// Lookback period: 1w, 1m, 3m, 6m, 1y, 2y, 5y, 10y, max
    #[arg(long, default_value = "max", conflicts_with_all = ["start", "end"])]
    pub period: String,

    /// Range start date (YYYY-MM-DD), used together with --end
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Range end date (YYYY-MM-DD), used together with --start
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Output file; the extension selects the format (.html, .svg, .png)
    #[arg(long, default_value = "chart.html")]
    pub out: PathBuf,

    /// Extra event marker as DATE:LABEL, e.g. 2023-01-03:Earnings (repeatable)
    #[arg(long = "event", value_name = "DATE:LABEL")]
    pub events: Vec<String>,

    /// Skip fetching dividend/split events from the provider
    #[arg(long)]
    pub no_provider_events: bool,

    /// Bridge gaps with straight-line interpolation for continuous curves
    #[arg(long)]
    pub interpolate: bool,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 700)]
    pub height: u32,
}

impl Cli {
    /// Resolve the inclusive `[start, end]` fetch window: explicit dates win
    /// over the period, and the period counts back from `today`
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), PipelineError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(PipelineError::InvalidArgument(format!(
                    "start date {} is after end date {}",
                    start, end
                )));
            }
            return Ok((start, end));
        }

        let duration = parse_period(&self.period).map_err(PipelineError::InvalidArgument)?;
        let start = match duration {
            Some(d) => today - d,
            // "max": the provider clamps to the earliest session it has
            None => NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(today),
        };
        Ok((start, today))
    }

    /// Parse the repeatable `--event DATE:LABEL` flags
    pub fn manual_events(&self) -> Result<Vec<EventMarker>, PipelineError> {
        let mut markers = Vec::with_capacity(self.events.len());
        for raw in &self.events {
            let (date_str, label) = raw.split_once(':').ok_or_else(|| {
                PipelineError::InvalidArgument(format!(
                    "event '{}' is not in DATE:LABEL form",
                    raw
                ))
            })?;
            let date = date_str.parse::<NaiveDate>().map_err(|e| {
                PipelineError::InvalidArgument(format!("event date '{}': {}", date_str, e))
            })?;
            if label.trim().is_empty() {
                return Err(PipelineError::InvalidArgument(format!(
                    "event '{}' has an empty label",
                    raw
                )));
            }
            markers.push(EventMarker {
                date,
                label: label.trim().to_string(),
            });
        }
        Ok(markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
    }

    #[test]
    fn test_default_period_is_max() {
        let cli = parse(&["pbrchart", "META"]);
        let (start, end) = cli.date_range(today()).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(end, today());
    }

    #[test]
    fn test_period_counts_back_from_today() {
        let cli = parse(&["pbrchart", "META", "--period", "1y"]);
        let (start, end) = cli.date_range(today()).unwrap();
        assert_eq!(end - start, chrono::Duration::days(365));
    }

    #[test]
    fn test_explicit_dates_win() {
        let cli = parse(&[
            "pbrchart", "7203.T", "--start", "2023-01-01", "--end", "2023-03-01",
        ]);
        let (start, end) = cli.date_range(today()).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    }

    #[test]
    fn test_single_day_range_is_accepted() {
        let cli = parse(&[
            "pbrchart", "META", "--start", "2023-01-03", "--end", "2023-01-03",
        ]);
        let (start, end) = cli.date_range(today()).unwrap();
        assert_eq!(start, end);
    }

    #[test]
    fn test_reversed_dates_are_rejected() {
        let cli = parse(&[
            "pbrchart", "META", "--start", "2023-03-01", "--end", "2023-01-01",
        ]);
        let err = cli.date_range(today()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn test_start_requires_end() {
        assert!(Cli::try_parse_from(["pbrchart", "META", "--start", "2023-01-01"]).is_err());
    }

    #[test]
    fn test_period_conflicts_with_dates() {
        assert!(Cli::try_parse_from([
            "pbrchart", "META", "--period", "1y", "--start", "2023-01-01", "--end", "2023-02-01",
        ])
        .is_err());
    }

    #[test]
    fn test_manual_events_parse() {
        let cli = parse(&[
            "pbrchart",
            "META",
            "--event",
            "2023-01-03:Earnings",
            "--event",
            "2023-02-01:Buyback announced",
        ]);
        let events = cli.manual_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "Earnings");
        assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn test_malformed_events_are_rejected() {
        let cli = parse(&["pbrchart", "META", "--event", "2023-01-03"]);
        assert!(cli.manual_events().is_err());
        let cli = parse(&["pbrchart", "META", "--event", "not-a-date:Earnings"]);
        assert!(cli.manual_events().is_err());
        let cli = parse(&["pbrchart", "META", "--event", "2023-01-03: "]);
        assert!(cli.manual_events().is_err());
    }
}
