use chrono::Duration;

/// Parse a lookback period string to a duration.
/// Supported: 1w, 1m, 3m, 6m, 1y, 2y, 5y, 10y, max
/// `None` means no lower bound (fetch the full history the provider has).
pub fn parse_period(period: &str) -> Result<Option<Duration>, String> {
    match period.to_lowercase().as_str() {
        "1w" => Ok(Some(Duration::weeks(1))),
        "1m" | "1month" => Ok(Some(Duration::days(30))),
        "3m" | "3months" => Ok(Some(Duration::days(90))),
        "6m" | "6months" => Ok(Some(Duration::days(182))),
        "1y" | "1year" => Ok(Some(Duration::days(365))),
        "2y" => Ok(Some(Duration::days(730))),
        "5y" => Ok(Some(Duration::days(1825))),
        "10y" => Ok(Some(Duration::days(3650))),
        "max" | "all" => Ok(None),
        _ => Err(format!(
            "Unknown period: '{}'. Supported: 1w, 1m, 3m, 6m, 1y, 2y, 5y, 10y, max",
            period
        )),
    }
}
