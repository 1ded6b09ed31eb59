//! Currency codes and ticker-suffix inference

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// Currency a price series is denominated in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Jpy,
    Eur,
    Gbp,
    /// Any other ISO-4217 code, stored uppercase
    Other(String),
}

impl Currency {
    /// Parse an ISO-4217 code (case-insensitive)
    pub fn from_code(code: &str) -> Self {
        match code.to_uppercase().as_str() {
            "USD" => Currency::Usd,
            "JPY" => Currency::Jpy,
            "EUR" => Currency::Eur,
            "GBP" => Currency::Gbp,
            other => Currency::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Other(code) => code,
        }
    }

    pub fn is_usd(&self) -> bool {
        matches!(self, Currency::Usd)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

lazy_static! {
    /// Exchange suffix -> native currency (e.g. "7203.T" trades in JPY on Tokyo)
    static ref SUFFIX_CURRENCIES: HashMap<&'static str, Currency> = {
        let mut m = HashMap::new();
        m.insert(".T", Currency::Jpy); // Tokyo
        m.insert(".L", Currency::Gbp); // London
        m.insert(".PA", Currency::Eur); // Paris
        m.insert(".DE", Currency::Eur); // XETRA
        m.insert(".F", Currency::Eur); // Frankfurt
        m.insert(".AS", Currency::Eur); // Amsterdam
        m.insert(".MC", Currency::Eur); // Madrid
        m.insert(".MI", Currency::Eur); // Milan
        m.insert(".BR", Currency::Eur); // Brussels
        m
    };
}

/// Look up the currency implied by a ticker's exchange suffix
pub fn currency_for_suffix(ticker: &str) -> Option<Currency> {
    let idx = ticker.rfind('.')?;
    SUFFIX_CURRENCIES.get(&ticker[idx..]).cloned()
}

/// Resolve a ticker's native currency. The code the provider reports wins;
/// otherwise the suffix table decides; a bare symbol defaults to USD.
pub fn native_currency(ticker: &str, reported: Option<&str>) -> Currency {
    if let Some(code) = reported {
        if !code.trim().is_empty() {
            return Currency::from_code(code);
        }
    }
    currency_for_suffix(ticker).unwrap_or(Currency::Usd)
}
