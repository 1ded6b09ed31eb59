//! Data models for the fetch/normalize/align/render pipeline
//!
//! Each entity is created fresh per invocation from fetched data; nothing
//! is persisted across runs.

pub mod aligned;
pub mod currency;
pub mod event;
pub mod pbr;
pub mod price;
pub mod rate;

// Re-export commonly used types for convenience
pub use aligned::AlignedRow;
pub use currency::{currency_for_suffix, native_currency, Currency};
pub use event::EventMarker;
pub use pbr::PbrPoint;
pub use price::PricePoint;
pub use rate::ExchangeRate;
