//! The four pipeline stages: fetch, normalize, align, render.
//!
//! Each stage consumes the previous stage's output and produces a new
//! value; there is no shared mutable state between them.

pub mod align_service;
pub mod chart_service;
pub mod currency_service;
pub mod fetch_service;
