//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ExchangeRecord`] | One exchange from the catalog (code, MIC, name, country, city) |
//! | [`Interval`] | Chart interval carried by the filter selection |
//!
//! Country and MIC comparisons always go through [`normalize_code`].

mod exchange;
mod interval;

pub use exchange::{normalize_code, normalize_codes, ExchangeRecord};
pub use interval::Interval;
