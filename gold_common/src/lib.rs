//!
//! Common types and utilities shared by the gold quote sources and the push binary.
//!
//! This crate aggregates:
//! - `error`: unified error type `GoldError` used across the workspace.
//! - `result`: handy `Result<T, GoldError>` alias.
//! - `indicator`: moving average, range position and advice classification.
//! - `quote`: the normalized `PriceQuote` and the raw `Reading` it is built from.
//! - `net`: shared blocking HTTP client with timeouts and a retry policy.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod indicator;
pub mod quote;
pub mod net;

pub use error::GoldError;
pub use result::Result;
pub use quote::{PriceQuote, Reading};
