//! Source contract shared by all adapters.
//!
//! Adapters implement [`PriceSource::fetch`] with ordinary `?` propagation. The
//! orchestrator only ever calls [`PriceSource::poll`], which folds every failure into a
//! [`SourceOutcome`] and logs it, so one broken upstream never reaches the caller as an error.
use std::panic::{self, AssertUnwindSafe};

use gold_common::{GoldError, PriceQuote, Result};
use log::{error, info, warn};

/// Result of polling one source.
#[derive(Debug)]
pub enum SourceOutcome {
    /// A usable quote.
    Quote(PriceQuote),
    /// The source answered but had nothing usable (closed market, zero price, empty list).
    Empty(String),
    /// Transport, decoding or payload-shape failure.
    Failed(GoldError),
}

impl SourceOutcome {
    /// The quote, if any.
    pub fn into_quote(self) -> Option<PriceQuote> {
        match self {
            SourceOutcome::Quote(quote) => Some(quote),
            _ => None,
        }
    }
}

/// One upstream quote endpoint.
pub trait PriceSource: Send + Sync {
    /// Display name, also used as `PriceQuote::source`.
    fn name(&self) -> &str;

    /// Query the upstream and normalize its answer.
    ///
    /// `Ok(None)` means the upstream answered without a usable price.
    fn fetch(&self) -> Result<Option<PriceQuote>>;

    /// Fetch and fold the result into a [`SourceOutcome`], logging anything that is not a quote.
    fn poll(&self) -> SourceOutcome {
        match self.fetch() {
            Ok(Some(quote)) => {
                info!("Source [{}] returned price {:.2}", self.name(), quote.price);
                SourceOutcome::Quote(quote)
            }
            Ok(None) => {
                warn!("Source [{}] returned no usable price", self.name());
                SourceOutcome::Empty(format!("{} returned no usable price", self.name()))
            }
            Err(e) => {
                warn!("Source [{}] failed: {}", self.name(), e);
                SourceOutcome::Failed(e)
            }
        }
    }
}

/// Poll `source`, converting a panic into `SourceOutcome::Failed`.
pub fn poll_guarded(source: &dyn PriceSource) -> SourceOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| source.poll())) {
        Ok(outcome) => outcome,
        Err(_) => {
            error!("Source [{}] panicked", source.name());
            SourceOutcome::Failed(GoldError::Panic(source.name().to_string()))
        }
    }
}
