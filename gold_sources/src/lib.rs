//!
//! Gold price sources and the orchestrator that picks the first usable quote.
//!
//! This crate aggregates:
//! - `source`: the `PriceSource` trait and the tagged `SourceOutcome` every poll returns.
//! - `adapters`: one module per upstream endpoint, plus the `SourceKind` catalogue.
//! - `orchestrator`: sequential fallback and concurrent race over a set of sources.
#![warn(missing_docs)]
pub mod adapters;
pub mod orchestrator;
pub mod source;

pub use adapters::SourceKind;
pub use orchestrator::{Orchestrator, RaceOptions, SequentialOptions, Strategy};
pub use source::{PriceSource, SourceOutcome};
