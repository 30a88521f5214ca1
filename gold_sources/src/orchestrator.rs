//! Acquisition strategies over a list of sources.
//!
//! - [`run_sequential`]: call sources in priority order and stop at the first quote,
//!   pausing between failed attempts so the next upstream is not hit immediately.
//! - [`run_race`]: hand all sources to a small pool of worker threads and take the first
//!   quote in completion order, bounded by an overall deadline.
//!
//! Race losers are fire-and-discard: once a winner arrives (or the deadline passes) the
//! shared `CancelFlag` is raised and the orchestrator returns without joining its
//! workers. Requests already on the wire finish on their own; their results go into a
//! channel nobody reads any more.
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use crossbeam_channel::{RecvTimeoutError, unbounded};
use gold_common::PriceQuote;
use gold_common::net::CancelFlag;
use log::{debug, error, info, warn};
use strum_macros::{Display, EnumString};

use crate::source::{PriceSource, SourceOutcome, poll_guarded};

/// How often a waiting race looks at the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// How sources are queried.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Display, EnumString, Eq, PartialEq)]
#[clap(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Strategy {
    /// One after another, first success wins.
    #[default]
    Sequential,
    /// All at once on a worker pool, first completed success wins.
    Race,
}

/// Options for [`run_sequential`].
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialOptions {
    /// Pause after a failed source before trying the next one.
    pub retry_delay: Duration,
}

impl Default for SequentialOptions {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(1200),
        }
    }
}

/// Options for [`run_race`].
#[derive(Debug, Clone, PartialEq)]
pub struct RaceOptions {
    /// Upper bound on worker threads; the pool never exceeds the number of sources.
    pub max_workers: usize,
    /// Wall-clock bound on the whole race.
    pub deadline: Duration,
}

impl Default for RaceOptions {
    fn default() -> Self {
        Self {
            max_workers: 4,
            deadline: Duration::from_secs(18),
        }
    }
}

/// Try `sources` in order and return the first quote.
pub fn run_sequential(
    sources: &[Arc<dyn PriceSource>],
    opts: &SequentialOptions,
    cancel: &CancelFlag,
) -> Option<PriceQuote> {
    for (idx, source) in sources.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("Acquisition cancelled before trying [{}]", source.name());
            return None;
        }

        info!("Trying source [{}] ({}/{})", source.name(), idx + 1, sources.len());
        if let SourceOutcome::Quote(quote) = poll_guarded(source.as_ref()) {
            return Some(quote);
        }

        let is_last = idx + 1 == sources.len();
        if !is_last && cancel.sleep(opts.retry_delay).is_err() {
            warn!("Acquisition cancelled while waiting for the next source");
            return None;
        }
    }
    None
}

/// Race `sources` on a worker pool and return the first quote to complete.
pub fn run_race(
    sources: &[Arc<dyn PriceSource>],
    opts: &RaceOptions,
    cancel: &CancelFlag,
) -> Option<PriceQuote> {
    if sources.is_empty() {
        return None;
    }
    let deadline = Instant::now() + opts.deadline;
    let workers = sources.len().min(opts.max_workers.max(1));

    let (job_tx, job_rx) = unbounded::<Arc<dyn PriceSource>>();
    let (result_tx, result_rx) = unbounded::<(String, SourceOutcome)>();
    for source in sources {
        // job_rx is alive in this scope, so the send cannot fail.
        let _ = job_tx.send(Arc::clone(source));
    }
    drop(job_tx);

    let mut spawned = 0usize;
    for id in 0..workers {
        let job_rx = job_rx.clone();
        let result_tx = result_tx.clone();
        let cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name(format!("gold-source-{id}"))
            .spawn(move || {
                for source in job_rx.iter() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let outcome = poll_guarded(source.as_ref());
                    if result_tx.send((source.name().to_string(), outcome)).is_err() {
                        break;
                    }
                }
            });
        match handle {
            Ok(_) => spawned += 1,
            Err(e) => error!("Failed to spawn source worker {id}: {e}"),
        }
    }
    drop(result_tx);
    if spawned == 0 {
        return None;
    }
    debug!("Racing {} sources on {} workers", sources.len(), spawned);

    let mut pending = sources.len();
    while pending > 0 {
        if cancel.is_cancelled() {
            warn!("Race cancelled with {} sources pending", pending);
            return None;
        }
        let slice = deadline.min(Instant::now() + CANCEL_POLL);
        match result_rx.recv_deadline(slice) {
            Ok((name, SourceOutcome::Quote(quote))) => {
                info!("Race won by [{}]", name);
                cancel.cancel();
                return Some(quote);
            }
            Ok((name, _)) => {
                pending -= 1;
                debug!("[{}] finished without a quote, {} still pending", name, pending);
            }
            Err(RecvTimeoutError::Timeout) if Instant::now() < deadline => continue,
            Err(RecvTimeoutError::Timeout) => {
                warn!("Race deadline of {:?} elapsed with {} sources pending", opts.deadline, pending);
                cancel.cancel();
                return None;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    None
}

/// Strategy plus its options, built once from configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Orchestrator {
    /// Selected strategy.
    pub strategy: Strategy,
    /// Options used when `strategy` is sequential.
    pub sequential: SequentialOptions,
    /// Options used when `strategy` is race.
    pub race: RaceOptions,
}

impl Orchestrator {
    /// Run the configured strategy and log the elapsed time and the outcome.
    pub fn acquire(
        &self,
        sources: &[Arc<dyn PriceSource>],
        cancel: &CancelFlag,
    ) -> Option<PriceQuote> {
        let start = Instant::now();
        info!("Acquiring gold price from {} sources ({})", sources.len(), self.strategy);
        let result = match self.strategy {
            Strategy::Sequential => run_sequential(sources, &self.sequential, cancel),
            Strategy::Race => run_race(sources, &self.race, cancel),
        };
        info!("--- acquisition took {:.2}s ---", start.elapsed().as_secs_f64());

        match &result {
            Some(quote) => info!("Got price {:.2} from [{}]", quote.price, quote.source),
            None => error!("All sources failed, no gold price acquired"),
        }
        result
    }
}
