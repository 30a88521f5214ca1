use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use gold_common::net::CancelFlag;
use gold_common::quote::QuoteSettings;
use gold_common::{GoldError, PriceQuote, Reading, Result};
use gold_sources::orchestrator::{run_race, run_sequential};
use gold_sources::{Orchestrator, PriceSource, RaceOptions, SequentialOptions, Strategy};

enum Behavior {
    Quote(f64),
    Empty,
    Fail,
    Panic,
}

struct StubSource {
    name: &'static str,
    delay: Duration,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    fn new(name: &'static str, delay_ms: u64, behavior: Behavior) -> (Arc<dyn PriceSource>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = StubSource {
            name,
            delay: Duration::from_millis(delay_ms),
            behavior,
            calls: Arc::clone(&calls),
        };
        (Arc::new(source), calls)
    }
}

impl PriceSource for StubSource {
    fn name(&self) -> &str {
        self.name
    }

    fn fetch(&self) -> Result<Option<PriceQuote>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        match self.behavior {
            Behavior::Quote(price) => Ok(PriceQuote::from_reading(
                self.name,
                Reading::spot(price),
                &QuoteSettings::default(),
            )),
            Behavior::Empty => Ok(None),
            Behavior::Fail => Err(GoldError::shape("stub failure")),
            Behavior::Panic => panic!("stub panic"),
        }
    }
}

fn quick_sequential() -> SequentialOptions {
    SequentialOptions {
        retry_delay: Duration::from_millis(10),
    }
}

fn race_with_deadline(ms: u64) -> RaceOptions {
    RaceOptions {
        max_workers: 4,
        deadline: Duration::from_millis(ms),
    }
}

#[test]
fn sequential_stops_at_first_success() {
    let (a, a_calls) = StubSource::new("A", 0, Behavior::Fail);
    let (b, b_calls) = StubSource::new("B", 0, Behavior::Quote(600.0));
    let (c, c_calls) = StubSource::new("C", 0, Behavior::Quote(700.0));

    let quote = run_sequential(&[a, b, c], &quick_sequential(), &CancelFlag::new()).expect("quote");
    assert_eq!(quote.source, "B");
    assert_eq!(quote.price, 600.0);
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn sequential_skips_empty_and_panicking_sources() {
    let (a, _) = StubSource::new("A", 0, Behavior::Empty);
    let (b, _) = StubSource::new("B", 0, Behavior::Panic);
    let (c, c_calls) = StubSource::new("C", 0, Behavior::Quote(610.0));

    let quote = run_sequential(&[a, b, c], &quick_sequential(), &CancelFlag::new()).expect("quote");
    assert_eq!(quote.source, "C");
    assert_eq!(c_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn sequential_waits_between_failures_only() {
    let (a, _) = StubSource::new("A", 0, Behavior::Fail);
    let (b, _) = StubSource::new("B", 0, Behavior::Fail);
    let opts = SequentialOptions {
        retry_delay: Duration::from_millis(100),
    };

    let start = Instant::now();
    assert!(run_sequential(&[a, b], &opts, &CancelFlag::new()).is_none());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(1_000));
}

#[test]
fn sequential_respects_cancellation() {
    let (a, a_calls) = StubSource::new("A", 0, Behavior::Quote(600.0));
    let cancel = CancelFlag::new();
    cancel.cancel();

    assert!(run_sequential(&[a], &quick_sequential(), &cancel).is_none());
    assert_eq!(a_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn race_returns_single_success_regardless_of_submission_order() {
    let (a, _) = StubSource::new("A", 10, Behavior::Fail);
    let (b, _) = StubSource::new("B", 30, Behavior::Empty);
    let (c, _) = StubSource::new("C", 5, Behavior::Panic);
    let (d, _) = StubSource::new("D", 80, Behavior::Quote(620.0));

    let quote = run_race(&[a, b, c, d], &race_with_deadline(2_000), &CancelFlag::new()).expect("quote");
    assert_eq!(quote.source, "D");
    assert_eq!(quote.price, 620.0);
}

#[test]
fn race_takes_first_completion_not_first_submission() {
    let (slow, _) = StubSource::new("slow", 600, Behavior::Quote(1.0));
    let (fast, _) = StubSource::new("fast", 20, Behavior::Quote(2.0));
    let cancel = CancelFlag::new();

    let quote = run_race(&[slow, fast], &race_with_deadline(2_000), &cancel).expect("quote");
    assert_eq!(quote.source, "fast");
    assert!(cancel.is_cancelled());
}

#[test]
fn race_gives_up_at_deadline() {
    let (a, _) = StubSource::new("A", 2_000, Behavior::Quote(1.0));
    let (b, _) = StubSource::new("B", 2_000, Behavior::Quote(2.0));

    let start = Instant::now();
    assert!(run_race(&[a, b], &race_with_deadline(200), &CancelFlag::new()).is_none());
    assert!(start.elapsed() < Duration::from_millis(1_000));
}

#[test]
fn race_stops_waiting_when_cancelled() {
    let (a, _) = StubSource::new("A", 3_000, Behavior::Quote(1.0));
    let (b, _) = StubSource::new("B", 3_000, Behavior::Quote(2.0));
    let cancel = CancelFlag::new();
    let trigger = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        trigger.cancel();
    });

    let start = Instant::now();
    assert!(run_race(&[a, b], &race_with_deadline(10_000), &cancel).is_none());
    assert!(start.elapsed() < Duration::from_millis(1_000));
    canceller.join().unwrap();
}

#[test]
fn race_returns_none_when_every_source_fails() {
    let (a, _) = StubSource::new("A", 5, Behavior::Fail);
    let (b, _) = StubSource::new("B", 5, Behavior::Empty);

    let start = Instant::now();
    assert!(run_race(&[a, b], &race_with_deadline(5_000), &CancelFlag::new()).is_none());
    assert!(start.elapsed() < Duration::from_millis(1_000));
}

#[test]
fn race_with_small_pool_still_reaches_later_sources() {
    let (a, _) = StubSource::new("A", 5, Behavior::Fail);
    let (b, _) = StubSource::new("B", 5, Behavior::Empty);
    let (c, c_calls) = StubSource::new("C", 5, Behavior::Quote(630.0));
    let opts = RaceOptions {
        max_workers: 1,
        deadline: Duration::from_secs(2),
    };

    let quote = run_race(&[a, b, c], &opts, &CancelFlag::new()).expect("quote");
    assert_eq!(quote.source, "C");
    assert_eq!(c_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn race_with_no_sources_is_empty() {
    assert!(run_race(&[], &RaceOptions::default(), &CancelFlag::new()).is_none());
}

#[test]
fn orchestrator_dispatches_on_strategy() {
    let (a, _) = StubSource::new("A", 0, Behavior::Quote(640.0));
    let orchestrator = Orchestrator {
        strategy: Strategy::Race,
        race: race_with_deadline(1_000),
        ..Orchestrator::default()
    };
    let quote = orchestrator.acquire(&[a], &CancelFlag::new()).expect("quote");
    assert_eq!(quote.source, "A");

    let (b, _) = StubSource::new("B", 0, Behavior::Fail);
    let sequential = Orchestrator {
        sequential: quick_sequential(),
        ..Orchestrator::default()
    };
    assert_eq!(sequential.strategy, Strategy::Sequential);
    assert!(sequential.acquire(&[b], &CancelFlag::new()).is_none());
}
