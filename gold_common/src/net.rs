//! Shared HTTP plumbing used by every quote source and by the push sender.
//!
//! [`HttpClient`] wraps one `reqwest::blocking::Client` (connection reuse, safe to share
//! across worker threads) and applies a single [`RetryPolicy`] to every GET, so adapters
//! never carry their own retry loops. Requests rotate through a small pool of browser
//! user agents, since several upstreams reject obvious bot traffic.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, REFERER, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::GoldError;
use crate::result::Result;

/// Troy ounce in grams.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

/// Browser user agents picked at random per request.
pub const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

/// Granularity of cancellable sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Pick one of [`USER_AGENTS`].
pub fn random_user_agent() -> &'static str {
    let idx = rand::rng().random_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Cooperative cancellation shared by the orchestrator, the HTTP client and Ctrl+C.
///
/// Raising the flag never interrupts a request already on the wire; it stops further
/// attempts, backoff sleeps and multi-step adapters at their next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New, un-raised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag was raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GoldError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `total`, waking early with `Err(Cancelled)` if the flag is raised.
    pub fn sleep(&self, total: Duration) -> Result<()> {
        let mut remaining = total;
        while !remaining.is_zero() {
            self.check()?;
            let step = remaining.min(SLEEP_SLICE);
            thread::sleep(step);
            remaining -= step;
        }
        self.check()
    }
}

/// Transport-level retry with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt.
    pub backoff_base: Duration,
    /// Status codes worth retrying.
    pub retriable: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            retriable: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Whether `status` is in the retriable set.
    pub fn is_retriable(&self, status: u16) -> bool {
        self.retriable.contains(&status)
    }

    /// Backoff after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exp)
    }
}

/// Timeouts and retry policy for an [`HttpClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout, connect through body.
    pub request_timeout: Duration,
    /// Retry policy for GETs.
    pub retry: RetryPolicy,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(8),
            retry: RetryPolicy::default(),
        }
    }
}

/// Blocking HTTP client shared by all sources.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
    cancel: CancelFlag,
}

impl HttpClient {
    /// Build a client with the given timeouts, observing `cancel` between attempts.
    pub fn new(settings: &HttpSettings, cancel: CancelFlag) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self {
            client,
            retry: settings.retry.clone(),
            cancel,
        })
    }

    /// Cancellation flag observed by this client.
    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// GET `url` and return the body as text, retrying per the policy.
    pub fn get_text(&self, url: &str, referer: Option<&str>) -> Result<String> {
        let mut attempt = 1u32;
        loop {
            self.cancel.check()?;
            let mut request = self
                .client
                .get(url)
                .header(USER_AGENT, random_user_agent())
                .header(ACCEPT, "*/*");
            if let Some(referer) = referer {
                request = request.header(REFERER, referer);
            }

            debug!("GET {} (attempt {})", url, attempt);
            match request.send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.text()?);
                    }
                    let code = status.as_u16();
                    if self.retry.is_retriable(code) && attempt < self.retry.max_attempts {
                        let wait = self.retry.backoff(attempt);
                        warn!("GET {} returned {}, retrying in {:?}", url, code, wait);
                        self.cancel.sleep(wait)?;
                        attempt += 1;
                        continue;
                    }
                    return Err(GoldError::Status {
                        url: url.to_string(),
                        status: code,
                    });
                }
                Err(err) if err.is_connect() && attempt < self.retry.max_attempts => {
                    let wait = self.retry.backoff(attempt);
                    warn!("GET {} failed to connect ({}), retrying in {:?}", url, err, wait);
                    self.cancel.sleep(wait)?;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// GET `url` and decode the JSON body into `T`.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str, referer: Option<&str>) -> Result<T> {
        let body = self.get_text(url, referer)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST `body` as JSON once, without retries. Returns the status code and response text.
    pub fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(u16, String)> {
        let resp = self
            .client
            .post(url)
            .header(USER_AGENT, random_user_agent())
            .json(body)
            .send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;
        Ok((status, text))
    }
}
