//! Run configuration, built once from [`Args`] and passed by reference.
use std::time::Duration;

use gold_common::net::{HttpSettings, RetryPolicy};
use gold_common::quote::QuoteSettings;
use gold_common::{GoldError, Result};
use gold_sources::{Orchestrator, RaceOptions, SequentialOptions, SourceKind};

use crate::args::Args;

/// Where and how to push.
#[derive(Debug, Clone, PartialEq)]
pub struct PushConfig {
    /// Send endpoint.
    pub url: String,
    /// PushPlus token; `None` means print instead of push.
    pub token: Option<String>,
    /// Optional PushPlus topic.
    pub topic: Option<String>,
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sources in priority order.
    pub sources: Vec<SourceKind>,
    /// Timeouts and retry policy for source requests.
    pub http: HttpSettings,
    /// Normalization settings.
    pub quote: QuoteSettings,
    /// Acquisition strategy and its options.
    pub orchestrator: Orchestrator,
    /// Push target.
    pub push: PushConfig,
}

/// Blank values (e.g. an unset CI secret exported as `""`) count as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Validate `args` and build the run configuration.
    pub fn from_args(args: Args) -> Result<Self> {
        if args.sources.is_empty() {
            return Err(GoldError::Config("no sources selected".into()));
        }
        if !args.surcharge.is_finite() || args.surcharge < 0.0 {
            return Err(GoldError::Config(format!(
                "surcharge must be a non-negative number, got {}",
                args.surcharge
            )));
        }
        if args.max_attempts == 0 {
            return Err(GoldError::Config("max-attempts must be at least 1".into()));
        }

        let token = non_blank(args.token);
        if args.require_token && token.is_none() {
            return Err(GoldError::Config(
                "PUSHPLUS_TOKEN is required but not configured".into(),
            ));
        }

        let mut sources = Vec::with_capacity(args.sources.len());
        for kind in args.sources {
            if !sources.contains(&kind) {
                sources.push(kind);
            }
        }

        Ok(Self {
            sources,
            http: HttpSettings {
                connect_timeout: Duration::from_secs(args.connect_timeout_secs),
                request_timeout: Duration::from_secs(args.request_timeout_secs),
                retry: RetryPolicy {
                    max_attempts: args.max_attempts,
                    ..RetryPolicy::default()
                },
            },
            quote: QuoteSettings {
                surcharge: args.surcharge,
                ..QuoteSettings::default()
            },
            orchestrator: Orchestrator {
                strategy: args.strategy,
                sequential: SequentialOptions {
                    retry_delay: Duration::from_millis(args.retry_delay_ms),
                },
                race: RaceOptions {
                    max_workers: args.max_workers.max(1),
                    deadline: Duration::from_secs(args.deadline_secs),
                },
            },
            push: PushConfig {
                url: args.push_url,
                token,
                topic: non_blank(args.topic),
            },
        })
    }
}
