//! Command-line arguments for the gold price push job.
//!
//! Every flag can also be set through the environment (and therefore through a `.env`
//! file), which is how the job is normally configured when run from a scheduler.
use clap::Parser;
use gold_sources::{SourceKind, Strategy};

use crate::sender::DEFAULT_PUSH_URL;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// PushPlus token. Without it the result is printed instead of pushed.
    #[clap(long, env = "PUSHPLUS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// PushPlus topic (group) to deliver to.
    #[clap(long, env = "PUSHPLUS_TOPIC")]
    pub topic: Option<String>,

    /// PushPlus send endpoint.
    #[clap(long, env = "PUSHPLUS_URL", default_value = DEFAULT_PUSH_URL)]
    pub push_url: String,

    /// Acquisition strategy.
    #[clap(long, env = "GOLD_STRATEGY", value_enum, default_value_t = Strategy::Sequential)]
    pub strategy: Strategy,

    /// Sources in priority order, comma separated.
    #[clap(
        long,
        env = "GOLD_SOURCES",
        value_enum,
        value_delimiter = ',',
        default_values_t = SourceKind::DEFAULT_ORDER.to_vec()
    )]
    pub sources: Vec<SourceKind>,

    /// Mark-up in CNY per gram added for the retail estimate.
    #[clap(long, env = "GOLD_SURCHARGE", default_value_t = 25.0)]
    pub surcharge: f64,

    /// Overall deadline for the race strategy, in seconds.
    #[clap(long, default_value_t = 18)]
    pub deadline_secs: u64,

    /// Worker threads for the race strategy.
    #[clap(long, default_value_t = 4)]
    pub max_workers: usize,

    /// Pause between failed sources in the sequential strategy, in milliseconds.
    #[clap(long, default_value_t = 1200)]
    pub retry_delay_ms: u64,

    /// Connect timeout per request, in seconds.
    #[clap(long, default_value_t = 3)]
    pub connect_timeout_secs: u64,

    /// Total timeout per request, in seconds.
    #[clap(long, default_value_t = 8)]
    pub request_timeout_secs: u64,

    /// Attempts per request for retriable statuses.
    #[clap(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Exit with an error when no PushPlus token is configured.
    #[clap(long)]
    pub require_token: bool,
}
