//! Gold Push: fetches the current Au99.99 reference price from a list of public
//! sources, classifies it with a simple buy indicator and pushes an HTML card through
//! PushPlus.
//!
//! Usage example (CLI):
//! ```bash
//! gold_push --strategy race --sources eastmoney,jijinhao,goldprice
//! ```
//!
//! Every flag can also come from the environment or a `.env` file
//! (`PUSHPLUS_TOKEN`, `GOLD_STRATEGY`, `GOLD_SOURCES`, ...). Without a token the quote is
//! printed as JSON instead of pushed.
#![warn(missing_docs)]
mod args;
mod config;
mod render;
mod sender;

use crate::args::Args;
use crate::config::Config;
use clap::Parser;
use gold_common::GoldError;
use gold_common::net::{CancelFlag, HttpClient};
use gold_sources::adapters;
use log::{debug, info, warn};
use std::sync::Arc;

fn main() -> Result<(), GoldError> {
    // Loaded before the logger so RUST_LOG from .env is honoured.
    let dotenv = dotenvy::dotenv();
    init_logger();
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {}", e),
    }

    let args = Args::parse();
    let config = Config::from_args(args)?;
    info!("=== gold price push starting ===");

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            info!("Ctrl+C received. Cancelling acquisition...");
            cancel.cancel();
        }) {
            warn!("Failed to install Ctrl+C handler: {}", e);
        }
    }

    let http = Arc::new(HttpClient::new(&config.http, cancel.clone())?);
    let sources = adapters::build_all(&config.sources, &http, &config.quote);

    let Some(quote) = config.orchestrator.acquire(&sources, &cancel) else {
        return Ok(());
    };
    info!("{} {} (score {})", quote.advice_icon, quote.advice, quote.buy_score);

    let delivery = sender::deliver(&config.push, &quote);
    debug!("Delivery outcome: {:?}", delivery);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
