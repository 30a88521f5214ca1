//! Binance PAXG adapter.
//!
//! PAXG tracks one troy ounce of gold, so the 24h PAXG/USDT ticker converted with the
//! USD/CNY rate gives an international reference price in CNY per gram. Two calls are
//! needed; the shared cancellation flag is checked between them.
use std::collections::HashMap;
use std::sync::Arc;

use gold_common::net::{GRAMS_PER_TROY_OUNCE, HttpClient};
use gold_common::quote::QuoteSettings;
use gold_common::{GoldError, PriceQuote, Reading, Result};
use log::warn;
use serde::Deserialize;

use crate::source::PriceSource;

/// Default 24h ticker endpoint.
pub const DEFAULT_TICKER_URL: &str = "https://api.binance.com/api/v3/ticker/24hr?symbol=PAXGUSDT";
/// Default USD exchange-rate endpoint.
pub const DEFAULT_FX_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";
const NAME: &str = "Binance";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    last_price: String,
    price_change: String,
}

#[derive(Debug, Deserialize)]
struct FxRates {
    rates: HashMap<String, f64>,
}

fn parse_decimal(raw: &str, field: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| GoldError::shape(format!("bad {field} {raw:?}: {e}")))
}

/// Convert a USD-per-ounce amount into CNY per gram.
pub fn usd_ounce_to_cny_gram(usd: f64, usd_cny: f64) -> f64 {
    usd * usd_cny / GRAMS_PER_TROY_OUNCE
}

/// Adapter for Binance PAXG plus an FX endpoint.
pub struct BinanceSource {
    http: Arc<HttpClient>,
    settings: QuoteSettings,
    ticker_url: String,
    fx_url: String,
}

impl BinanceSource {
    /// Adapter against the default endpoints.
    pub fn new(http: Arc<HttpClient>, settings: QuoteSettings) -> Self {
        Self {
            http,
            settings,
            ticker_url: DEFAULT_TICKER_URL.to_string(),
            fx_url: DEFAULT_FX_URL.to_string(),
        }
    }

    /// Override both endpoints.
    pub fn with_urls(mut self, ticker_url: impl Into<String>, fx_url: impl Into<String>) -> Self {
        self.ticker_url = ticker_url.into();
        self.fx_url = fx_url.into();
        self
    }
}

impl PriceSource for BinanceSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Option<PriceQuote>> {
        let ticker: Ticker24h = self.http.get_json(&self.ticker_url, None)?;
        let last_usd = parse_decimal(&ticker.last_price, "lastPrice")?;
        let change_usd = parse_decimal(&ticker.price_change, "priceChange")?;

        self.http.cancel_flag().check()?;

        let fx: FxRates = self.http.get_json(&self.fx_url, None)?;
        let usd_cny = fx.rates.get("CNY").copied().unwrap_or(0.0);
        if usd_cny <= 0.0 {
            warn!("{NAME}: USD/CNY rate missing or non-positive ({usd_cny})");
            return Ok(None);
        }

        let price = usd_ounce_to_cny_gram(last_usd, usd_cny);
        let change = usd_ounce_to_cny_gram(change_usd, usd_cny);
        Ok(PriceQuote::from_reading(
            NAME,
            Reading::with_previous(price, price - change),
            &self.settings,
        ))
    }
}
