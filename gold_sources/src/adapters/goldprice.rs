//! GoldPrice.org adapter.
//!
//! Returns XAU in CNY per troy ounce. `xauClose` is used as the previous close when the
//! upstream includes it; otherwise the quote is spot-only with zero change.
use std::sync::Arc;

use gold_common::net::{GRAMS_PER_TROY_OUNCE, HttpClient};
use gold_common::quote::QuoteSettings;
use gold_common::{PriceQuote, Reading, Result};
use log::warn;
use serde::Deserialize;

use crate::source::PriceSource;

/// Default CNY rates endpoint.
pub const DEFAULT_URL: &str = "https://data-asg.goldprice.org/dbXRates/CNY";
const NAME: &str = "GoldPrice.org";

#[derive(Debug, Deserialize)]
struct Rates {
    #[serde(default)]
    items: Vec<RateItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateItem {
    xau_price: Option<f64>,
    xau_close: Option<f64>,
}

/// Adapter for the GoldPrice.org rates endpoint.
pub struct GoldPriceSource {
    http: Arc<HttpClient>,
    settings: QuoteSettings,
    url: String,
}

impl GoldPriceSource {
    /// Adapter against [`DEFAULT_URL`].
    pub fn new(http: Arc<HttpClient>, settings: QuoteSettings) -> Self {
        Self {
            http,
            settings,
            url: DEFAULT_URL.to_string(),
        }
    }

    /// Override the endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl PriceSource for GoldPriceSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Option<PriceQuote>> {
        let rates: Rates = self.http.get_json(&self.url, None)?;
        let Some(item) = rates.items.first() else {
            warn!("{NAME}: response without items");
            return Ok(None);
        };

        let price = item.xau_price.unwrap_or(0.0) / GRAMS_PER_TROY_OUNCE;
        let reading = match item.xau_close {
            Some(close) if close > 0.0 => {
                Reading::with_previous(price, close / GRAMS_PER_TROY_OUNCE)
            }
            _ => Reading::spot(price),
        };
        Ok(PriceQuote::from_reading(NAME, reading, &self.settings))
    }
}
