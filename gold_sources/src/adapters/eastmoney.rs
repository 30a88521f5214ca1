//! EastMoney daily K-line adapter.
//!
//! The endpoint returns `data.klines` as comma-delimited strings
//! `date,open,close,high,low`; the close (third field) of each day becomes the history,
//! and the last one is the current price.
use std::sync::Arc;

use gold_common::net::HttpClient;
use gold_common::quote::QuoteSettings;
use gold_common::{GoldError, PriceQuote, Reading, Result};
use log::warn;
use serde::Deserialize;

use crate::source::PriceSource;

/// Default K-line endpoint (Au99.99, daily, last 6 bars).
pub const DEFAULT_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get?secid=119.Au9999&fields1=f1&fields2=f51,f52,f53,f54,f55&klt=101&fqt=1&lmt=6";
const REFERER: &str = "https://quote.eastmoney.com/";
const NAME: &str = "EastMoney";
const CLOSE_FIELD: usize = 2;

#[derive(Debug, Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Vec<String>,
}

/// Parse the close price out of each K-line row.
pub fn parse_closes(klines: &[String]) -> Result<Vec<f64>> {
    klines
        .iter()
        .map(|line| {
            let field = line
                .split(',')
                .nth(CLOSE_FIELD)
                .ok_or_else(|| GoldError::shape(format!("kline without close: {line:?}")))?;
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| GoldError::shape(format!("bad close {field:?}: {e}")))
        })
        .collect()
}

/// Adapter for the EastMoney K-line endpoint.
pub struct EastMoneySource {
    http: Arc<HttpClient>,
    settings: QuoteSettings,
    url: String,
}

impl EastMoneySource {
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

impl PriceSource for EastMoneySource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Option<PriceQuote>> {
        let resp: KlineResponse = self.http.get_json(&self.url, Some(REFERER))?;
        let klines = match resp.data {
            Some(data) if !data.klines.is_empty() => data.klines,
            _ => {
                warn!("{NAME}: response without klines");
                return Ok(None);
            }
        };

        let closes = parse_closes(&klines)?;
        let Some(reading) = Reading::from_closes(&closes) else {
            return Ok(None);
        };
        Ok(PriceQuote::from_reading(NAME, reading, &self.settings))
    }
}
