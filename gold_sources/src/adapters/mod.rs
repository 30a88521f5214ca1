//! Concrete upstream adapters and the catalogue used to select them.
//!
//! - `eastmoney`: daily K-line closes for Au99.99 (history, previous close).
//! - `jijinhao`: realtime quote embedded in a JavaScript assignment (previous close).
//! - `binance`: PAXG/USDT 24h ticker converted through the USD/CNY rate (same-day change).
//! - `goldprice`: GoldPrice.org XAU in CNY per ounce (spot, optional close).
use std::sync::Arc;

use clap::ValueEnum;
use gold_common::net::HttpClient;
use gold_common::quote::QuoteSettings;
use strum_macros::{Display, EnumString};

use crate::source::PriceSource;

pub mod binance;
pub mod eastmoney;
pub mod goldprice;
pub mod jijinhao;

pub use binance::BinanceSource;
pub use eastmoney::EastMoneySource;
pub use goldprice::GoldPriceSource;
pub use jijinhao::JijinhaoSource;

/// Supported upstream sources.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, ValueEnum, Display, EnumString, Hash, Eq, PartialEq)]
#[clap(rename_all = "lower")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceKind {
    EastMoney,
    Jijinhao,
    Binance,
    GoldPrice,
}

impl SourceKind {
    /// Default priority: richest data first, spot-only last.
    pub const DEFAULT_ORDER: [SourceKind; 4] = [
        SourceKind::EastMoney,
        SourceKind::Jijinhao,
        SourceKind::Binance,
        SourceKind::GoldPrice,
    ];

    /// Build the adapter for this kind against its default endpoint.
    pub fn build(self, http: &Arc<HttpClient>, settings: &QuoteSettings) -> Arc<dyn PriceSource> {
        let http = Arc::clone(http);
        let settings = settings.clone();
        match self {
            SourceKind::EastMoney => Arc::new(EastMoneySource::new(http, settings)),
            SourceKind::Jijinhao => Arc::new(JijinhaoSource::new(http, settings)),
            SourceKind::Binance => Arc::new(BinanceSource::new(http, settings)),
            SourceKind::GoldPrice => Arc::new(GoldPriceSource::new(http, settings)),
        }
    }
}

/// Build adapters for `kinds`, preserving order.
pub fn build_all(
    kinds: &[SourceKind],
    http: &Arc<HttpClient>,
    settings: &QuoteSettings,
) -> Vec<Arc<dyn PriceSource>> {
    kinds.iter().map(|kind| kind.build(http, settings)).collect()
}
