//! Normalized price quote and the raw reading it is built from.
//!
//! Adapters only extract numbers from their upstream payload into a [`Reading`]; the
//! conversion to a [`PriceQuote`] (change, percentage, advice, range, retail estimate)
//! happens here so every source is classified the same way.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::indicator::{self, Advice, Thresholds};

/// Number of prior closes kept on the quote for display.
const RECENT_LEN: usize = 3;

/// Raw numbers extracted from one upstream response, in CNY per gram.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Current price.
    pub current: f64,
    /// Previous close, when the source reports one.
    pub previous: Option<f64>,
    /// Prior daily closes, oldest first, excluding `current`.
    pub history: Option<Vec<f64>>,
}

impl Reading {
    /// A spot price without baseline or history.
    pub fn spot(current: f64) -> Self {
        Self {
            current,
            previous: None,
            history: None,
        }
    }

    /// A price with a previous close.
    pub fn with_previous(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous: Some(previous),
            history: None,
        }
    }

    /// Build from a series of daily closes, oldest first; the last close is the current price.
    ///
    /// Returns `None` for an empty series.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        let (current, history) = closes.split_last()?;
        Some(Self {
            current: *current,
            previous: history.last().copied(),
            history: Some(history.to_vec()),
        })
    }
}

/// Settings applied while normalizing a reading.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSettings {
    /// Fixed mark-up added to the price for the retail estimate.
    pub surcharge: f64,
    /// Advice thresholds.
    pub thresholds: Thresholds,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            surcharge: 25.0,
            thresholds: Thresholds::default(),
        }
    }
}

/// A single source's gold price, classified and ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    /// Source identifier.
    pub source: String,
    /// Current price, CNY per gram.
    pub price: f64,
    /// Change versus previous close; 0 when unknown.
    pub change: f64,
    /// Change in percent versus previous close; 0 when unknown.
    pub change_pct: f64,
    /// Advice text.
    pub advice: String,
    /// Advice symbol.
    pub advice_icon: String,
    /// Buy score in `[0, 100]`, lower favors buying.
    pub buy_score: u8,
    /// Marker position in percent for the range bar.
    pub position_pct: f64,
    /// Low of the observed range.
    pub range_low: f64,
    /// High of the observed range.
    pub range_high: f64,
    /// The three closes preceding the current price, oldest first; empty when fewer are known.
    pub recent_history: Vec<f64>,
    /// Price plus the configured surcharge.
    pub estimated_retail_price: f64,
    /// Local time the quote was built.
    pub fetched_at: DateTime<Local>,
}

impl PriceQuote {
    /// Normalize `reading` into a quote, or `None` when the price is not usable.
    ///
    /// A non-finite or non-positive current price is treated as a closed market or a
    /// malformed response.
    pub fn from_reading(source: &str, reading: Reading, settings: &QuoteSettings) -> Option<Self> {
        let Reading {
            current,
            previous,
            history,
        } = reading;
        if !current.is_finite() || current <= 0.0 {
            return None;
        }

        let (change, change_pct) = match previous {
            Some(prev) if prev.is_finite() && prev != 0.0 => {
                let change = current - prev;
                (change, change / prev * 100.0)
            }
            _ => (0.0, 0.0),
        };

        let th = &settings.thresholds;
        let (advice, position_pct, range_low, range_high, recent) = match history {
            Some(history) => {
                let signal = indicator::technical_advice(current, &history, th);
                // Chips only when a full window of prior closes is available.
                let recent = match history.len().checked_sub(RECENT_LEN) {
                    Some(start) => history[start..].to_vec(),
                    None => Vec::new(),
                };
                (
                    signal.advice,
                    signal.position_pct,
                    signal.range_low,
                    signal.range_high,
                    recent,
                )
            }
            None if previous.is_some() => {
                let advice = indicator::basic_advice(change_pct, th);
                (advice, advice.score() as f64, current, current, Vec::new())
            }
            None => (Advice::SpotReference, 50.0, current, current, Vec::new()),
        };

        Some(Self {
            source: source.to_string(),
            price: round2(current),
            change: round2(change),
            change_pct: round2(change_pct),
            advice: advice.label().to_string(),
            advice_icon: advice.icon().to_string(),
            buy_score: advice.score(),
            position_pct: round2(position_pct),
            range_low: round2(range_low),
            range_high: round2(range_high),
            recent_history: recent.into_iter().map(round2).collect(),
            estimated_retail_price: round1(current + settings.surcharge),
            fetched_at: Local::now(),
        })
    }
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_from_previous_close() {
        let quote = PriceQuote::from_reading(
            "test",
            Reading::with_previous(500.0, 495.0),
            &QuoteSettings::default(),
        )
        .unwrap();
        assert_eq!(quote.price, 500.0);
        assert_eq!(quote.change, 5.0);
        assert_eq!(quote.change_pct, 1.01);
        assert_eq!(quote.advice, "small rise, watch");
        assert_eq!(quote.advice_icon, "✋");
        assert_eq!(quote.buy_score, 70);
        assert_eq!(quote.estimated_retail_price, 525.0);
        assert_eq!(quote.range_low, 500.0);
        assert_eq!(quote.range_high, 500.0);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let settings = QuoteSettings::default();
        assert!(PriceQuote::from_reading("x", Reading::spot(0.0), &settings).is_none());
        assert!(PriceQuote::from_reading("x", Reading::spot(-3.0), &settings).is_none());
        assert!(PriceQuote::from_reading("x", Reading::spot(f64::NAN), &settings).is_none());
        assert!(PriceQuote::from_closes_for_test(&[480.0, 0.0]).is_none());
    }

    #[test]
    fn zero_baseline_means_zero_change() {
        let quote = PriceQuote::from_reading(
            "x",
            Reading::with_previous(500.0, 0.0),
            &QuoteSettings::default(),
        )
        .unwrap();
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_pct, 0.0);
        assert_eq!(quote.advice, "trading flat, buy as needed");
    }

    #[test]
    fn spot_only_reading() {
        let quote =
            PriceQuote::from_reading("spot", Reading::spot(612.346), &QuoteSettings::default())
                .unwrap();
        assert_eq!(quote.price, 612.35);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_pct, 0.0);
        assert_eq!(quote.buy_score, 50);
        assert_eq!(quote.position_pct, 50.0);
        assert_eq!(quote.advice, Advice::SpotReference.label());
        assert!(quote.recent_history.is_empty());
    }

    #[test]
    fn history_drives_technical_advice() {
        let quote =
            PriceQuote::from_closes_for_test(&[480.0, 482.0, 479.0, 481.0, 483.0, 478.0]).unwrap();
        assert_eq!(quote.price, 478.0);
        assert_eq!(quote.change, -5.0);
        assert_eq!(quote.range_low, 478.0);
        assert_eq!(quote.range_high, 483.0);
        assert_eq!(quote.position_pct, 0.0);
        assert_eq!(quote.advice, Advice::RangeLow.label());
        assert_eq!(quote.buy_score, 10);
        assert_eq!(quote.recent_history, vec![479.0, 481.0, 483.0]);
    }

    #[test]
    fn short_history_has_no_recent_chips() {
        let quote = PriceQuote::from_closes_for_test(&[480.0, 482.0, 478.0]).unwrap();
        assert!(quote.recent_history.is_empty());

        let quote = PriceQuote::from_closes_for_test(&[480.0, 482.0, 479.0, 478.0]).unwrap();
        assert_eq!(quote.recent_history, vec![480.0, 482.0, 479.0]);
    }

    #[test]
    fn reading_from_closes() {
        assert!(Reading::from_closes(&[]).is_none());
        let single = Reading::from_closes(&[10.0]).unwrap();
        assert_eq!(single.current, 10.0);
        assert_eq!(single.previous, None);
        assert_eq!(single.history, Some(Vec::new()));
    }

    #[test]
    fn custom_surcharge() {
        let settings = QuoteSettings {
            surcharge: 32.0,
            ..QuoteSettings::default()
        };
        let quote = PriceQuote::from_reading("x", Reading::spot(600.04), &settings).unwrap();
        assert_eq!(quote.estimated_retail_price, 632.0);
    }

    impl PriceQuote {
        fn from_closes_for_test(closes: &[f64]) -> Option<Self> {
            Self::from_reading(
                "test",
                Reading::from_closes(closes)?,
                &QuoteSettings::default(),
            )
        }
    }
}
