//! Trend indicators and advice classification.
//!
//! Two classifiers share the same `Advice` output shape:
//!
//! - [`technical_advice`]: used when a source provides a short history of daily
//!   closes. Combines the history with the current price, takes a moving average over
//!   the last `ma_window` points and locates the price inside the observed low/high band.
//! - [`basic_advice`]: one-shot classification on the same-day percentage change, for
//!   sources that only report current and previous close.
//!
//! Scores are ordered so that a lower value means a more favorable moment to buy.

/// Classification thresholds. These are tuning constants, not protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Minimum number of prior closes needed before a trend is computed.
    pub min_history: usize,
    /// Moving-average window, counted over history plus the current price.
    pub ma_window: usize,
    /// Position-in-range (percent) below which a below-average price is a strong buy.
    pub low_position: f64,
    /// Position-in-range (percent) below which a below-average price is a regular buy.
    pub mid_position: f64,
    /// Position-in-range (percent) above which an above-average price is a strong avoid.
    pub high_position: f64,
    /// Same-day change (percent) below which the move counts as a sharp drop.
    pub deep_drop: f64,
    /// Same-day change (percent) below which the move counts as a pullback.
    pub mild_drop: f64,
    /// Same-day change (percent) above which the move counts as a small rise.
    pub mild_rise: f64,
    /// Same-day change (percent) above which the move counts as a surge.
    pub sharp_rise: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_history: 3,
            ma_window: 5,
            low_position: 20.0,
            mid_position: 50.0,
            high_position: 80.0,
            deep_drop: -1.2,
            mild_drop: -0.3,
            mild_rise: 0.3,
            sharp_rise: 1.2,
        }
    }
}

/// Discrete advice label attached to every quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Below the moving average and near the bottom of the range.
    RangeLow,
    /// Below the moving average, lower half of the range.
    BelowAverage,
    /// Below the moving average, upper half of the range.
    BrokeAverage,
    /// At or above the moving average, not yet at the top of the range.
    AboveAverage,
    /// At or above the moving average and near the top of the range.
    RangeHigh,
    /// Same-day change below the deep-drop threshold.
    SharpDrop,
    /// Same-day change below the mild-drop threshold.
    Pullback,
    /// Same-day change inside the flat band.
    Flat,
    /// Same-day change above the mild-rise threshold.
    SmallRise,
    /// Same-day change above the sharp-rise threshold.
    Surge,
    /// History too short to compute a trend.
    Insufficient,
    /// Spot-only source with no baseline to compare against.
    SpotReference,
}

impl Advice {
    /// Human-readable advice text.
    pub fn label(self) -> &'static str {
        match self {
            Advice::RangeLow => "5-day low, good time to buy",
            Advice::BelowAverage => "below weekly average, buy",
            Advice::BrokeAverage => "dipped under average, start a position",
            Advice::AboveAverage => "above weekly average, watch",
            Advice::RangeHigh => "5-day high, beware pullback",
            Advice::SharpDrop => "sharp drop, buying opportunity",
            Advice::Pullback => "pulling back, good to buy",
            Advice::Flat => "trading flat, buy as needed",
            Advice::SmallRise => "small rise, watch",
            Advice::Surge => "surging, do not chase",
            Advice::Insufficient => "source unstable, buy in batches",
            Advice::SpotReference => "spot reference only",
        }
    }

    /// Short symbol shown next to the label.
    pub fn icon(self) -> &'static str {
        match self {
            Advice::RangeLow | Advice::SharpDrop => "🔥🔥",
            Advice::BelowAverage | Advice::Pullback => "🛒",
            Advice::BrokeAverage => "📉",
            Advice::AboveAverage | Advice::SmallRise => "✋",
            Advice::RangeHigh | Advice::Surge => "🛑",
            Advice::Flat => "☕",
            Advice::Insufficient => "⚖️",
            Advice::SpotReference => "🌐",
        }
    }

    /// Buy score in `[0, 100]`; lower favors buying.
    pub fn score(self) -> u8 {
        let raw: i32 = match self {
            Advice::RangeLow | Advice::SharpDrop => 10,
            Advice::BelowAverage => 25,
            Advice::Pullback => 30,
            Advice::BrokeAverage => 40,
            Advice::Flat | Advice::Insufficient | Advice::SpotReference => 50,
            Advice::AboveAverage | Advice::SmallRise => 70,
            Advice::RangeHigh | Advice::Surge => 90,
        };
        clamp_score(raw)
    }
}

/// Clamp any integer score into `[0, 100]`.
pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Output of the technical classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSignal {
    /// Chosen advice.
    pub advice: Advice,
    /// Moving average, absent when history was insufficient.
    pub moving_average: Option<f64>,
    /// Position of the price inside `[range_low, range_high]`, in percent. Not clamped.
    pub position_pct: f64,
    /// Minimum of history plus current price.
    pub range_low: f64,
    /// Maximum of history plus current price.
    pub range_high: f64,
}

/// Mean of the last `window` values, or of all values when there are fewer.
///
/// Returns `None` for an empty slice or a zero window.
pub fn moving_average(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() || window == 0 {
        return None;
    }
    let tail = &values[values.len().saturating_sub(window)..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

/// Position of `price` within `[low, high]` in percent; 50 for a zero-width range.
pub fn position_in_range(price: f64, low: f64, high: f64) -> f64 {
    if high == low {
        50.0
    } else {
        (price - low) / (high - low) * 100.0
    }
}

/// Classify `price` against prior daily closes (oldest first, excluding `price`).
pub fn technical_advice(price: f64, history: &[f64], th: &Thresholds) -> TrendSignal {
    if history.len() < th.min_history {
        return TrendSignal {
            advice: Advice::Insufficient,
            moving_average: None,
            position_pct: 50.0,
            range_low: price,
            range_high: price,
        };
    }

    let mut combined = Vec::with_capacity(history.len() + 1);
    combined.extend_from_slice(history);
    combined.push(price);

    let ma = moving_average(&combined, th.ma_window).unwrap_or(price);
    let low = combined.iter().copied().fold(f64::INFINITY, f64::min);
    let high = combined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let position = position_in_range(price, low, high);

    let advice = if price < ma {
        if position < th.low_position {
            Advice::RangeLow
        } else if position < th.mid_position {
            Advice::BelowAverage
        } else {
            Advice::BrokeAverage
        }
    } else if position > th.high_position {
        Advice::RangeHigh
    } else {
        Advice::AboveAverage
    };

    TrendSignal {
        advice,
        moving_average: Some(ma),
        position_pct: position,
        range_low: low,
        range_high: high,
    }
}

/// Classify a same-day percentage change.
pub fn basic_advice(change_pct: f64, th: &Thresholds) -> Advice {
    if change_pct < th.deep_drop {
        Advice::SharpDrop
    } else if change_pct < th.mild_drop {
        Advice::Pullback
    } else if change_pct > th.sharp_rise {
        Advice::Surge
    } else if change_pct > th.mild_rise {
        Advice::SmallRise
    } else {
        Advice::Flat
    }
}
