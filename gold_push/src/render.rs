//! Notification title and HTML card for a [`PriceQuote`].
use chrono::{DateTime, Local};
use gold_common::PriceQuote;

const GREEN: &str = "#5cb85c";
const RED: &str = "#d9534f";
const GREY: &str = "#333333";

/// `"+"` for a positive change; negative numbers carry their own sign.
fn sign(change: f64) -> &'static str {
    if change > 0.0 { "+" } else { "" }
}

/// Header colour: green when the price fell, red when it rose.
pub fn header_color(change: f64) -> &'static str {
    if change < 0.0 {
        GREEN
    } else if change > 0.0 {
        RED
    } else {
        GREY
    }
}

/// Short notification title, e.g. `"🛒 Gold: 612.35 (-3.10)"`.
pub fn title(quote: &PriceQuote) -> String {
    format!(
        "{} Gold: {:.2} ({}{:.2})",
        quote.advice_icon,
        quote.price,
        sign(quote.change),
        quote.change
    )
}

fn history_chips(quote: &PriceQuote) -> String {
    if quote.recent_history.is_empty() {
        return String::new();
    }
    let chips: String = quote
        .recent_history
        .iter()
        .map(|p| {
            format!(
                "<span style=\"background:#f3f3f3; padding:2px 5px; margin-right:4px; color:#555;\">{p:.2}</span>"
            )
        })
        .collect();
    format!(
        "<div style=\"margin-top:10px; font-size:12px; color:#666;\">Last 3 days: {chips} <span style=\"font-weight:bold;\">→ {:.2}</span></div>",
        quote.price
    )
}

/// HTML card sent as the notification body.
///
/// The range marker is clamped to `[0, 100]` here only; `quote.position_pct` itself
/// may fall outside that range.
pub fn html(quote: &PriceQuote, now: DateTime<Local>) -> String {
    let color = header_color(quote.change);
    let sign = sign(quote.change);
    let marker = quote.position_pct.clamp(0.0, 100.0);

    format!(
        r#"<div style="font-family: -apple-system, sans-serif; background-color: #ffffff; padding: 15px; border-radius: 10px; border: 1px solid #eee; color: #333333;">
  <div style="background-color: {color}; border-radius: 8px; padding: 20px; color: #ffffff; text-align: center;">
    <div style="font-size: 13px; opacity: 0.9;">Reference gold price (Au99.99)</div>
    <div style="font-size: 40px; font-weight: 800; line-height: 1.1; margin: 5px 0;">{price:.2}</div>
    <div style="display: inline-block; font-size: 14px; background-color: rgba(0,0,0,0.15); padding: 4px 12px; border-radius: 12px;">{sign}{change:.2} CNY ({sign}{change_pct:.2}%)</div>
  </div>
  <div style="background-color: #f8f9fa; margin-top: 15px; border-radius: 8px; padding: 15px; border: 1px solid #eeeeee;">
    <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;">
      <span style="font-weight: bold;">Advice</span>
      <span style="font-weight: bold; color: {color};">{icon} {advice}</span>
    </div>
    <div style="position: relative; height: 8px; background: linear-gradient(90deg, {GREEN} 0%, #ffc107 50%, {RED} 100%); border-radius: 4px; margin-bottom: 10px;">
      <div style="position: absolute; left: {marker:.1}%; top: -3px; width: 6px; height: 14px; background-color: #333333; border: 2px solid #ffffff; border-radius: 3px; transform: translateX(-50%);"></div>
    </div>
    {chips}
  </div>
  <div style="background-color: #fff8e1; margin-top: 15px; border-radius: 8px; padding: 12px; display: flex; justify-content: space-between; align-items: center; border: 1px solid #ffeeba;">
    <div style="font-size: 13px; color: #856404;">Est. retail (incl. fees)</div>
    <div style="font-size: 22px; font-weight: bold; color: #d39e00;">¥ {retail:.1}</div>
  </div>
  <div style="margin-top: 15px; text-align: center; color: #bbbbbb; font-size: 12px;">Updated: {time} | Source: {source}</div>
</div>"#,
        price = quote.price,
        change = quote.change,
        change_pct = quote.change_pct,
        icon = quote.advice_icon,
        advice = quote.advice,
        chips = history_chips(quote),
        retail = quote.estimated_retail_price,
        time = now.format("%Y-%m-%d %H:%M"),
        source = quote.source,
    )
}
