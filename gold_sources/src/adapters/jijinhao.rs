//! Jijinhao realtime quote adapter.
//!
//! The endpoint answers with a JavaScript assignment such as
//! `var quote_json = {"JO_92233":{"last":"612.35","pre_close":"610.00",...}}`.
//! The object is not always valid JSON, so the two fields are pulled out with regexes
//! instead of a full decode.
use std::sync::{Arc, LazyLock};

use gold_common::net::HttpClient;
use gold_common::quote::QuoteSettings;
use gold_common::{GoldError, PriceQuote, Reading, Result};
use regex::Regex;

use crate::source::PriceSource;

/// Default realtime endpoint for JO_92233 (Au99.99).
pub const DEFAULT_URL: &str = "https://api.jijinhao.com/sQuoteCenter/realTime.jsp?sCodes=JO_92233";
const REFERER: &str = "https://www.dyhjw.com/";
const NAME: &str = "Jijinhao";

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)=\s*(\{.*\})").expect("valid assignment regex"));
static LAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""last"\s*:\s*"?(-?[\d.]+)"?"#).expect("valid last regex"));
static PRE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""pre_close"\s*:\s*"?(-?[\d.]+)"?"#).expect("valid pre_close regex")
});

fn capture_number(re: &Regex, text: &str, field: &str) -> Result<f64> {
    let caps = re
        .captures(text)
        .ok_or_else(|| GoldError::shape(format!("field {field} not found")))?;
    caps[1]
        .parse::<f64>()
        .map_err(|e| GoldError::shape(format!("bad {field} {:?}: {e}", &caps[1])))
}

/// Extract `(last, pre_close)` from the realtime response body.
pub fn parse_realtime(body: &str) -> Result<(f64, f64)> {
    let object = ASSIGNMENT
        .captures(body)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .ok_or_else(|| GoldError::shape("no embedded object in realtime response"))?;
    let last = capture_number(&LAST, object, "last")?;
    let pre_close = capture_number(&PRE_CLOSE, object, "pre_close")?;
    Ok((last, pre_close))
}

/// Adapter for the Jijinhao realtime endpoint.
pub struct JijinhaoSource {
    http: Arc<HttpClient>,
    settings: QuoteSettings,
    url: String,
}

impl JijinhaoSource {
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

impl PriceSource for JijinhaoSource {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch(&self) -> Result<Option<PriceQuote>> {
        let body = self.http.get_text(&self.url, Some(REFERER))?;
        let (last, pre_close) = parse_realtime(&body)?;
        Ok(PriceQuote::from_reading(
            NAME,
            Reading::with_previous(last, pre_close),
            &self.settings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_fields() {
        let body = r#"var quote_json = {"flag":true,"JO_92233":{"code":"JO_92233","last":"612.35","pre_close":"610.00","time":"15:30"}};"#;
        assert_eq!(parse_realtime(body).unwrap(), (612.35, 610.0));
    }

    #[test]
    fn parses_unquoted_numbers() {
        let body = "var q = {\"last\": 600.5, \"pre_close\": 598};";
        assert_eq!(parse_realtime(body).unwrap(), (600.5, 598.0));
    }

    #[test]
    fn missing_pre_close_is_a_shape_error() {
        let body = r#"var q = {"last":"612.35"};"#;
        assert!(matches!(parse_realtime(body), Err(GoldError::Shape(_))));
    }

    #[test]
    fn body_without_assignment_is_a_shape_error() {
        assert!(matches!(parse_realtime("<html>busy</html>"), Err(GoldError::Shape(_))));
    }
}
