//! Delivering a quote through PushPlus.
//!
//! Delivery is best effort: every failure is logged together with a preview of the
//! payload and swallowed, so a broken gateway never turns a successful acquisition into
//! a failed run. Without a token the quote is printed to stdout instead.
use chrono::Local;
use gold_common::net::{CancelFlag, HttpClient, HttpSettings, RetryPolicy};
use gold_common::{GoldError, PriceQuote, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PushConfig;
use crate::render;

/// PushPlus send endpoint.
pub const DEFAULT_PUSH_URL: &str = "https://www.pushplus.plus/send";

const RESPONSE_PREVIEW: usize = 200;
const PAYLOAD_PREVIEW: usize = 1000;

/// Request body accepted by the PushPlus send endpoint.
#[derive(Debug, Serialize)]
pub struct PushPayload<'a> {
    token: &'a str,
    title: String,
    content: String,
    template: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    code: Option<i64>,
    msg: Option<String>,
}

/// Outcome of [`deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the gateway.
    Sent,
    /// Sending was attempted and failed; details are in the log.
    Failed,
    /// No token configured; the quote went to stdout.
    Printed,
}

/// Timeouts for the push call. The send is never retried.
pub fn push_http_settings() -> HttpSettings {
    HttpSettings {
        connect_timeout: Duration::from_secs(3),
        request_timeout: Duration::from_secs(10),
        retry: RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        },
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Sends rendered quotes to one PushPlus token.
pub struct PushPlusSender {
    http: HttpClient,
    url: String,
    token: String,
    topic: Option<String>,
}

impl PushPlusSender {
    /// Build a sender with its own client.
    ///
    /// The client gets a fresh `CancelFlag`; the acquisition flag is already raised
    /// once a race has a winner.
    pub fn new(config: &PushConfig, token: &str) -> Result<Self> {
        let http = HttpClient::new(&push_http_settings(), CancelFlag::new())?;
        Ok(Self {
            http,
            url: config.url.clone(),
            token: token.to_string(),
            topic: config.topic.clone(),
        })
    }

    /// Request body for `quote`.
    pub fn payload(&self, quote: &PriceQuote) -> PushPayload<'_> {
        PushPayload {
            token: &self.token,
            title: render::title(quote),
            content: render::html(quote, Local::now()),
            template: "html",
            topic: self.topic.as_deref(),
        }
    }

    /// Post `payload` once and check the gateway's verdict.
    ///
    /// A non-2xx status fails with `GoldError::Status`; a PushPlus `code` other than
    /// 200 fails with `GoldError::Push`.
    pub fn post(&self, payload: &PushPayload<'_>) -> Result<()> {
        let (status, body) = self.http.post_json(&self.url, payload)?;
        info!("PushPlus response: {} {}", status, preview(&body, RESPONSE_PREVIEW));
        if !(200..300).contains(&status) {
            return Err(GoldError::Status {
                url: self.url.clone(),
                status,
            });
        }
        match serde_json::from_str::<PushResponse>(&body) {
            Ok(PushResponse {
                code: Some(code),
                msg,
            }) if code != 200 => Err(GoldError::Push(format!(
                "code {}: {}",
                code,
                msg.unwrap_or_default()
            ))),
            _ => Ok(()),
        }
    }

    /// Post `quote` once. Returns `true` when the gateway accepted it.
    pub fn send(&self, quote: &PriceQuote) -> bool {
        let payload = self.payload(quote);
        match self.post(&payload) {
            Ok(()) => true,
            Err(e) => {
                log_undelivered(&e, &payload);
                false
            }
        }
    }
}

/// First [`PAYLOAD_PREVIEW`] chars of the serialized payload.
pub fn payload_preview(payload: &PushPayload<'_>) -> String {
    let body = serde_json::to_string(payload).unwrap_or_default();
    preview(&body, PAYLOAD_PREVIEW)
}

fn log_undelivered(err: &GoldError, payload: &PushPayload<'_>) {
    error!("PushPlus send failed: {}", err);
    error!("Payload preview: {}", payload_preview(payload));
}

/// Print `quote` to stdout as pretty JSON.
pub fn print_quote(quote: &PriceQuote) {
    match serde_json::to_string_pretty(quote) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize quote: {}", e),
    }
}

/// Push `quote` when a token is configured, otherwise print it.
pub fn deliver(config: &PushConfig, quote: &PriceQuote) -> Delivery {
    let Some(token) = config.token.as_deref() else {
        warn!("PUSHPLUS_TOKEN not configured, printing the quote instead of pushing");
        print_quote(quote);
        return Delivery::Printed;
    };

    let sender = match PushPlusSender::new(config, token) {
        Ok(sender) => sender,
        Err(e) => {
            error!("Failed to build PushPlus client: {}", e);
            print_quote(quote);
            return Delivery::Failed;
        }
    };
    if sender.send(quote) {
        info!("Quote pushed via PushPlus");
        Delivery::Sent
    } else {
        Delivery::Failed
    }
}
