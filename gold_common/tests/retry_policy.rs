use std::thread;
use std::time::{Duration, Instant};

use gold_common::GoldError;
use gold_common::net::{CancelFlag, HttpClient, HttpSettings, RetryPolicy};
use httpmock::prelude::*;

fn client_with_backoff(max_attempts: u32, backoff_base: Duration) -> HttpClient {
    let settings = HttpSettings {
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(2),
        retry: RetryPolicy {
            max_attempts,
            backoff_base,
            ..RetryPolicy::default()
        },
    };
    HttpClient::new(&settings, CancelFlag::new()).expect("client")
}

fn fast_client(max_attempts: u32) -> HttpClient {
    client_with_backoff(max_attempts, Duration::from_millis(1))
}

#[test]
fn success_is_returned_on_first_attempt() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/ok").header("referer", "https://example.test/");
        then.status(200).body("hello");
    });

    let client = fast_client(3);
    let body = client
        .get_text(&server.url("/ok"), Some("https://example.test/"))
        .expect("body");
    assert_eq!(body, "hello");
    mock.assert_hits(1);
}

#[test]
fn retriable_status_is_retried_up_to_max_attempts() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/busy");
        then.status(503);
    });

    let client = fast_client(3);
    let err = client.get_text(&server.url("/busy"), None).unwrap_err();
    assert!(matches!(err, GoldError::Status { status: 503, .. }));
    mock.assert_hits(3);
}

#[test]
fn retriable_status_then_success_returns_body() {
    let server = MockServer::start();
    let mut busy = server.mock(|when, then| {
        when.method(GET).path("/flaky");
        then.status(503);
    });

    // The backoff gives this thread time to swap the 503 for a 200.
    let client = client_with_backoff(3, Duration::from_millis(400));
    let url = server.url("/flaky");
    let request = thread::spawn(move || client.get_text(&url, None));

    let waited = Instant::now();
    while busy.hits() == 0 {
        assert!(waited.elapsed() < Duration::from_secs(2), "first attempt never arrived");
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(busy.hits(), 1);
    busy.delete();
    let ok = server.mock(|when, then| {
        when.method(GET).path("/flaky");
        then.status(200).body("recovered");
    });

    let body = request.join().expect("request thread").expect("body");
    assert_eq!(body, "recovered");
    ok.assert_hits(1);
}

#[test]
fn non_retriable_status_fails_immediately() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404);
    });

    let client = fast_client(5);
    let err = client.get_text(&server.url("/missing"), None).unwrap_err();
    assert!(matches!(err, GoldError::Status { status: 404, .. }));
    mock.assert_hits(1);
}

#[test]
fn cancelled_client_does_not_send() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/never");
        then.status(200);
    });

    let cancel = CancelFlag::new();
    let client = HttpClient::new(&HttpSettings::default(), cancel.clone()).expect("client");
    cancel.cancel();
    let err = client.get_text(&server.url("/never"), None).unwrap_err();
    assert!(matches!(err, GoldError::Cancelled));
    mock.assert_hits(0);
}

#[test]
fn malformed_json_is_a_decode_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/json");
        then.status(200).body("not json");
    });

    let client = fast_client(1);
    let err = client
        .get_json::<serde_json::Value>(&server.url("/json"), None)
        .unwrap_err();
    assert!(matches!(err, GoldError::Json(_)));
}
