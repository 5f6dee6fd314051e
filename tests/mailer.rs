//! Mail API client against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use cinema_booking::{
    config::EmailConfig,
    services::mailer::{CircuitState, MailError, Mailer},
};

fn config(api_url: Option<String>) -> EmailConfig {
    EmailConfig {
        api_url,
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        breaker_failure_threshold: 2,
        breaker_cool_down_secs: 3600,
    }
}

#[tokio::test]
async fn posts_json_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("x-api-key", "test-key"))
        .and(body_json(json!({
            "to": "andre@example.com",
            "name": "andre",
            "subject": "Your verification code",
            "text": "123456",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = Mailer::from_config(&config(Some(format!("{}/send", server.uri())))).unwrap();
    mailer
        .send("andre@example.com", "andre", "Your verification code", "123456")
        .await
        .unwrap();
}

#[tokio::test]
async fn repeated_failures_open_the_circuit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let mailer = Mailer::from_config(&config(Some(server.uri()))).unwrap();
    for _ in 0..2 {
        let err = mailer.send("a@x.io", "a", "s", "t").await.unwrap_err();
        assert!(matches!(err, MailError::Status(500)));
    }
    assert_eq!(mailer.breaker_state(), CircuitState::Open);

    let err = mailer.send("a@x.io", "a", "s", "t").await.unwrap_err();
    assert!(matches!(err, MailError::CircuitOpen));
}

#[tokio::test]
async fn without_an_endpoint_nothing_is_sent() {
    let mailer = Mailer::from_config(&config(None)).unwrap();
    mailer.send("a@x.io", "a", "s", "t").await.unwrap();
    assert_eq!(mailer.breaker_state(), CircuitState::Closed);
}
