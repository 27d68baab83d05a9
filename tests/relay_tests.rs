// tests for the relay handler against a fake gateway

mod common;

use common::{FakeGateway, TEST_KEY};
use lumacalm::{Error, FALLBACK_REPLY, GatewayConfig, Message, Relay, SYSTEM_PROMPT};

fn conversation() -> Vec<Message> {
    vec![
        Message::user("hi"),
        Message::assistant("Hello. How are you feeling?"),
        Message::user("pretty tired lately"),
    ]
}

#[tokio::test]
async fn test_success_returns_reply() {
    let gateway = FakeGateway::reply("That sounds exhausting.").await;
    let relay = Relay::new(gateway.config());

    let response = relay.handle(conversation()).await.unwrap();

    assert_eq!(response.message, "That sounds exhausting.");
    assert!(!response.is_crisis);
}

#[tokio::test]
async fn test_outbound_payload() {
    let gateway = FakeGateway::reply("ok").await;
    let relay = Relay::new(gateway.config());
    let messages = conversation();

    relay.handle(messages.clone()).await.unwrap();

    let body = gateway.last_body();
    assert_eq!(body["model"], "test/model");
    assert_eq!(body["stream"], false);

    let sent = body["messages"].as_array().unwrap();
    assert_eq!(sent.len(), messages.len() + 1);
    assert_eq!(sent[0]["role"], "system");
    assert_eq!(sent[0]["content"], SYSTEM_PROMPT);

    let rest: Vec<Message> =
        serde_json::from_value(serde_json::Value::Array(sent[1..].to_vec())).unwrap();
    assert_eq!(rest, messages);

    assert_eq!(gateway.last_auth(), Some(format!("Bearer {TEST_KEY}")));
}

#[tokio::test]
async fn test_empty_choices_fall_back() {
    let gateway = FakeGateway::spawn(200, r#"{"choices":[]}"#).await;
    let relay = Relay::new(gateway.config());

    let response = relay.handle(conversation()).await.unwrap();
    assert_eq!(response.message, FALLBACK_REPLY);
}

#[tokio::test]
async fn test_empty_content_falls_back() {
    let gateway = FakeGateway::reply("").await;
    let relay = Relay::new(gateway.config());

    let response = relay.handle(conversation()).await.unwrap();
    assert_eq!(response.message, FALLBACK_REPLY);
    assert!(!response.message.is_empty());
}

#[tokio::test]
async fn test_rate_limited() {
    let gateway = FakeGateway::spawn(429, "slow down").await;
    let relay = Relay::new(gateway.config());

    let err = relay.handle(conversation()).await.unwrap_err();
    assert!(matches!(err, Error::RateLimited));
    // surfaced once, never retried
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_quota_exceeded() {
    let gateway = FakeGateway::spawn(402, "no credits").await;
    let relay = Relay::new(gateway.config());

    let err = relay.handle(conversation()).await.unwrap_err();
    assert!(matches!(err, Error::QuotaExceeded));
}

#[tokio::test]
async fn test_other_status_is_unavailable() {
    let gateway = FakeGateway::spawn(503, "maintenance").await;
    let relay = Relay::new(gateway.config());

    match relay.handle(conversation()).await {
        Err(Error::UpstreamUnavailable { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn test_crisis_from_last_message_only() {
    let gateway = FakeGateway::reply("I'm really glad you told me.").await;
    let relay = Relay::new(gateway.config());

    let calm_history = vec![
        Message::user("nice weather"),
        Message::assistant("It is!"),
        Message::user("I want to end it all"),
    ];
    let heavy_history = vec![
        Message::user("I thought about suicide last year"),
        Message::assistant("Thank you for sharing that."),
        Message::user("I want to end it all"),
    ];

    let a = relay.handle(calm_history).await.unwrap();
    let b = relay.handle(heavy_history).await.unwrap();
    assert!(a.is_crisis);
    assert_eq!(a.is_crisis, b.is_crisis);

    // crisis words earlier in the history don't count
    let recovered = vec![
        Message::user("I want to die"),
        Message::assistant("I'm here with you."),
        Message::user("thanks, I feel a bit better now"),
    ];
    assert!(!relay.handle(recovered).await.unwrap().is_crisis);
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let gateway = FakeGateway::reply("unused").await;
    let relay = Relay::new(GatewayConfig {
        api_key: None,
        ..gateway.config()
    });

    let err = relay.handle(conversation()).await.unwrap_err();
    assert!(matches!(err, Error::MissingApiKey));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_must_end_with_user() {
    let gateway = FakeGateway::reply("unused").await;
    let relay = Relay::new(gateway.config());

    let mut messages = conversation();
    messages.push(Message::assistant("anything else?"));

    let err = relay.handle(messages).await.unwrap_err();
    assert!(matches!(err, Error::MalformedRequest(_)));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_unreachable_gateway() {
    // nothing listens on port 9 locally
    let relay = Relay::new(GatewayConfig {
        api_key: Some(TEST_KEY.to_string()),
        url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        model: "test/model".to_string(),
    });

    let err = relay.handle(conversation()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
