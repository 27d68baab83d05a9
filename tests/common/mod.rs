// fake gateway and relay servers on ephemeral ports

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use lumacalm::{GatewayConfig, Server};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub const TEST_KEY: &str = "test-key";

pub struct Captured {
    pub auth: Option<String>,
    pub body: Value,
}

struct Fake {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

pub struct FakeGateway {
    pub url: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl FakeGateway {
    // answers every call with the same status and body
    pub async fn spawn(status: u16, body: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(Fake {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            requests: requests.clone(),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(complete))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/v1/chat/completions"),
            requests,
        }
    }

    pub async fn reply(text: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        });
        Self::spawn(200, &body.to_string()).await
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            api_key: Some(TEST_KEY.to_string()),
            url: self.url.clone(),
            model: "test/model".to_string(),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_body(&self) -> Value {
        self.requests.lock().unwrap().last().unwrap().body.clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.requests.lock().unwrap().last().unwrap().auth.clone()
    }
}

async fn complete(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.requests.lock().unwrap().push(Captured { auth, body });
    (fake.status, fake.body.clone())
}

// relay server in front of the given gateway config, returns its base url
pub async fn spawn_relay(config: GatewayConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Server::router(config)).await.unwrap();
    });
    format!("http://{addr}")
}
