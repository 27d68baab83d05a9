// talk to a running relay server, or run the relay in-process

use crate::Error;
use crate::core::relay::Relay;
use crate::core::{ConversationRequest, ErrorBody, Message, RelayResponse};
use reqwest::StatusCode;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(&self, messages: &[Message]) -> Result<RelayResponse, Error> {
        let request = ConversationRequest {
            messages: messages.to_vec(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // error bodies are json too, fall back to the status text if not
        let text = response.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or_else(|_| status.to_string());

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited,
            StatusCode::PAYMENT_REQUIRED => Error::QuotaExceeded,
            _ => Error::Relay(message),
        })
    }
}

/// Where the chat client sends conversations.
pub enum Backend {
    Remote(RelayClient),
    Local(Relay),
}

impl Backend {
    pub async fn send(&self, messages: &[Message]) -> Result<RelayResponse, Error> {
        match self {
            Self::Remote(client) => client.send(messages).await,
            Self::Local(relay) => relay.handle(messages.to_vec()).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(client) => client.endpoint().to_string(),
            Self::Local(relay) => format!("local ({})", relay.gateway().config().model),
        }
    }
}
