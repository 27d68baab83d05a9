// inference gateway - openai style chat completions

use crate::Error;
use crate::core::Message;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub url: String,
    pub model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: DEFAULT_GATEWAY_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }
}

pub struct Gateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

// what we send to the gateway
#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

// what comes back; everything past the top level is optional
#[derive(Deserialize, Default)]
pub(crate) struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Reply>,
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    content: Option<String>,
}

impl Completion {
    // text of the first choice, if there is any
    pub(crate) fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fails fast when no key is configured; nothing is sent in that case.
    pub fn api_key(&self) -> Result<&str, Error> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(Error::MissingApiKey)
    }

    // one call, no streaming, no retries
    pub async fn complete(&self, messages: &[Message]) -> Result<Option<String>, Error> {
        let api_key = self.api_key()?;

        let request = Request {
            model: &self.config.model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let completion = check_status(status, &body)?;

        Ok(completion.text().map(str::to_string))
    }
}

// map the gateway status (and body) to an outcome
pub(crate) fn check_status(status: StatusCode, body: &str) -> Result<Completion, Error> {
    match status {
        s if s.is_success() => serde_json::from_str(body).map_err(|e| {
            tracing::error!(status = s.as_u16(), error = %e, "unreadable gateway reply");
            Error::UpstreamUnavailable {
                status: s.as_u16(),
                body: body.to_string(),
            }
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
        StatusCode::PAYMENT_REQUIRED => Err(Error::QuotaExceeded),
        s => {
            tracing::error!(status = s.as_u16(), body, "AI gateway error");
            Err(Error::UpstreamUnavailable {
                status: s.as_u16(),
                body: body.to_string(),
            })
        }
    }
}
