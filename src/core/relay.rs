// relay - forward a conversation to the gateway and flag crisis messages

use crate::Error;
use crate::core::ai::{Gateway, GatewayConfig};
use crate::core::keywords;
use crate::core::{Message, RelayResponse, Role};

pub const SYSTEM_PROMPT: &str = r#"You are a compassionate mental health support chatbot for Lumacalm AI. Your role is to:

1. Listen empathetically and validate feelings
2. Provide emotional support and coping strategies
3. Never provide medical diagnoses or prescribe treatments
4. Encourage professional help when appropriate
5. Use warm, caring language while maintaining professionalism

Important reminders:
- You are NOT a replacement for professional therapy
- In crisis situations, encourage immediate professional help
- Always be respectful, non-judgmental, and supportive
- Keep responses concise but meaningful (2-3 sentences typically)

If you detect severe distress, suicidal thoughts, or crisis keywords (suicide, kill myself, end it all, etc.), acknowledge their pain and strongly encourage professional help."#;

pub const FALLBACK_REPLY: &str = "I'm here to listen. Can you tell me more?";

pub struct Relay {
    gateway: Gateway,
}

impl Relay {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            gateway: Gateway::new(config),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn handle(&self, messages: Vec<Message>) -> Result<RelayResponse, Error> {
        // no key, no call
        self.gateway.api_key()?;

        let last = validate(&messages)?;
        let is_crisis = keywords::is_crisis(&last.content);
        if is_crisis {
            tracing::warn!(
                phrase = keywords::CRISIS.matched(&last.content),
                "crisis keyword in latest message"
            );
        }

        let reply = self.gateway.complete(&outbound(&messages)).await?;

        Ok(RelayResponse {
            message: reply.unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            is_crisis,
        })
    }
}

/// System instruction first, then the caller's history untouched.
pub fn outbound(messages: &[Message]) -> Vec<Message> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(Message::system(SYSTEM_PROMPT));
    out.extend_from_slice(messages);
    out
}

// conversation must be non-empty and end with the user
fn validate(messages: &[Message]) -> Result<&Message, Error> {
    let last = messages
        .last()
        .ok_or_else(|| Error::MalformedRequest("conversation is empty".to_string()))?;

    if last.role != Role::User {
        return Err(Error::MalformedRequest(format!(
            "last message must come from the user, got {}",
            last.role
        )));
    }

    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<Message> {
        vec![
            Message::user("hi"),
            Message::assistant("hello, how are you?"),
            Message::user("not great"),
        ]
    }

    #[test]
    fn outbound_prepends_system_prompt() {
        let messages = history();
        let out = outbound(&messages);

        assert_eq!(out.len(), messages.len() + 1);
        assert_eq!(out[0].role, Role::System);
        assert_eq!(out[0].content, SYSTEM_PROMPT);
        assert_eq!(&out[1..], &messages[..]);
    }

    #[test]
    fn empty_conversation_is_rejected() {
        assert!(matches!(validate(&[]), Err(Error::MalformedRequest(_))));
    }

    #[test]
    fn conversation_must_end_with_user() {
        let mut messages = history();
        messages.push(Message::assistant("tell me more"));
        assert!(matches!(
            validate(&messages),
            Err(Error::MalformedRequest(_))
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_validation() {
        let relay = Relay::new(GatewayConfig::new(None));
        // empty conversation would be malformed, but the key check comes first
        let err = relay.handle(vec![]).await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }
}
