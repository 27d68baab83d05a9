// core logic - relay, gateway, keyword checks, and chat storage

mod ai;
mod client;
mod keywords;
mod message;
mod relay;
mod store;

pub use ai::{DEFAULT_GATEWAY_URL, DEFAULT_MODEL, Gateway, GatewayConfig};
pub use client::{Backend, DEFAULT_SERVER_URL, RelayClient};
pub use keywords::{BREATHING, CRISIS, Keywords, is_crisis, wants_breathing};
pub use message::{ConversationRequest, ErrorBody, Message, RelayResponse, Role};
pub use relay::{FALLBACK_REPLY, Relay, SYSTEM_PROMPT, outbound};
pub use store::{ChatStore, DEFAULT_DB_URL, StoredMessage};
