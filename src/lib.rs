// lumacalm library - supportive chat relay with crisis keyword detection

pub mod cli;
mod core;
mod error;
mod server;
pub mod tui;

pub use crate::core::{
    BREATHING, Backend, CRISIS, ChatStore, ConversationRequest, DEFAULT_DB_URL,
    DEFAULT_GATEWAY_URL, DEFAULT_MODEL, DEFAULT_SERVER_URL, ErrorBody, FALLBACK_REPLY, Gateway,
    GatewayConfig, Keywords, Message, Relay, RelayClient, RelayResponse, Role, SYSTEM_PROMPT,
    StoredMessage, is_crisis, outbound, wants_breathing,
};
pub use error::Error;
pub use server::Server;
