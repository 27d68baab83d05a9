// http server mode - run the relay as an api

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, header},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::core::{ConversationRequest, GatewayConfig, RelayResponse};
use crate::{Error, Relay};

struct AppState {
    relay: Relay,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub struct Server;

impl Server {
    pub async fn run(config: GatewayConfig, host: &str, port: u16) -> Result<(), Error> {
        if config.api_key.is_none() {
            tracing::warn!("LOVABLE_API_KEY is not set, chat requests will fail");
        }

        let addr = format!("{host}:{port}");
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        tracing::info!(model = %config.model, "relay listening on http://{addr}");

        axum::serve(listener, Self::router(config))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }

    pub fn router(config: GatewayConfig) -> Router {
        let state = Arc::new(AppState {
            relay: Relay::new(config),
        });

        Router::new()
            .route("/health", get(health))
            .route("/chat", post(chat))
            .route("/functions/v1/chat", post(chat))
            .layer(CorsLayer::permissive())
            .layer(SetResponseHeaderLayer::if_not_present(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// body is parsed by hand so bad input gets the same json error shape
async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<RelayResponse>, Error> {
    let result = match ConversationRequest::parse(&body) {
        Ok(req) => state.relay.handle(req.messages).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            Err(e)
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}
