//! # steamgate-server
//!
//! Axum HTTP server mounting the dispatcher's method table as a JSON-RPC 2.0
//! endpoint at the configured path.

#![deny(unsafe_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use tower_http::trace::TraceLayer;
use tracing::info;

use steamgate_config::EndpointConfig;
use steamgate_rpc::types::{RpcResponse, codes};
use steamgate_rpc::{MethodTable, RpcRequest};

/// Errors starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Could not bind or serve on the configured endpoint.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state for the RPC route.
#[derive(Clone)]
struct AppState {
    table: Arc<MethodTable>,
    strict: bool,
}

/// The JSON-RPC HTTP server.
pub struct RpcServer {
    config: EndpointConfig,
    table: Arc<MethodTable>,
}

impl RpcServer {
    /// Server exposing `table` at the configured endpoint.
    pub fn new(config: EndpointConfig, table: Arc<MethodTable>) -> Self {
        Self { config, table }
    }

    /// The listening configuration.
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Build the router with the RPC route at the configured path.
    pub fn router(&self) -> Router {
        let state = AppState {
            table: self.table.clone(),
            strict: self.config.strict,
        };
        let path = if self.config.path.starts_with('/') {
            self.config.path.clone()
        } else {
            format!("/{}", self.config.path)
        };
        Router::new()
            .route(&path, post(rpc_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind and serve. Returns the bound address and the serving task.
    pub async fn listen(
        &self,
    ) -> Result<(SocketAddr, tokio::task::JoinHandle<std::io::Result<()>>), ServerError> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        info!(%addr, path = %self.config.path, "RPC server listening");
        let router = self.router();
        let handle = tokio::spawn(async move { axum::serve(listener, router).await });
        Ok((addr, handle))
    }
}

/// POST handler: parse, optionally enforce the 2.0 envelope, dispatch.
///
/// Every outcome is an HTTP 200 carrying a JSON-RPC response; errors live in
/// the response body, not the status line.
async fn rpc_handler(State(state): State<AppState>, body: String) -> Json<RpcResponse> {
    let request: RpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(_) => {
            return Json(RpcResponse::error(
                serde_json::Value::Null,
                codes::PARSE_ERROR,
                "Parse error",
            ));
        }
    };

    if state.strict && !request.is_strict_2_0() {
        let id = request.id.unwrap_or(serde_json::Value::Null);
        return Json(RpcResponse::error(
            id,
            codes::INVALID_REQUEST,
            "Invalid request",
        ));
    }

    Json(state.table.dispatch(request).await)
}
