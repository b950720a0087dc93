//! The on-disk configuration record.

use serde::{Deserialize, Serialize};

/// One JSON-RPC endpoint (listening or remote).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// TCP port.
    pub port: u16,
    /// Host name or address.
    pub host: String,
    /// HTTP path, beginning with `/`.
    pub path: String,
    /// Enforce JSON-RPC 2.0 envelopes.
    #[serde(default)]
    pub strict: bool,
}

impl EndpointConfig {
    /// Default listening endpoint for the RPC server.
    pub fn default_server() -> Self {
        Self {
            port: 5080,
            host: "127.0.0.1".into(),
            path: "/".into(),
            strict: false,
        }
    }

    /// Default remote endpoint for outbound event calls.
    pub fn default_client() -> Self {
        Self {
            port: 80,
            host: "127.0.0.1".into(),
            path: "/".into(),
            strict: false,
        }
    }

    /// The endpoint as an `http://` URL.
    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("http://{}:{}{}", self.host, self.port, path)
    }
}

/// The configuration record consumed by the bridge.
///
/// Fields are optional because first-run setup persists the record after
/// every collected answer; accessors supply defaults where the record may
/// legitimately stay sparse.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Steam account name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_username: Option<String>,
    /// Steam account password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_password: Option<String>,
    /// Persistent guard artifact issued by the backend (sentry bytes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_guard: Option<Vec<u8>>,
    /// RPC server endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<EndpointConfig>,
    /// Outbound RPC client endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<EndpointConfig>,
    /// Exposed-method whitelist (bare names, authoritative when present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods_whitelist: Option<Vec<String>>,
    /// Exposed-method blacklist (bare names).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods_blacklist: Option<Vec<String>>,
    /// Forwarded-event whitelist (bare names, authoritative when present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_whitelist: Option<Vec<String>>,
    /// Forwarded-event blacklist (bare names).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_blacklist: Option<Vec<String>>,
    /// Verbose logging and backend debug pass-through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl Config {
    /// The server endpoint, falling back to the default.
    pub fn server(&self) -> EndpointConfig {
        self.server.clone().unwrap_or_else(EndpointConfig::default_server)
    }

    /// The client endpoint, falling back to the default.
    pub fn client(&self) -> EndpointConfig {
        self.client.clone().unwrap_or_else(EndpointConfig::default_client)
    }

    /// Whether debug logging is enabled.
    pub fn debug_enabled(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    /// Remove the stored account name and password.
    pub fn clear_credentials(&mut self) {
        self.steam_username = None;
        self.steam_password = None;
    }
}
