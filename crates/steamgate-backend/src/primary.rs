//! Primary and dependent actor seams.
//!
//! The primary actor establishes the session's identity; dependent actors
//! attach to the web-session artifacts it negotiates.

use async_trait::async_trait;
use steamgate_core::SteamId;
use tokio::sync::broadcast;

use crate::actor::{Actor, ActorError};
use crate::auth::{AuthFailure, LogonRequest, LogonSuccess};

/// Presence states for the signed-in account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersonaState {
    /// Not shown as present.
    Offline,
    /// Present and reachable.
    Online,
    /// Present, marked busy.
    Busy,
    /// Present, marked away.
    Away,
    /// Present, long-idle.
    Snooze,
}

/// Web-session artifacts dependent actors bind to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionArtifacts {
    /// Web session identifier issued for this connection.
    pub session_id: String,
    /// Authentication cookie set for web-backed operations.
    pub cookies: Vec<String>,
}

/// Out-of-band signals from the primary actor.
#[derive(Clone, Debug)]
pub enum PrimaryNotification {
    /// A web session identifier was issued for this connection.
    WebSession {
        /// The issued identifier.
        session_id: String,
    },
    /// The backend issued a persistent-login artifact to store for future
    /// runs.
    Sentry {
        /// Artifact bytes.
        artifact: Vec<u8>,
    },
    /// The connection dropped without a credential failure; re-authentication
    /// is expected to succeed with the same material.
    LoggedOff,
    /// Backend diagnostic line, surfaced when debug is enabled.
    Debug {
        /// The diagnostic text.
        line: String,
    },
}

/// The actor whose authentication establishes the session's identity.
#[async_trait]
pub trait PrimaryActor: Actor {
    /// Attempt to authenticate. Failures arrive pre-classified.
    async fn log_on(&self, request: &LogonRequest) -> Result<LogonSuccess, AuthFailure>;

    /// Identity of the signed-in account; absent before authentication
    /// completes.
    fn identity(&self) -> Option<SteamId>;

    /// Set the account's presence state.
    async fn set_persona(&self, state: PersonaState) -> Result<(), ActorError>;

    /// Negotiate fresh web credentials for the current session, returning the
    /// cookie set.
    async fn establish_web_session(&self) -> Result<Vec<String>, ActorError>;

    /// Subscribe to out-of-band notifications.
    fn notifications(&self) -> broadcast::Receiver<PrimaryNotification>;
}

/// An actor sharing the primary actor's session.
#[async_trait]
pub trait DependentActor: Actor {
    /// Bind to the primary actor's web-session artifacts. Called every time
    /// fresh artifacts are negotiated.
    fn bind_session(&self, artifacts: &SessionArtifacts);
}
