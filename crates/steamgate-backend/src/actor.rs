//! Backend actor seams.
//!
//! An actor is a stateful backend object (presence client, trade session,
//! offer manager) that exposes operations and emits events. The bridge talks
//! to actors exclusively through these traits; operation routing is dynamic
//! by bare name because the exposed surface is declared in a compiled
//! registry, not in per-operation method signatures.

use async_trait::async_trait;
use serde_json::Value;
use steamgate_core::Completion;
use tokio::sync::broadcast;

/// One dynamic invocation of an actor operation.
#[derive(Debug)]
pub struct ActorCall {
    /// Bare operation name within the actor's group.
    pub operation: String,
    /// Caller-supplied JSON arguments, in order, callback position excluded.
    pub args: Vec<Value>,
    /// Completion handle for callback-convention operations. Carries the
    /// argument position the callback occupied.
    pub completion: Option<Completion>,
}

impl ActorCall {
    /// A synchronous-return call.
    pub fn new(operation: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            operation: operation.into(),
            args,
            completion: None,
        }
    }

    /// A callback-convention call completing through `completion`.
    pub fn with_completion(
        operation: impl Into<String>,
        args: Vec<Value>,
        completion: Completion,
    ) -> Self {
        Self {
            operation: operation.into(),
            args,
            completion: Some(completion),
        }
    }
}

/// One backend-emitted event.
#[derive(Clone, Debug)]
pub struct ActorEvent {
    /// Bare event name within the actor's group.
    pub name: String,
    /// Event arguments as delivered by the backend.
    pub arguments: Vec<Value>,
}

/// Typed not-found failure for property reads.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// The actor has no property by that name.
    #[error("no such property: {0}")]
    NotFound(String),
}

/// Errors surfaced by actor operations.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    /// The actor does not implement the named operation.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The arguments do not fit the operation.
    #[error("invalid arguments for {operation}: {message}")]
    InvalidArguments {
        /// Operation that rejected its arguments.
        operation: String,
        /// What was wrong with them.
        message: String,
    },

    /// The operation started but failed.
    #[error("operation failed: {0}")]
    Failed(String),

    /// A property read failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// A stateful backend object exposing operations and emitting events.
#[async_trait]
pub trait Actor: Send + Sync {
    /// Group name this actor's operations and events are registered under.
    fn group(&self) -> &'static str;

    /// Invoke an operation.
    ///
    /// Callback-convention operations receive their completion handle inside
    /// the call; their return value is discarded by the dispatcher and the
    /// logical result is whatever the completion fires with.
    async fn invoke(&self, call: ActorCall) -> Result<Value, ActorError>;

    /// Subscribe to this actor's event stream.
    fn events(&self) -> broadcast::Receiver<ActorEvent>;
}

/// Read access to named properties.
///
/// Replaces ad hoc property reflection on unrelated backend types with an
/// explicit capability returning a typed not-found failure.
pub trait PropertyReadable {
    /// Read a property by name.
    fn property(&self, name: &str) -> Result<Value, PropertyError>;
}
