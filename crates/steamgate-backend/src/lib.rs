//! # steamgate-backend
//!
//! The seams to the remote-service backend: actor traits, authentication
//! types and failure classification, the session manager state machine, and
//! an in-process loopback backend for tests and development.

#![deny(unsafe_code)]

pub mod actor;
pub mod auth;
pub mod loopback;
pub mod primary;
pub mod session;

pub use actor::{Actor, ActorCall, ActorError, ActorEvent, PropertyError, PropertyReadable};
pub use auth::{AuthFailure, Credentials, FatalError, GuardMaterial, LogonRequest, LogonSuccess};
pub use primary::{
    DependentActor, PersonaState, PrimaryActor, PrimaryNotification, SessionArtifacts,
};
pub use session::{ActorSet, ActorSetBuilder, SessionManager, SessionState};
