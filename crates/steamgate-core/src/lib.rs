//! # steamgate-core
//!
//! Shared leaf types for the steamgate workspace: Steam identities, the
//! one-shot completion handle used for callback-convention operations, and
//! JavaScript-style truthiness over JSON values.

#![deny(unsafe_code)]

pub mod completion;
pub mod ids;
pub mod value;

pub use completion::{Completion, CompletionReceiver};
pub use ids::SteamId;
