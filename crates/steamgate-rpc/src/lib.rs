//! # steamgate-rpc
//!
//! The RPC bridge proper: JSON-RPC 2.0 wire types, the compiled method and
//! event registry, whitelist/blacklist name filtering, the build-once
//! dispatcher, the event forwarder, and the outbound HTTP client.

#![deny(unsafe_code)]

pub mod client;
pub mod dispatch;
pub mod filter;
pub mod forward;
pub mod registry;
pub mod types;

pub use client::{ForwardError, RpcClient};
pub use dispatch::MethodTable;
pub use filter::NameFilter;
pub use forward::EventForwarder;
pub use types::{RpcErrorBody, RpcRequest, RpcResponse};
