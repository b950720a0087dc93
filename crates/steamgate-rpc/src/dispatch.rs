//! The build-once method table and request dispatch.
//!
//! The table is derived from the compiled registry, the live actor handles,
//! and the method filter, exactly once after the session first becomes
//! active; dispatch afterwards is a read-only lookup. Call conventions are
//! adapted here: callback-convention operations complete through a one-shot
//! [`Completion`], synchronous operations answer with their return value or
//! the `"OK"` sentinel.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use steamgate_backend::{Actor, ActorCall, ActorError};
use steamgate_core::Completion;
use steamgate_core::value::is_truthy;

use crate::filter::NameFilter;
use crate::registry::{self, OperationSpec};
use crate::types::{RpcRequest, RpcResponse};

/// Sentinel result for synchronous operations without a meaningful return
/// value: callers still get a positive acknowledgement.
pub const OK_SENTINEL: &str = "OK";

struct MethodBinding {
    actor: Arc<dyn Actor>,
    spec: OperationSpec,
}

/// Filtered, build-once table of exposed methods.
pub struct MethodTable {
    bindings: HashMap<String, MethodBinding>,
}

impl MethodTable {
    /// Derive the table from the registry, the supplied actors, and the
    /// method filter. Groups without a live actor are skipped entirely.
    pub fn build(actors: &[Arc<dyn Actor>], filter: &NameFilter) -> Self {
        let mut bindings = HashMap::new();
        for group_spec in registry::REGISTRY {
            let Some(actor) = actors.iter().find(|a| a.group() == group_spec.group) else {
                continue;
            };
            for spec in group_spec.operations {
                if !filter.includes(spec.name) {
                    continue;
                }
                let _ = bindings.insert(
                    format!("{}.{}", group_spec.group, spec.name),
                    MethodBinding {
                        actor: actor.clone(),
                        spec: *spec,
                    },
                );
            }
        }
        Self { bindings }
    }

    /// All exposed method names (sorted).
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a qualified method is exposed.
    pub fn has_method(&self, method: &str) -> bool {
        self.bindings.contains_key(method)
    }

    /// Number of exposed methods.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Dispatch one request to its bound operation.
    ///
    /// Every failure mode answers the same `-32602 Invalid params` error;
    /// the distinct reasons are only logged. A callback-convention operation
    /// that never fires its completion leaves this future pending, and with
    /// it that one request.
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        match self.dispatch_inner(&request).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(reason) => {
                debug!(method = %request.method, %reason, "dispatch failed");
                RpcResponse::invalid_params(id)
            }
        }
    }

    async fn dispatch_inner(&self, request: &RpcRequest) -> Result<Value, DispatchError> {
        let binding = self
            .bindings
            .get(&request.method)
            .ok_or(DispatchError::UnknownMethod)?;

        // Params must be an ordered sequence; rejected before the backend
        // sees anything.
        let args = match &request.params {
            Some(Value::Array(items)) => items.clone(),
            _ => return Err(DispatchError::ParamsNotArray),
        };

        match binding.spec.callback_arg {
            Some(index) => {
                let (completion, receiver) = Completion::new(index);
                let call = ActorCall::with_completion(binding.spec.name, args, completion);
                // The operation's own return value is discarded; the logical
                // result is whatever the completion fires with.
                let _ = binding.actor.invoke(call).await?;
                let results = receiver.wait().await.ok_or(DispatchError::CompletionDropped)?;
                Ok(Value::Array(results))
            }
            None => {
                let call = ActorCall::new(binding.spec.name, args);
                let value = binding.actor.invoke(call).await?;
                if is_truthy(&value) {
                    Ok(value)
                } else {
                    Ok(Value::String(OK_SENTINEL.into()))
                }
            }
        }
    }
}

/// Internal dispatch failure reasons. All of them collapse to `-32602` on
/// the wire; the distinction survives only in logs.
#[derive(Debug, thiserror::Error)]
enum DispatchError {
    #[error("method not exposed")]
    UnknownMethod,
    #[error("params is not an array")]
    ParamsNotArray,
    #[error("completion handle dropped without firing")]
    CompletionDropped,
    #[error(transparent)]
    Actor(#[from] ActorError),
}
