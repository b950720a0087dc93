//! In-process loopback backend.
//!
//! Implements the full actor surface without a network: operations record
//! themselves and answer with configurable results, callback-convention
//! operations fire their completion from a spawned task the way a real
//! backend completes off the dispatch control flow, and events are injected
//! explicitly. Backs the integration tests and the binary's development
//! transport; a production transport replaces it by implementing the same
//! traits.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use steamgate_core::{Completion, SteamId};
use tokio::sync::broadcast;

use crate::actor::{Actor, ActorCall, ActorError, ActorEvent, PropertyError, PropertyReadable};
use crate::auth::{AuthFailure, LogonRequest, LogonSuccess};
use crate::primary::{
    DependentActor, PersonaState, PrimaryActor, PrimaryNotification, SessionArtifacts,
};
use crate::session::ActorSet;

/// One recorded operation invocation.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    /// Operation name.
    pub operation: String,
    /// Caller-supplied arguments.
    pub args: Vec<Value>,
    /// Position of the completion callback, for callback-convention calls.
    pub completion_index: Option<usize>,
}

/// Shared loopback behavior: call recording, scripted results, properties,
/// and the event stream.
struct ActorCore {
    group: &'static str,
    events_tx: broadcast::Sender<ActorEvent>,
    calls: Mutex<Vec<RecordedCall>>,
    sync_results: RwLock<HashMap<String, Value>>,
    callback_results: RwLock<HashMap<String, Vec<Value>>>,
    properties: RwLock<HashMap<String, Value>>,
    failing: RwLock<HashSet<String>>,
}

impl ActorCore {
    fn new(group: &'static str) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            group,
            events_tx,
            calls: Mutex::new(Vec::new()),
            sync_results: RwLock::new(HashMap::new()),
            callback_results: RwLock::new(HashMap::new()),
            properties: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }

    fn record(&self, call: &ActorCall) {
        self.calls.lock().push(RecordedCall {
            operation: call.operation.clone(),
            args: call.args.clone(),
            completion_index: call.completion.as_ref().map(Completion::arg_index),
        });
    }

    fn invoke(&self, call: ActorCall) -> Result<Value, ActorError> {
        self.record(&call);
        if self.failing.read().contains(&call.operation) {
            return Err(ActorError::Failed(format!(
                "{} scripted to fail",
                call.operation
            )));
        }
        match call.completion {
            Some(completion) => {
                let results = self
                    .callback_results
                    .read()
                    .get(&call.operation)
                    .cloned()
                    .unwrap_or_else(|| call.args.clone());
                // Completes off the invoking control flow, like a real
                // backend callback.
                let _ = tokio::spawn(async move {
                    let _ = completion.complete(results);
                });
                Ok(Value::Null)
            }
            None if call.operation == "getProperty" => {
                let name = call.args.first().and_then(Value::as_str).ok_or_else(|| {
                    ActorError::InvalidArguments {
                        operation: call.operation.clone(),
                        message: "expected a property name".into(),
                    }
                })?;
                Ok(self
                    .properties
                    .read()
                    .get(name)
                    .cloned()
                    .ok_or_else(|| PropertyError::NotFound(name.to_string()))?)
            }
            None => Ok(self
                .sync_results
                .read()
                .get(&call.operation)
                .cloned()
                .unwrap_or(Value::Null)),
        }
    }

    fn emit_event(&self, name: &str, arguments: Vec<Value>) {
        let _ = self.events_tx.send(ActorEvent {
            name: name.to_string(),
            arguments,
        });
    }
}

/// Loopback dependent actor for the `trade` and `tradeOffers` groups.
pub struct LoopbackDependent {
    core: ActorCore,
    bound: RwLock<Option<SessionArtifacts>>,
}

impl LoopbackDependent {
    /// Dependent actor registered under `group`.
    pub fn new(group: &'static str) -> Self {
        Self {
            core: ActorCore::new(group),
            bound: RwLock::new(None),
        }
    }

    /// Script a synchronous operation's return value.
    pub fn set_sync_result(&self, operation: &str, value: Value) {
        let _ = self
            .core
            .sync_results
            .write()
            .insert(operation.to_string(), value);
    }

    /// Script a callback operation's completion results. Unscripted
    /// operations echo the caller's arguments.
    pub fn set_callback_results(&self, operation: &str, results: Vec<Value>) {
        let _ = self
            .core
            .callback_results
            .write()
            .insert(operation.to_string(), results);
    }

    /// Seed a readable property.
    pub fn set_property(&self, name: &str, value: Value) {
        let _ = self.core.properties.write().insert(name.to_string(), value);
    }

    /// Make an operation fail on invocation.
    pub fn fail_operation(&self, operation: &str) {
        let _ = self.core.failing.write().insert(operation.to_string());
    }

    /// Fire a backend event.
    pub fn emit_event(&self, name: &str, arguments: Vec<Value>) {
        self.core.emit_event(name, arguments);
    }

    /// Every invocation recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.core.calls.lock().clone()
    }

    /// The artifacts this actor was last bound to.
    pub fn bound_artifacts(&self) -> Option<SessionArtifacts> {
        self.bound.read().clone()
    }
}

#[async_trait]
impl Actor for LoopbackDependent {
    fn group(&self) -> &'static str {
        self.core.group
    }

    async fn invoke(&self, call: ActorCall) -> Result<Value, ActorError> {
        self.core.invoke(call)
    }

    fn events(&self) -> broadcast::Receiver<ActorEvent> {
        self.core.events_tx.subscribe()
    }
}

impl PropertyReadable for LoopbackDependent {
    fn property(&self, name: &str) -> Result<Value, PropertyError> {
        self.core
            .properties
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl DependentActor for LoopbackDependent {
    fn bind_session(&self, artifacts: &SessionArtifacts) {
        *self.bound.write() = Some(artifacts.clone());
    }
}

/// Loopback primary actor for the `steam` group.
pub struct LoopbackPrimary {
    core: ActorCore,
    identity_on_success: SteamId,
    identity: RwLock<Option<SteamId>>,
    auth_script: Mutex<VecDeque<Result<(), AuthFailure>>>,
    attempts: Mutex<Vec<LogonRequest>>,
    persona: RwLock<Option<PersonaState>>,
    cookies: RwLock<Vec<String>>,
    notify_tx: broadcast::Sender<PrimaryNotification>,
}

impl LoopbackPrimary {
    /// Primary actor that will establish `identity` on successful logon.
    pub fn new(identity: SteamId) -> Self {
        let (notify_tx, _) = broadcast::channel(64);
        Self {
            core: ActorCore::new("steam"),
            identity_on_success: identity,
            identity: RwLock::new(None),
            auth_script: Mutex::new(VecDeque::new()),
            attempts: Mutex::new(Vec::new()),
            persona: RwLock::new(None),
            cookies: RwLock::new(vec![
                "sessionid=loopback".to_string(),
                "steamLogin=loopback".to_string(),
            ]),
            notify_tx,
        }
    }

    /// Queue the outcome of the next logon attempt. An empty queue means
    /// success.
    pub fn push_auth_outcome(&self, outcome: Result<(), AuthFailure>) {
        self.auth_script.lock().push_back(outcome);
    }

    /// Queue a failure for the next logon attempt.
    pub fn push_auth_failure(&self, failure: AuthFailure) {
        self.push_auth_outcome(Err(failure));
    }

    /// Every logon request received, in order.
    pub fn logon_attempts(&self) -> Vec<LogonRequest> {
        self.attempts.lock().clone()
    }

    /// The last persona state set, if any.
    pub fn persona(&self) -> Option<PersonaState> {
        *self.persona.read()
    }

    /// Replace the cookie set handed out by web-session negotiation.
    pub fn set_cookies(&self, cookies: Vec<String>) {
        *self.cookies.write() = cookies;
    }

    /// Push an out-of-band notification.
    pub fn emit(&self, notification: PrimaryNotification) {
        let _ = self.notify_tx.send(notification);
    }

    /// Script a synchronous operation's return value.
    pub fn set_sync_result(&self, operation: &str, value: Value) {
        let _ = self
            .core
            .sync_results
            .write()
            .insert(operation.to_string(), value);
    }

    /// Seed a readable property.
    pub fn set_property(&self, name: &str, value: Value) {
        let _ = self.core.properties.write().insert(name.to_string(), value);
    }

    /// Make an operation fail on invocation.
    pub fn fail_operation(&self, operation: &str) {
        let _ = self.core.failing.write().insert(operation.to_string());
    }

    /// Fire a backend event.
    pub fn emit_event(&self, name: &str, arguments: Vec<Value>) {
        self.core.emit_event(name, arguments);
    }

    /// Every invocation recorded so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.core.calls.lock().clone()
    }
}

#[async_trait]
impl Actor for LoopbackPrimary {
    fn group(&self) -> &'static str {
        self.core.group
    }

    async fn invoke(&self, call: ActorCall) -> Result<Value, ActorError> {
        self.core.invoke(call)
    }

    fn events(&self) -> broadcast::Receiver<ActorEvent> {
        self.core.events_tx.subscribe()
    }
}

impl PropertyReadable for LoopbackPrimary {
    fn property(&self, name: &str) -> Result<Value, PropertyError> {
        self.core
            .properties
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl PrimaryActor for LoopbackPrimary {
    async fn log_on(&self, request: &LogonRequest) -> Result<LogonSuccess, AuthFailure> {
        self.attempts.lock().push(request.clone());
        if let Some(outcome) = self.auth_script.lock().pop_front() {
            outcome?;
        }
        *self.identity.write() = Some(self.identity_on_success);
        Ok(LogonSuccess {
            identity: self.identity_on_success,
        })
    }

    fn identity(&self) -> Option<SteamId> {
        *self.identity.read()
    }

    async fn set_persona(&self, state: PersonaState) -> Result<(), ActorError> {
        *self.persona.write() = Some(state);
        Ok(())
    }

    async fn establish_web_session(&self) -> Result<Vec<String>, ActorError> {
        Ok(self.cookies.read().clone())
    }

    fn notifications(&self) -> broadcast::Receiver<PrimaryNotification> {
        self.notify_tx.subscribe()
    }
}

/// The complete loopback actor set: `steam`, `trade`, and `tradeOffers`.
pub struct LoopbackBackend {
    /// Primary presence/chat actor.
    pub primary: Arc<LoopbackPrimary>,
    /// Trade-session actor.
    pub trade: Arc<LoopbackDependent>,
    /// Offer-manager actor.
    pub trade_offers: Arc<LoopbackDependent>,
}

impl LoopbackBackend {
    /// Build the set around the identity established on logon.
    pub fn new(identity: SteamId) -> Self {
        Self {
            primary: Arc::new(LoopbackPrimary::new(identity)),
            trade: Arc::new(LoopbackDependent::new("trade")),
            trade_offers: Arc::new(LoopbackDependent::new("tradeOffers")),
        }
    }

    /// The actor set handed to the session manager.
    pub fn actor_set(&self) -> ActorSet {
        ActorSet::builder(self.primary.clone())
            .dependent(self.trade.clone())
            .dependent(self.trade_offers.clone())
            .build()
    }
}
