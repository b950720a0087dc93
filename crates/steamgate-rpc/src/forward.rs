//! Event forwarding to the remote JSON-RPC endpoint.
//!
//! The subscription set is computed once, after the session first becomes
//! active; each subscribed group gets one persistent listener for the process
//! lifetime. Delivery is fire-and-forget: transport failures are logged and
//! the event is gone.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use steamgate_backend::{Actor, ActorEvent, PrimaryActor};

use crate::client::RpcClient;
use crate::filter::NameFilter;
use crate::registry;

struct GroupSubscription {
    group: &'static str,
    names: HashSet<&'static str>,
    rx: broadcast::Receiver<ActorEvent>,
}

/// Relays filtered backend events as outbound JSON-RPC calls.
pub struct EventForwarder {
    client: Arc<RpcClient>,
    primary: Arc<dyn PrimaryActor>,
    groups: Vec<GroupSubscription>,
}

impl EventForwarder {
    /// Compute the subscription set and attach one receiver per group with
    /// at least one surviving event.
    pub fn build(
        actors: &[Arc<dyn Actor>],
        primary: Arc<dyn PrimaryActor>,
        client: Arc<RpcClient>,
        filter: &NameFilter,
    ) -> Self {
        let mut groups = Vec::new();
        for group_spec in registry::REGISTRY {
            let Some(actor) = actors.iter().find(|a| a.group() == group_spec.group) else {
                continue;
            };
            let names: HashSet<&'static str> = group_spec
                .events
                .iter()
                .copied()
                .filter(|name| filter.includes(name))
                .collect();
            if names.is_empty() {
                continue;
            }
            groups.push(GroupSubscription {
                group: group_spec.group,
                names,
                rx: actor.events(),
            });
        }
        Self {
            client,
            primary,
            groups,
        }
    }

    /// The derived subscription set, as `(group, event)` pairs.
    pub fn subscriptions(&self) -> HashSet<(String, String)> {
        self.groups
            .iter()
            .flat_map(|sub| {
                sub.names
                    .iter()
                    .map(|name| (sub.group.to_string(), (*name).to_string()))
            })
            .collect()
    }

    /// Start one relay task per subscribed group. The tasks run until their
    /// actor's event stream closes.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        let Self {
            client,
            primary,
            groups,
        } = self;
        groups
            .into_iter()
            .map(|sub| {
                let client = client.clone();
                let primary = primary.clone();
                tokio::spawn(relay_group(sub, client, primary))
            })
            .collect()
    }
}

async fn relay_group(
    mut sub: GroupSubscription,
    client: Arc<RpcClient>,
    primary: Arc<dyn PrimaryActor>,
) {
    loop {
        match sub.rx.recv().await {
            Ok(event) => {
                if !sub.names.contains(event.name.as_str()) {
                    continue;
                }
                let method = format!("{}.{}", sub.group, event.name);
                // Identity is read at firing time, not captured at
                // registration: it reflects the live session.
                let steam_id = primary.identity().map_or(Value::Null, |id| json!(id));
                let params = json!({
                    "steamID": steam_id,
                    "arguments": event.arguments,
                });
                if let Err(err) = client.call(&method, params).await {
                    warn!(method = %method, %err, "event forwarding failed");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(group = sub.group, skipped, "event stream lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(group = sub.group, "event stream closed");
                break;
            }
        }
    }
}
