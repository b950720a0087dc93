//! End-to-end integration: session logon, build-once bridge construction,
//! HTTP dispatch, event forwarding, and reconnect idempotence, all against
//! the loopback backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::timeout;

use steamgate_backend::loopback::LoopbackBackend;
use steamgate_backend::{Actor, PrimaryNotification, SessionManager};
use steamgate_config::store::{ConfigStore, JsonConfigStore};
use steamgate_config::{Config, EndpointConfig};
use steamgate_core::SteamId;
use steamgate_rpc::{EventForwarder, MethodTable, NameFilter, RpcClient};
use steamgate_server::RpcServer;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDENTITY: u64 = 76_561_198_000_000_001;

struct Bridge {
    backend: LoopbackBackend,
    table: Arc<MethodTable>,
    server_url: String,
    remote: MockServer,
    run_task: tokio::task::JoinHandle<()>,
    _dir: tempfile::TempDir,
}

/// Wire the whole bridge the way the binary does: authenticate, then build
/// the method table, HTTP server, and forwarder exactly once.
async fn boot_bridge(config: Config) -> Bridge {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonConfigStore::new(dir.path().join("bot.json")));
    let config = Config {
        steam_username: Some("bot".into()),
        steam_password: Some("pw".into()),
        ..config
    };
    store.save(&config).unwrap();

    let backend = LoopbackBackend::new(SteamId::new(IDENTITY));
    let prompter = Arc::new(steamgate_config::prompt::ScriptedPrompter::default());
    let mut session =
        SessionManager::new(backend.actor_set(), store, prompter, &config).unwrap();
    session.log_on().await.unwrap();

    let actors: Vec<Arc<dyn Actor>> = session.actor_handles();
    let method_filter = NameFilter::new(
        config.methods_whitelist.clone(),
        config.methods_blacklist.clone(),
    );
    let event_filter = NameFilter::new(
        config.events_whitelist.clone(),
        config.events_blacklist.clone(),
    );

    let table = Arc::new(MethodTable::build(&actors, &method_filter));
    let server = RpcServer::new(
        EndpointConfig {
            port: 0,
            ..EndpointConfig::default_server()
        },
        table.clone(),
    );
    let (addr, _server_task) = server.listen().await.unwrap();

    let remote = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&remote)
        .await;
    let client = Arc::new(RpcClient::new(&EndpointConfig {
        port: remote.address().port(),
        host: remote.address().ip().to_string(),
        path: "/".into(),
        strict: false,
    }));
    let forwarder = EventForwarder::build(&actors, session.primary().clone(), client, &event_filter);
    let _relays = forwarder.start();

    let run_task = tokio::spawn(async move {
        let _ = session.run().await;
    });

    Bridge {
        backend,
        table,
        server_url: format!("http://{addr}/"),
        remote,
        run_task,
        _dir: dir,
    }
}

async fn post_rpc(url: &str, body: Value) -> Value {
    reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn remote_bodies(remote: &MockServer, count: usize) -> Vec<Value> {
    for _ in 0..200 {
        let requests = remote.received_requests().await.unwrap();
        if requests.len() >= count {
            return requests
                .iter()
                .map(|r| serde_json::from_slice(&r.body).unwrap())
                .collect();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("remote endpoint never received {count} request(s)");
}

#[tokio::test]
async fn call_and_event_round_trip() {
    let bridge = boot_bridge(Config::default()).await;

    // Inbound: a callback-convention operation with no extra arguments.
    let resp = post_rpc(
        &bridge.server_url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "trade.ready", "params": []}),
    )
    .await;
    assert_eq!(resp["result"], json!([]));

    // Inbound: a synchronous operation acknowledges with the sentinel.
    let resp = post_rpc(
        &bridge.server_url,
        json!({"jsonrpc": "2.0", "id": 2, "method": "steam.sendMessage", "params": ["76561198000000002", "hi"]}),
    )
    .await;
    assert_eq!(resp["result"], "OK");

    // Outbound: a backend event arrives at the remote endpoint with the
    // live identity.
    bridge
        .backend
        .primary
        .emit_event("friendMsg", vec![json!("76561198000000002"), json!("yo")]);
    let bodies = remote_bodies(&bridge.remote, 1).await;
    assert_eq!(bodies[0]["method"], "steam.friendMsg");
    assert_eq!(bodies[0]["params"]["steamID"], IDENTITY.to_string());
    assert_eq!(bodies[0]["params"]["arguments"], json!(["76561198000000002", "yo"]));

    bridge.run_task.abort();
}

#[tokio::test]
async fn methods_whitelist_applies_across_groups() {
    let bridge = boot_bridge(Config {
        methods_whitelist: Some(vec!["getProperty".into()]),
        methods_blacklist: Some(vec!["getProperty".into()]),
        ..Config::default()
    })
    .await;

    // The whitelist is authoritative; the blacklist naming the same bare
    // name changes nothing.
    assert_eq!(
        bridge.table.methods(),
        vec!["steam.getProperty", "trade.getProperty"]
    );

    let resp = post_rpc(
        &bridge.server_url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "steam.sendMessage", "params": ["x", "y"]}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);

    bridge.backend.primary.set_property("steamID", json!("abc"));
    let resp = post_rpc(
        &bridge.server_url,
        json!({"jsonrpc": "2.0", "id": 2, "method": "steam.getProperty", "params": ["steamID"]}),
    )
    .await;
    assert_eq!(resp["result"], "abc");

    bridge.run_task.abort();
}

#[tokio::test]
async fn reconnect_preserves_the_bridge() {
    let bridge = boot_bridge(Config::default()).await;
    assert_eq!(bridge.backend.primary.logon_attempts().len(), 1);

    // Backend drops the session; the manager re-authenticates in place.
    bridge.backend.primary.emit(PrimaryNotification::LoggedOff);
    timeout(Duration::from_secs(2), async {
        while bridge.backend.primary.logon_attempts().len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("re-authentication never happened");

    // The same table keeps serving: nothing was rebuilt.
    let before = bridge.table.len();
    let resp = post_rpc(
        &bridge.server_url,
        json!({"jsonrpc": "2.0", "id": 1, "method": "trade.confirm", "params": []}),
    )
    .await;
    assert_eq!(resp["result"], json!([]));
    assert_eq!(bridge.table.len(), before);

    // Event forwarding still runs on the original listener set.
    bridge.backend.trade.emit_event("offerChanged", vec![json!(true)]);
    let bodies = remote_bodies(&bridge.remote, 1).await;
    assert_eq!(bodies[0]["method"], "trade.offerChanged");
    assert_eq!(bodies[0]["params"]["steamID"], IDENTITY.to_string());

    bridge.run_task.abort();
}

#[tokio::test]
async fn events_blacklist_silences_only_listed_names() {
    let bridge = boot_bridge(Config {
        events_blacklist: Some(vec!["chatMsg".into()]),
        ..Config::default()
    })
    .await;

    bridge.backend.trade.emit_event("chatMsg", vec![json!("silenced")]);
    bridge.backend.trade.emit_event("end", vec![json!("done")]);

    let bodies = remote_bodies(&bridge.remote, 1).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["method"], "trade.end");

    bridge.run_task.abort();
}
