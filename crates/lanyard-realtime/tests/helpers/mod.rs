//! A scripted Lanyard socket server for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// What the server observed.
#[derive(Debug, Default)]
pub struct ServerLog {
    pub connections: AtomicUsize,
    events: Mutex<Vec<String>>,
}

impl ServerLog {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn presence(id: &str, status: &str) -> Value {
    json!({
        "discord_user": {"id": id, "username": format!("user{id}")},
        "discord_status": status,
        "activities": [],
        "kv": {}
    })
}

/// Starts a server on a free port and returns its socket URL.
///
/// Every connection gets `Hello{heartbeat_interval}` and, once it has sent
/// Initialize, an `INIT_STATE` whose status is `statuses[n]` for the n-th
/// connection. The first connection is closed by the server right after
/// that; later ones stay open and record heartbeats and close frames.
pub async fn start_server(
    user_id: &'static str,
    heartbeat_interval: u64,
    statuses: &'static [&'static str],
) -> (String, Arc<ServerLog>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log = Arc::new(ServerLog::default());

    let server_log = log.clone();
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let n = server_log.connections.fetch_add(1, Ordering::SeqCst);
            let log = server_log.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(tcp).await else {
                    return;
                };
                let hello = json!({"op": 1, "d": {"heartbeat_interval": heartbeat_interval}});
                if ws.send(Message::text(hello.to_string())).await.is_err() {
                    return;
                }

                while let Some(Ok(frame)) = ws.next().await {
                    match frame {
                        Message::Text(text) => {
                            let value: Value = serde_json::from_str(text.as_str()).unwrap();
                            match value["op"].as_u64() {
                                Some(2) => {
                                    log.record(format!("initialize:{n}"));
                                    let status = statuses[n.min(statuses.len() - 1)];
                                    let init = json!({
                                        "op": 0,
                                        "t": "INIT_STATE",
                                        "d": presence(user_id, status)
                                    });
                                    let _ = ws.send(Message::text(init.to_string())).await;
                                    if n == 0 {
                                        let _ = ws.close(None).await;
                                    }
                                }
                                Some(3) => log.record(format!("heartbeat:{n}")),
                                _ => log.record(format!("unexpected:{n}")),
                            }
                        }
                        Message::Close(_) => {
                            log.record(format!("close:{n}"));
                            break;
                        }
                        _ => {}
                    }
                }
            });
        }
    });

    (format!("ws://127.0.0.1:{port}/socket"), log)
}

/// Starts a server that sends Hello and closes every connection as soon as
/// the client sends Initialize.
pub async fn start_rejecting_server() -> (String, Arc<ServerLog>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log = Arc::new(ServerLog::default());

    let server_log = log.clone();
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let n = server_log.connections.fetch_add(1, Ordering::SeqCst);
            let log = server_log.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(tcp).await else {
                    return;
                };
                let hello = json!({"op": 1, "d": {"heartbeat_interval": 30_000}});
                if ws.send(Message::text(hello.to_string())).await.is_err() {
                    return;
                }
                while let Some(Ok(frame)) = ws.next().await {
                    if let Message::Text(_) = frame {
                        log.record(format!("initialize:{n}"));
                        let _ = ws.close(None).await;
                        break;
                    }
                }
            });
        }
    });

    (format!("ws://127.0.0.1:{port}/socket"), log)
}
