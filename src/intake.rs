use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::TcpListener,
};

use crate::app::AppData;
use crate::classify::{classify, PushPayload};
use crate::counter::CounterStore;
use crate::storage::CounterStorage;

/// Spawn the push intake listener. The transport shim (FCM bridge, service
/// worker relay) connects locally and delivers one JSON payload per line.
pub fn spawn_intake_listener(port: u16, data: AppData) {
    tokio::task::spawn(async move {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("fail to bind push intake listener");

        tracing::info!("Push intake listening on port {port}");

        while let Ok((stream, addr)) = listener.accept().await {
            tracing::debug!("push transport connected from {addr}");
            let data = data.clone();
            tokio::task::spawn(async move {
                let mut lines = BufReader::new(stream).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    handle_push(&data.counters, &line).await;
                }
            });
        }
    });
}

/// Decode one raw push payload and bump the badge buckets it classifies to.
/// Unreadable or unrecognized payloads are dropped with a log line, never an
/// error: push delivery is at-least-once and producers are not trusted.
pub async fn handle_push<S: CounterStorage>(counters: &CounterStore<S>, raw: &str) {
    let payload: PushPayload = match serde_json::from_str(raw) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!("discarding unreadable push payload: {err}");
            return;
        }
    };

    let deltas = classify(&payload);
    if deltas.is_empty() {
        tracing::debug!("push payload matched no badge bucket");
        return;
    }

    counters.apply(&deltas).await;
}
