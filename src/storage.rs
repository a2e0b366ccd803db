use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::error;

/// Durable key-value backend for badge counters. Keys are flat strings,
/// values are decimal strings, an absent key means the counter was never
/// written. Backend errors are logged here and never surfaced to callers,
/// so counter reads stay infallible.
#[async_trait::async_trait]
pub trait CounterStorage: Send {
    async fn read(&mut self, key: &str) -> Option<String>;
    async fn write(&mut self, key: &str, value: String);
}

#[async_trait::async_trait]
impl CounterStorage for ConnectionManager {
    async fn read(&mut self, key: &str) -> Option<String> {
        let value: Result<String, _> = self.get(key).await;
        value.ok()
    }

    async fn write(&mut self, key: &str, value: String) {
        let response: Result<(), _> = self.set(key, value).await;
        if let Err(e) = response {
            error!("fail to make set request to redis: {e}")
        }
    }
}

/// In-memory backend, shared across clones. Used in tests and as the
/// fallback when the durable backend is unavailable.
#[derive(Clone, Default)]
pub struct MemStorage(Arc<Mutex<HashMap<String, String>>>);

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CounterStorage for MemStorage {
    async fn read(&mut self, key: &str) -> Option<String> {
        self.0.lock().unwrap().get(key).cloned()
    }

    async fn write(&mut self, key: &str, value: String) {
        self.0.lock().unwrap().insert(key.to_string(), value);
    }
}
