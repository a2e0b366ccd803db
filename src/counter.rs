use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::bus::{CounterChanged, EventBus};
use crate::storage::CounterStorage;

/// Badge bucket. The fixed buckets back the bottom-navigation icons, haraj
/// category buckets are created lazily for whatever category identifier a
/// push payload carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CounterKey {
    JobsSeeker,
    JobsEmployer,
    JobsTotal,
    HarajTotal,
    HarajCategory(String),
}

impl CounterKey {
    pub fn haraj_category(category: impl Into<String>) -> Self {
        Self::HarajCategory(category.into())
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobsSeeker => f.write_str("jobs_seeker"),
            Self::JobsEmployer => f.write_str("jobs_employer"),
            Self::JobsTotal => f.write_str("jobs_total"),
            Self::HarajTotal => f.write_str("haraj_total"),
            Self::HarajCategory(category) => write!(f, "haraj_{category}"),
        }
    }
}

/// Persisted badge counters.
///
/// Values never go below zero, every write is clamped. Every `set` emits
/// exactly one [`CounterChanged`], including writes that store the value
/// already present, so listeners can stay idempotent instead of diffing.
/// Read-modify-write runs under one lock, which keeps interleaved mutations
/// of the same key from losing updates.
pub struct CounterStore<S> {
    storage: Mutex<S>,
    bus: Arc<EventBus>,
}

impl<S: CounterStorage> CounterStore<S> {
    pub fn new(storage: S, bus: Arc<EventBus>) -> Self {
        Self {
            storage: Mutex::new(storage),
            bus,
        }
    }

    /// Current value of a bucket, 0 when it was never written. Never fails:
    /// an unreadable backend or a non-numeric stored value both read as 0.
    pub async fn get(&self, key: &CounterKey) -> u64 {
        let mut storage = self.storage.lock().await;
        Self::read(&mut *storage, key).await
    }

    /// Clamps to `max(0, value)`, persists, then emits [`CounterChanged`]
    /// with the clamped value. Returns the stored value.
    pub async fn set(&self, key: &CounterKey, value: i64) -> u64 {
        let mut storage = self.storage.lock().await;
        self.write(&mut *storage, key, value).await
    }

    pub async fn increment(&self, key: &CounterKey, amount: u64) -> u64 {
        self.add(key, amount as i64).await
    }

    /// Clamps at 0 regardless of how large `amount` is. Whether the current
    /// user actually owns the deleted post is the caller's problem.
    pub async fn decrement(&self, key: &CounterKey, amount: u64) -> u64 {
        self.add(key, -(amount as i64)).await
    }

    /// Applies a classifier delta list in order. Emissions happen in the
    /// same order as the list.
    pub async fn apply(&self, deltas: &[(CounterKey, i64)]) {
        for (key, delta) in deltas {
            self.add(key, *delta).await;
        }
    }

    pub async fn jobs_total(&self) -> u64 {
        self.get(&CounterKey::JobsTotal).await
    }

    pub async fn jobs_seeker(&self) -> u64 {
        self.get(&CounterKey::JobsSeeker).await
    }

    pub async fn jobs_employer(&self) -> u64 {
        self.get(&CounterKey::JobsEmployer).await
    }

    pub async fn haraj_total(&self) -> u64 {
        self.get(&CounterKey::HarajTotal).await
    }

    async fn add(&self, key: &CounterKey, delta: i64) -> u64 {
        let mut storage = self.storage.lock().await;
        let current = Self::read(&mut *storage, key).await;
        self.write(&mut *storage, key, current as i64 + delta).await
    }

    async fn read(storage: &mut S, key: &CounterKey) -> u64 {
        let Some(raw) = storage.read(&key.to_string()).await else {
            return 0;
        };

        match raw.parse() {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("counter `{key}` holds non-numeric value `{raw}`: {err}");
                0
            }
        }
    }

    async fn write(&self, storage: &mut S, key: &CounterKey, value: i64) -> u64 {
        let clamped = value.max(0) as u64;
        storage.write(&key.to_string(), clamped.to_string()).await;
        self.bus.emit_counter_changed(&CounterChanged {
            key: key.clone(),
            count: clamped,
        });
        clamped
    }
}
