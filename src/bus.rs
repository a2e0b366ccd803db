use std::sync::Mutex;

use crate::counter::CounterKey;
use crate::remote::RemoteCounts;

/// Broadcast on every [`CounterStore`](crate::counter::CounterStore) write,
/// carrying the already-clamped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterChanged {
    pub key: CounterKey,
    pub count: u64,
}

/// Opaque listener handle. Dropping it does not unsubscribe, removal has to
/// go through the matching `off_*` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

struct Channel<T> {
    next_id: u64,
    listeners: Vec<(u64, Box<dyn Fn(&T) + Send + Sync>)>,
}

impl<T> Channel<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    fn subscribe(&mut self, listener: Box<dyn Fn(&T) + Send + Sync>) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        Subscription(id)
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|(id, _)| *id != subscription.0);
    }

    fn emit(&self, payload: &T) {
        for (_, listener) in &self.listeners {
            listener(payload);
        }
    }
}

/// In-process pub/sub between the counter/cache layer and UI observers.
///
/// Two channels: counter changes and polled remote-count snapshots. Delivery
/// is synchronous, on the emitting task, in subscription order. Nothing is
/// buffered for late subscribers. Listeners must not subscribe or emit from
/// inside a callback.
pub struct EventBus {
    counter: Mutex<Channel<CounterChanged>>,
    remote: Mutex<Channel<RemoteCounts>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            counter: Mutex::new(Channel::new()),
            remote: Mutex::new(Channel::new()),
        }
    }

    pub fn on_counter_changed<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CounterChanged) + Send + Sync + 'static,
    {
        self.counter.lock().unwrap().subscribe(Box::new(listener))
    }

    pub fn off_counter_changed(&self, subscription: Subscription) {
        self.counter.lock().unwrap().unsubscribe(subscription);
    }

    pub fn emit_counter_changed(&self, payload: &CounterChanged) {
        self.counter.lock().unwrap().emit(payload);
    }

    pub fn on_remote_counts<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&RemoteCounts) + Send + Sync + 'static,
    {
        self.remote.lock().unwrap().subscribe(Box::new(listener))
    }

    pub fn off_remote_counts(&self, subscription: Subscription) {
        self.remote.lock().unwrap().unsubscribe(subscription);
    }

    pub fn emit_remote_counts(&self, payload: &RemoteCounts) {
        self.remote.lock().unwrap().emit(payload);
    }
}
