use std::ops::Deref;
use std::sync::Arc;

use redis::aio::ConnectionManager;

use crate::bus::EventBus;
use crate::counter::CounterStore;
use crate::poller::Poller;
use crate::remote::{HttpCountsFetcher, RemoteCountCache};

pub struct AppData(Arc<RuntimeData>);

impl From<RuntimeData> for AppData {
    fn from(data: RuntimeData) -> Self {
        Self(Arc::new(data))
    }
}

impl Clone for AppData {
    fn clone(&self) -> Self {
        AppData(Arc::clone(&self.0))
    }
}

impl Deref for AppData {
    type Target = Arc<RuntimeData>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(typed_builder::TypedBuilder)]
pub struct RuntimeData {
    pub bus: Arc<EventBus>,
    pub counters: CounterStore<ConnectionManager>,
    pub remote: Arc<RemoteCountCache<HttpCountsFetcher>>,
    pub poller: Poller<HttpCountsFetcher>,
}
