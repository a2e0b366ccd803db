use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::remote::{CountsFetcher, RemoteCountCache};

/// Periodic refresh of a [`RemoteCountCache`].
///
/// `start` fetches immediately and then on every tick; `stop` guarantees
/// nothing further gets scheduled, though a fetch already in flight at that
/// moment still completes and may update the cache.
pub struct Poller<F> {
    cache: Arc<RemoteCountCache<F>>,
    stop: Mutex<Option<watch::Sender<u8>>>,
}

impl<F: CountsFetcher + 'static> Poller<F> {
    pub fn new(cache: Arc<RemoteCountCache<F>>) -> Self {
        Self {
            cache,
            stop: Mutex::new(None),
        }
    }

    /// No-op when already running, so a logical poller never owns more than
    /// one timer.
    pub fn start(&self, interval: Duration) {
        let mut stop = self.stop.lock().unwrap();
        if stop.is_some() {
            tracing::debug!("poller already running, ignoring start");
            return;
        }

        let (tx, mut rx) = watch::channel(1_u8);
        let cache = Arc::clone(&self.cache);

        tokio::spawn(async move {
            let mut heartbeat = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    biased;
                    _ = rx.changed() => break,
                    _ = heartbeat.tick() => {
                        cache.fetch(false).await;
                    }
                }
            }
            tracing::info!("post count poller stopped");
        });

        *stop = Some(tx);
    }

    pub fn stop(&self) {
        let mut stop = self.stop.lock().unwrap();
        if let Some(tx) = stop.take() {
            tx.send(0).ok();
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop.lock().unwrap().is_some()
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::bus::EventBus;
    use crate::remote::RemoteCounts;

    struct CountingFetcher(Arc<AtomicU32>);

    #[async_trait::async_trait]
    impl CountsFetcher for CountingFetcher {
        async fn fetch_counts(&self) -> anyhow::Result<RemoteCounts> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(RemoteCounts::default())
        }
    }

    fn poller_with_calls() -> (Poller<CountingFetcher>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        // Zero TTL so every tick reaches the fetcher.
        let cache = Arc::new(RemoteCountCache::with_ttl(
            CountingFetcher(Arc::clone(&calls)),
            Arc::new(EventBus::new()),
            chrono::Duration::zero(),
        ));
        (Poller::new(cache), calls)
    }

    #[tokio::test]
    async fn double_start_keeps_a_single_timer() {
        let (poller, calls) = poller_with_calls();

        poller.start(Duration::from_millis(50));
        poller.start(Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(130)).await;
        poller.stop();

        // One timer ticks at 0/50/100ms. A duplicate would double this.
        let seen = calls.load(Ordering::SeqCst);
        assert!((2..=4).contains(&seen), "saw {seen} fetches");
    }

    #[tokio::test]
    async fn first_fetch_happens_immediately() {
        let (poller, calls) = poller_with_calls();

        poller.start(Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(30)).await;
        poller.stop();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_schedules_nothing_further() {
        let (poller, calls) = poller_with_calls();

        poller.start(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.stop();
        assert!(!poller.is_running());

        // Let a tick that may have been racing the stop signal drain.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after_stop = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn restart_after_stop_is_allowed() {
        let (poller, calls) = poller_with_calls();

        poller.start(Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(20)).await;
        poller.stop();

        poller.start(Duration::from_secs(3600));
        assert!(poller.is_running());
        tokio::time::sleep(Duration::from_millis(20)).await;
        poller.stop();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
