use std::sync::Arc;
use std::time::Duration;

use badge_sync::{
    app::{AppData, RuntimeData},
    bus::EventBus,
    config::Config,
    counter::CounterStore,
    health,
    http::HttpClient,
    intake,
    poller::Poller,
    remote::{HttpCountsFetcher, RemoteCountCache},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    run().await
}

async fn run() {
    let config = Config::from_path().expect("fail to load config");

    let level = config
        .log_level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let app_data = prepare_app_data(&config).await;

    health::spawn_healthcheck_listener(config.health_check_port);
    intake::spawn_intake_listener(config.intake_port, app_data.clone());
    app_data
        .poller
        .start(Duration::from_secs(config.poll_interval_secs));

    tokio::signal::ctrl_c().await.ok();
    tracing::info!("Quiting badge sync daemon...");
    app_data.poller.stop();
}

async fn prepare_app_data(config: &Config) -> AppData {
    let bus = Arc::new(EventBus::new());

    let counters = CounterStore::new(prepare_storage(config).await, Arc::clone(&bus));

    let fetcher = HttpCountsFetcher::new(HttpClient::new(), config.api_base_url.as_str());
    let remote = Arc::new(RemoteCountCache::new(fetcher, Arc::clone(&bus)));
    let poller = Poller::new(Arc::clone(&remote));

    AppData::from(
        RuntimeData::builder()
            .bus(bus)
            .counters(counters)
            .remote(remote)
            .poller(poller)
            .build(),
    )
}

async fn prepare_storage(config: &Config) -> redis::aio::ConnectionManager {
    let client = redis::Client::open(config.redis_addr.as_str()).expect("fail to open redis client");
    client
        .get_connection_manager()
        .await
        .expect("fail to connect to redis")
}
