use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use eventfeed::{EventFeed, ExponentialBackoff, WsTransport};
use ordersync::{
    init_tracing, AuthoritativeResolver, EngineConfig, NotificationDeduplicator, Notifier,
    ReconcileEngine, RestOrderApi, ShutdownManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = EngineConfig::from_env()?;
    print_banner(&config);

    let api: Arc<dyn ordersync::OrderApi> = Arc::new(RestOrderApi::new(&config.api_base_url));
    let resolver = Arc::new(AuthoritativeResolver::new(
        Arc::clone(&api),
        config.fetch_throttle,
    ));
    let notifier = Arc::new(Notifier::new(
        NotificationDeduplicator::new(config.creation_dedup_window, config.update_dedup_window),
        Arc::new(ordersync::LogSink),
    ));
    let engine = Arc::new(ReconcileEngine::new(
        config.viewer_id.clone(),
        resolver,
        api,
        notifier,
    ));

    let shutdown = ShutdownManager::new();
    shutdown.spawn_signal_handler();

    let transport = WsTransport::new(&config.ws_url);
    let policy = ExponentialBackoff::new(
        config.reconnect_initial,
        config.reconnect_max,
        Some(config.max_reconnect_attempts),
    );
    let feed = EventFeed::new(transport, Box::new(policy));

    let result = feed.run(engine.clone(), shutdown.flag()).await;

    // Leave a final snapshot in the log so an operator can see what the
    // local view held at exit
    let store = engine.store();
    let orders = store.read().snapshot();
    info!("Final local view: {} order(s)", orders.len());
    for order in &orders {
        info!(
            "  {} [{}] {} item(s), total {:.2}",
            order.id,
            order.lifecycle_status,
            order.line_items.len(),
            order.total_amount
        );
    }

    if let Err(e) = result {
        error!("Feed terminated: {}", e);
        return Err(e.into());
    }

    info!("Order feed stopped");
    Ok(())
}

fn print_banner(config: &EngineConfig) {
    info!("========================================");
    info!("  Order Feed");
    info!("========================================");
    info!("API:    {}", config.api_base_url);
    info!("WS:     {}", config.ws_url);
    info!(
        "Viewer: {}",
        config.viewer_id.as_deref().unwrap_or("<anonymous>")
    );
    info!("========================================");
}
