use creatorbets::api::create_router;
use creatorbets::config::AppConfig;
use creatorbets::engine::MarketEngine;
use creatorbets::metrics::init_metrics;
use creatorbets::store::MemoryStore;
use creatorbets::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = init_metrics();

    let store = MemoryStore::new();
    let engine = MarketEngine::new(store);

    let state = AppState {
        engine,
        config,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
