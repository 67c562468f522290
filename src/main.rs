use axum::serve;
use node_classifier::api::handlers::ApiContext;
use node_classifier::api::routes::create_router;
use node_classifier::config::AppConfig;
use node_classifier::store::PostgresStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    log::info!("connecting to PostgreSQL...");
    let database_url = config.database_url()?;
    let max_connections = config.database.max_connections.unwrap_or(20);
    let store = PostgresStore::new(&database_url, max_connections).await?;

    log::info!("running database migrations...");
    store.migrate().await?;

    let ctx = ApiContext {
        store: Arc::new(store),
        protocol: config.server.protocol.clone(),
    };
    let app = create_router().with_state(ctx);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("node classifier API running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
