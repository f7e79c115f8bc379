use review_retrieval::api::{create_router, AppState};
use review_retrieval::infrastructure::Config;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load()?;
    info!(
        qdrant = %config.vector_store.url,
        products = %config.vector_store.products_collection,
        reviews = %config.vector_store.reviews_collection,
        model = %config.embedding.model,
        "Configuration loaded"
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Backends connect lazily on the first retrieval or readiness check.
    let state = AppState::new(config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api=debug,review_retrieval=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
