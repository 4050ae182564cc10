mod config;
mod db;
mod errors;
mod export;
mod extractor;
mod handlers;
mod models;
mod provider;
mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::provider::{MockUnipileClient, ProviderClient, UnipileClient};

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool and schema, and
/// the provider client (real or mock), then serves the Axum router.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkedin_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool and schema
    let db = Database::new(&config.database_url).await?;
    db.init_schema().await?;
    tracing::info!("Database connection pool established");

    // Select the provider implementation once, at the composition root
    let provider: Arc<dyn ProviderClient> = if config.use_mock_unipile {
        tracing::warn!("Using mock Unipile client; no external calls will be made");
        Arc::new(MockUnipileClient::new())
    } else {
        Arc::new(UnipileClient::new(
            config.unipile_base_url.clone(),
            config.unipile_api_key.clone(),
        )?)
    };

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        db: db.pool.clone(),
        config: config.clone(),
        provider,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // API routes behind size and rate limits
    let api_routes = Router::new()
        .route("/api/accounts", get(handlers::get_accounts))
        .route("/api/posts/extract", post(handlers::extract_post))
        .route("/api/posts", get(handlers::list_posts))
        .route(
            "/api/posts/:id",
            get(handlers::get_post).delete(handlers::delete_post),
        )
        .route("/api/posts/:id/leads", get(handlers::get_post_leads))
        .route("/api/posts/:id/enrich", post(handlers::enrich_post))
        .route(
            "/api/posts/:id/export/csv",
            get(handlers::export_leads_csv),
        )
        .route(
            "/api/posts/:id/export/excel",
            get(handlers::export_leads_excel),
        )
        .route("/api/stats", get(handlers::get_stats))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Root/health bypass the rate limiter so orchestrator probes never 429
    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
