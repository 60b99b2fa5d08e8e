mod analysis;
mod compliance;
mod config;
mod content;
mod db;
mod errors;
mod knowledge;
mod llm_client;
mod models;
mod parser;
mod pipeline;
mod proposal;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::knowledge::DomainRegistry;
use crate::llm_client::{AnthropicClient, RetryPolicy, Retrying, TextGenerator};
use crate::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::PgDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bidsmith API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL document store
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store = Arc::new(PgDocumentStore::new(db));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Knowledge domains are fixed for the lifetime of the process
    let registry = Arc::new(DomainRegistry::standard());
    info!("Knowledge registry loaded ({} domains)", registry.iter().count());

    let mut pipeline = Pipeline::new(registry);
    match &config.anthropic_api_key {
        Some(key) => {
            let client = AnthropicClient::new(key.as_str(), &config.anthropic_base_url)?;
            info!("Text generator initialized (model: {})", client.model());
            let policy = RetryPolicy::new(config.llm_retry_attempts, config.llm_retry_delay);
            pipeline = pipeline.with_generator(Arc::new(Retrying::new(client, policy)));
        }
        None => warn!("ANTHROPIC_API_KEY not set; proposals will use templates only"),
    }

    // Build app state
    let state = AppState {
        store,
        s3,
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    };

    // Build router
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the bid portal domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "bidsmith-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
