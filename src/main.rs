use lead_enrichment_api::config::Config;
use lead_enrichment_api::handlers::{self, AppState};
use lead_enrichment_api::pipeline::EnrichmentPipeline;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, wires the enrichment
/// pipeline (providers, scorer, composer) and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_enrichment_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Build the pipeline once; it is shared read-only by every request
    let pipeline = EnrichmentPipeline::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to build enrichment pipeline: {}", e))?;
    match pipeline.health_check().generation_backend.as_str() {
        "template_only" => tracing::info!("✓ Email composer running in template-only mode"),
        backend => tracing::info!("✓ Email composer using backend: {}", backend),
    }

    let app_state = Arc::new(AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    });

    let app = handlers::with_transport_layers(handlers::router(app_state));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
