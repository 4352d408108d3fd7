use crate::config::Config;
use crate::errors::AppError;
use crate::models::{BatchResult, DetailedBatchResult, EnrichedLead, HealthReport, Lead};
use crate::pipeline::EnrichmentPipeline;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request size limit: 5MB max payload.
pub const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Validator -> scorer -> composer workflow.
    pub pipeline: Arc<EnrichmentPipeline>,
}

/// API routes, without transport layers (CORS, tracing, body limit).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/enrich", post(enrich_lead))
        .route("/api/batch-enrich", post(batch_enrich))
        .route("/api/batch-enrich/detailed", post(batch_enrich_detailed))
        .with_state(state)
}

/// Wraps routes in the transport layers used by the server.
///
/// Trace and CORS go on separate `Router::layer` calls so axum re-boxes
/// the body after the limit layer; CORS cannot sit directly over it.
pub fn with_transport_layers(router: Router) -> Router {
    router
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    (StatusCode::OK, Json(state.pipeline.health_check()))
}

/// POST /api/enrich
///
/// Validates the lead against all providers, scores it and drafts an
/// outreach email.
///
/// # Returns
///
/// * `Result<Json<EnrichedLead>, AppError>` - The enriched lead, or a 500
///   carrying the fault message.
pub async fn enrich_lead(
    State(state): State<Arc<AppState>>,
    Json(lead): Json<Lead>,
) -> Result<Json<EnrichedLead>, AppError> {
    tracing::info!("POST /api/enrich - company: {}", lead.company);

    let enriched = state.pipeline.enrich(lead).await?;

    Ok(Json(enriched))
}

/// POST /api/batch-enrich
///
/// Enriches all leads concurrently. Only aggregate counts and successful
/// results are returned.
pub async fn batch_enrich(
    State(state): State<Arc<AppState>>,
    Json(leads): Json<Vec<Lead>>,
) -> Result<Json<BatchResult>, AppError> {
    check_batch_size(&state.config, &leads)?;
    tracing::info!("POST /api/batch-enrich - {} lead(s)", leads.len());

    Ok(Json(state.pipeline.enrich_batch(leads).await))
}

/// POST /api/batch-enrich/detailed
///
/// Same as `/api/batch-enrich` but every lead gets a tagged item, so
/// failures carry their reason.
pub async fn batch_enrich_detailed(
    State(state): State<Arc<AppState>>,
    Json(leads): Json<Vec<Lead>>,
) -> Result<Json<DetailedBatchResult>, AppError> {
    check_batch_size(&state.config, &leads)?;
    tracing::info!("POST /api/batch-enrich/detailed - {} lead(s)", leads.len());

    Ok(Json(state.pipeline.enrich_batch_detailed(leads).await))
}

fn check_batch_size(config: &Config, leads: &[Lead]) -> Result<(), AppError> {
    if leads.len() > config.batch_max_leads {
        return Err(AppError::BadRequest(format!(
            "Batch of {} leads exceeds the limit of {}",
            leads.len(),
            config.batch_max_leads
        )));
    }
    Ok(())
}
