/// Per-lead enrichment workflow shared by the single and batch endpoints.
///
/// For one lead:
/// 1. Validate against the external providers
/// 2. Score the lead
/// 3. Compose the outreach draft (needs the score)
///
/// Batches run one task per lead; a failing or panicking lead never
/// affects its siblings.
use crate::composer::{EmailComposer, GenerationSettings};
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::generation::{GenerativeTextBackend, OpenAiBackend};
use crate::models::{
    BatchItem, BatchResult, DetailedBatchResult, EnrichedLead, HealthReport, Lead, ServiceFlags,
};
use crate::providers::ProviderSet;
use crate::scorer::LeadScorer;
use crate::validator::Validator;
use chrono::Utc;
use std::sync::Arc;

const OPERATIONAL: &str = "operational";

pub struct EnrichmentPipeline {
    validator: Validator,
    scorer: LeadScorer,
    composer: EmailComposer,
}

impl EnrichmentPipeline {
    pub fn new(validator: Validator, scorer: LeadScorer, composer: EmailComposer) -> Self {
        Self {
            validator,
            scorer,
            composer,
        }
    }

    /// Wires the pipeline from configuration: simulated providers, and the
    /// OpenAI-compatible backend when an API key is present.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let backend: Option<Arc<dyn GenerativeTextBackend>> = OpenAiBackend::from_config(config)
            .context("initializing generative backend")?
            .map(|backend| Arc::new(backend) as Arc<dyn GenerativeTextBackend>);

        Ok(Self::new(
            Validator::new(ProviderSet::simulated(), config.provider_timeout),
            LeadScorer::new(),
            EmailComposer::new(backend, GenerationSettings::from(config)),
        ))
    }

    /// Complete enrichment for one lead.
    pub async fn enrich(&self, lead: Lead) -> Result<EnrichedLead, AppError> {
        tracing::info!("Starting enrichment for {} <{}>", lead.company, lead.email);

        tracing::debug!("Step 1: Multi-source validation");
        let validation = self
            .validator
            .validate(&lead)
            .await
            .map_err(|e| AppError::EnrichmentError(e.to_string()))?;

        tracing::debug!("Step 2: Scoring");
        let score = self.scorer.score(&lead, &validation);

        tracing::debug!("Step 3: Composing email draft");
        let email_draft = self.composer.compose(&lead, &validation, score).await;

        tracing::info!(
            "Enriched {}: confidence {}, score {}, funding {}",
            lead.company,
            validation.confidence,
            score,
            validation.funding_round
        );

        Ok(EnrichedLead {
            lead,
            validation,
            score,
            email_draft,
            enriched_at: Utc::now(),
        })
    }

    /// Enrich every lead concurrently and keep the reason for each failure.
    ///
    /// Items come back in submission order.
    pub async fn enrich_batch_detailed(self: &Arc<Self>, leads: Vec<Lead>) -> DetailedBatchResult {
        tracing::info!("Processing batch of {} lead(s)", leads.len());

        let handles: Vec<_> = leads
            .into_iter()
            .map(|lead| {
                let pipeline = Arc::clone(self);
                tokio::spawn(async move { pipeline.enrich(lead).await })
            })
            .collect();

        let mut items = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let item = match handle.await {
                Ok(Ok(result)) => BatchItem::Success { index, result },
                Ok(Err(e)) => {
                    tracing::error!("Lead {} in batch failed: {}", index, e);
                    BatchItem::Failure {
                        index,
                        error: e.to_string(),
                    }
                }
                Err(join_error) => {
                    let e = AppError::InternalError(format!(
                        "enrichment task aborted: {}",
                        join_error
                    ));
                    tracing::error!("Lead {} in batch failed: {}", index, e);
                    BatchItem::Failure {
                        index,
                        error: e.to_string(),
                    }
                }
            };
            items.push(item);
        }

        let detailed = DetailedBatchResult::from_items(items);
        tracing::info!(
            "Batch complete: {} total, {} successful, {} failed",
            detailed.total,
            detailed.successful,
            detailed.failed
        );
        detailed
    }

    /// Aggregate-only batch: failed leads are counted, not returned.
    pub async fn enrich_batch(self: &Arc<Self>, leads: Vec<Lead>) -> BatchResult {
        self.enrich_batch_detailed(leads).await.into_aggregate()
    }

    pub fn health_check(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            services: ServiceFlags {
                validator: OPERATIONAL.to_string(),
                scorer: OPERATIONAL.to_string(),
                email_generator: OPERATIONAL.to_string(),
            },
            generation_backend: self
                .composer
                .backend_name()
                .unwrap_or("template_only")
                .to_string(),
        }
    }
}
