//! Validation data providers.
//!
//! Each lookup is a separate async source behind its own trait so the
//! validator can fan out to all three and tests can swap in fakes. The
//! `Simulated*` adapters return deterministic data shaped like the real
//! services (email verifier, company enrichment, web-activity detection)
//! and are what the binary wires up today.

use crate::errors::AppError;
use crate::models::{
    CompanyCategory, CompanyMetrics, CompanyProfile, EmailVerification, WebActivity,
};
use crate::validator::is_valid_email_format;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

#[async_trait]
pub trait EmailVerificationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn verify(&self, address: &str) -> Result<EmailVerification, AppError>;
}

#[async_trait]
pub trait CompanyEnrichmentProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the source has no record for the domain.
    async fn enrich(&self, domain: &str) -> Result<Option<CompanyProfile>, AppError>;
}

#[async_trait]
pub trait WebActivityProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, domain: &str) -> Result<WebActivity, AppError>;
}

/// The three adapters the validator fans out to.
#[derive(Clone)]
pub struct ProviderSet {
    pub email: Arc<dyn EmailVerificationProvider>,
    pub company: Arc<dyn CompanyEnrichmentProvider>,
    pub activity: Arc<dyn WebActivityProvider>,
}

impl ProviderSet {
    pub fn new(
        email: Arc<dyn EmailVerificationProvider>,
        company: Arc<dyn CompanyEnrichmentProvider>,
        activity: Arc<dyn WebActivityProvider>,
    ) -> Self {
        Self {
            email,
            company,
            activity,
        }
    }

    /// Deterministic stand-ins for all three services.
    pub fn simulated() -> Self {
        Self::new(
            Arc::new(SimulatedEmailVerifier),
            Arc::new(SimulatedCompanyEnricher),
            Arc::new(SimulatedWebActivity),
        )
    }
}

/// Format-only verifier; reports MX and SMTP as reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedEmailVerifier;

#[async_trait]
impl EmailVerificationProvider for SimulatedEmailVerifier {
    fn name(&self) -> &str {
        "simulated-email-verifier"
    }

    async fn verify(&self, address: &str) -> Result<EmailVerification, AppError> {
        tracing::debug!("Verifying email address (simulated): {}", address);

        Ok(EmailVerification {
            valid: is_valid_email_format(address),
            format_valid: true,
            mx_found: true,
            smtp_valid: true,
        })
    }
}

/// Returns a fixed mid-size software profile for any domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedCompanyEnricher;

#[async_trait]
impl CompanyEnrichmentProvider for SimulatedCompanyEnricher {
    fn name(&self) -> &str {
        "simulated-company-enricher"
    }

    async fn enrich(&self, domain: &str) -> Result<Option<CompanyProfile>, AppError> {
        tracing::debug!("Enriching company (simulated): {}", domain);

        let label = domain.split('.').next().unwrap_or_default();

        Ok(Some(CompanyProfile {
            name: title_case(label),
            domain: domain.to_string(),
            category: CompanyCategory {
                industry: Some("Technology".to_string()),
                sector: Some("Software".to_string()),
            },
            metrics: CompanyMetrics {
                employees: Some("50-200".to_string()),
                estimated_revenue: Some("$5M-$10M".to_string()),
                raised: Some("$5M".to_string()),
            },
            tech: ["React", "AWS", "Salesforce", "HubSpot"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }))
    }
}

/// Reports every domain as recently active.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWebActivity;

#[async_trait]
impl WebActivityProvider for SimulatedWebActivity {
    fn name(&self) -> &str {
        "simulated-web-activity"
    }

    async fn check(&self, domain: &str) -> Result<WebActivity, AppError> {
        tracing::debug!("Checking web activity (simulated): {}", domain);

        Ok(WebActivity {
            last_updated: Some(Utc::now()),
            active: true,
            technologies: ["React", "Next.js", "Vercel"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            social_presence: true,
        })
    }
}

/// "acme-corp" -> "Acme-Corp"
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_boundary = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if at_boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_boundary = false;
        } else {
            out.push(c);
            at_boundary = true;
        }
    }
    out
}
