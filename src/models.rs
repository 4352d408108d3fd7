use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Request Models ============

/// A sales prospect submitted for enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Company name.
    pub company: String,
    /// Contact full name.
    pub contact: String,
    /// Contact job title.
    pub title: String,
    /// Contact email address. Not format-checked at the boundary.
    pub email: String,
    /// Company website or bare domain.
    pub website: String,
    /// Free-text industry label (e.g. "SaaS").
    #[serde(default)]
    pub industry: Option<String>,
    /// Free-text employee-count bucket (e.g. "50-200", "500+").
    #[serde(default)]
    pub employees: Option<String>,
    /// Free-text revenue bucket (e.g. "$5M-$10M").
    #[serde(default)]
    pub revenue: Option<String>,
}

// ============ Validation Models ============

/// Funding stage inferred from the company's reported capital raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingRound {
    #[serde(rename = "Seed")]
    Seed,
    #[serde(rename = "Series A")]
    SeriesA,
    #[serde(rename = "Series B")]
    SeriesB,
    #[serde(rename = "Series C+")]
    SeriesCPlus,
    #[serde(rename = "Not Available")]
    NotAvailable,
}

impl FundingRound {
    /// Bands a USD-millions amount into a round.
    pub fn from_millions(amount: f64) -> Self {
        if amount < 2.0 {
            FundingRound::Seed
        } else if amount < 10.0 {
            FundingRound::SeriesA
        } else if amount < 30.0 {
            FundingRound::SeriesB
        } else {
            FundingRound::SeriesCPlus
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FundingRound::Seed => "Seed",
            FundingRound::SeriesA => "Series A",
            FundingRound::SeriesB => "Series B",
            FundingRound::SeriesCPlus => "Series C+",
            FundingRound::NotAvailable => "Not Available",
        }
    }

    pub fn is_determined(&self) -> bool {
        !matches!(self, FundingRound::NotAvailable)
    }
}

impl fmt::Display for FundingRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merged result of the three validation providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub email_valid: bool,
    pub company_exists: bool,
    pub recent_activity: bool,
    /// Technologies in the order the company source reported them.
    pub tech_stack: Vec<String>,
    pub funding_round: FundingRound,
    /// Corroboration measure, always within 0-100.
    pub confidence: u8,
}

// ============ Output Models ============

/// Outreach email draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
    /// Human-readable inputs that shaped the draft, in a stable order.
    pub personalization_factors: Vec<String>,
}

/// Terminal artifact returned for one lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedLead {
    pub lead: Lead,
    pub validation: ValidationOutcome,
    pub score: u8,
    pub email_draft: EmailDraft,
    pub enriched_at: DateTime<Utc>,
}

/// Aggregate-only batch response.
///
/// Failed leads are counted but dropped from `results`; see
/// [`DetailedBatchResult`] for the per-item variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<EnrichedLead>,
}

/// Outcome for one lead of a batch, tagged by status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchItem {
    Success { index: usize, result: EnrichedLead },
    Failure { index: usize, error: String },
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchItem::Success { .. })
    }
}

/// Batch response that keeps the reason for every failed lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedBatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

impl DetailedBatchResult {
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        let successful = items.iter().filter(|item| item.is_success()).count();
        Self {
            total: items.len(),
            successful,
            failed: items.len() - successful,
            items,
        }
    }

    /// Collapses to the aggregate-only shape, preserving submission order.
    pub fn into_aggregate(self) -> BatchResult {
        let results = self
            .items
            .into_iter()
            .filter_map(|item| match item {
                BatchItem::Success { result, .. } => Some(result),
                BatchItem::Failure { .. } => None,
            })
            .collect();

        BatchResult {
            total: self.total,
            successful: self.successful,
            failed: self.failed,
            results,
        }
    }
}

/// Per-component flags reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceFlags {
    pub validator: String,
    pub scorer: String,
    pub email_generator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceFlags,
    /// Name of the generative backend, or "template_only".
    pub generation_backend: String,
}

// ============ Provider Payloads ============

/// Response shape of an email-verification service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailVerification {
    pub valid: bool,
    pub format_valid: bool,
    pub mx_found: bool,
    pub smtp_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyCategory {
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetrics {
    #[serde(default)]
    pub employees: Option<String>,
    #[serde(default)]
    pub estimated_revenue: Option<String>,
    /// Capital raised as reported, e.g. "$5M".
    #[serde(default)]
    pub raised: Option<String>,
}

/// Company-enrichment record. `None` at the provider boundary means the
/// company is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub category: CompanyCategory,
    #[serde(default)]
    pub metrics: CompanyMetrics,
    #[serde(default)]
    pub tech: Vec<String>,
}

/// Web-activity / technology-detection record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebActivity {
    pub last_updated: Option<DateTime<Utc>>,
    pub active: bool,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub social_presence: bool,
}
