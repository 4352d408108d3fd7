//! Composite lead scoring from firmographic, technographic and behavioral
//! signals. Pure and deterministic; missing lead fields score as neutral.

use crate::models::{Lead, ValidationOutcome};
use serde::Serialize;

const HIGH_FIT_INDUSTRIES: &[&str] = &["SaaS", "Technology", "Software", "Fintech"];
const MEDIUM_FIT_INDUSTRIES: &[&str] = &["E-commerce", "Healthcare", "Consulting"];
const RELEVANT_TECH: &[&str] = &["React", "Salesforce", "HubSpot", "AWS", "Python"];

/// Relative weight of each sub-score. Sums to 1.0.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreWeights {
    pub company_size: f64,
    pub revenue: f64,
    pub industry_fit: f64,
    pub data_quality: f64,
    pub tech_stack: f64,
    pub recent_activity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            company_size: 0.25,
            revenue: 0.20,
            industry_fit: 0.15,
            data_quality: 0.20,
            tech_stack: 0.10,
            recent_activity: 0.10,
        }
    }
}

/// Normalized sub-scores, each within 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub company_size: f64,
    pub revenue: f64,
    pub industry_fit: f64,
    pub data_quality: f64,
    pub tech_stack: f64,
    pub recent_activity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LeadScorer {
    weights: ScoreWeights,
}

impl LeadScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite score in 0-100.
    pub fn score(&self, lead: &Lead, validation: &ValidationOutcome) -> u8 {
        let parts = self.breakdown(lead, validation);
        let w = &self.weights;

        let weighted = parts.company_size * w.company_size
            + parts.revenue * w.revenue
            + parts.industry_fit * w.industry_fit
            + parts.data_quality * w.data_quality
            + parts.tech_stack * w.tech_stack
            + parts.recent_activity * w.recent_activity;

        // Small epsilon so 0.999... * 100 floors to the intended integer.
        let total = (weighted * 100.0 + 1e-9).floor();
        total.clamp(0.0, 100.0) as u8
    }

    pub fn breakdown(&self, lead: &Lead, validation: &ValidationOutcome) -> ScoreBreakdown {
        ScoreBreakdown {
            company_size: score_company_size(lead.employees.as_deref().unwrap_or_default()),
            revenue: score_revenue(lead.revenue.as_deref().unwrap_or_default()),
            industry_fit: score_industry(lead.industry.as_deref().unwrap_or_default()),
            data_quality: f64::from(validation.confidence.min(100)) / 100.0,
            tech_stack: score_tech_stack(&validation.tech_stack),
            recent_activity: if validation.recent_activity { 1.0 } else { 0.3 },
        }
    }
}

/// Substring match against the employee bucket vocabulary.
pub fn score_company_size(employees: &str) -> f64 {
    if employees.contains("200-500") || employees.contains("500+") {
        1.0
    } else if employees.contains("50-200") {
        0.8
    } else if employees.contains("10-50") {
        0.6
    } else {
        0.4
    }
}

pub fn score_revenue(revenue: &str) -> f64 {
    if revenue.contains("$10M") || revenue.contains("$50M") {
        1.0
    } else if revenue.contains("$5M") {
        0.8
    } else if revenue.contains("$1M") {
        0.6
    } else {
        0.4
    }
}

/// Case-sensitive.
pub fn score_industry(industry: &str) -> f64 {
    if HIGH_FIT_INDUSTRIES.iter().any(|fit| industry.contains(fit)) {
        1.0
    } else if MEDIUM_FIT_INDUSTRIES.iter().any(|fit| industry.contains(fit)) {
        0.7
    } else {
        0.5
    }
}

pub fn score_tech_stack(tech_stack: &[String]) -> f64 {
    let matches = tech_stack
        .iter()
        .filter(|tech| RELEVANT_TECH.contains(&tech.as_str()))
        .count();
    (matches as f64 / 3.0).min(1.0)
}
