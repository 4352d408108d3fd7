//! Outreach email drafting.
//!
//! With a generative backend configured, the composer asks it for a draft
//! and parses the reply into subject and body. Any failure on that path
//! (transport, empty or unparseable reply, open circuit) drops silently to
//! the deterministic template. Without a backend the template is used
//! directly. `compose` never fails.

use crate::circuit_breaker::{create_generation_circuit_breaker, GenerationBreaker};
use crate::config::Config;
use crate::errors::AppError;
use crate::generation::{GenerationRequest, GenerativeTextBackend};
use crate::models::{EmailDraft, Lead, ValidationOutcome};
use failsafe::futures::CircuitBreaker;
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = "You are an expert B2B sales email writer. Create highly personalized, \
concise emails that reference company details, lead with value, include a clear CTA, are under \
150 words, and feel human.";

const PRODUCT_CONTEXT: &str = "Product: SaaSquatch Leads - AI-powered lead generation tool\n\
Value Prop: 40% more leads, 60% lower cost than ZoomInfo\n\
Price: $19-199/month vs $995+/month competitors";

const UNSPECIFIED: &str = "Not specified";

/// Sampling parameters for the backend call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 300,
        }
    }
}

impl From<&Config> for GenerationSettings {
    fn from(config: &Config) -> Self {
        Self {
            temperature: config.generation_temperature,
            max_tokens: config.generation_max_tokens,
        }
    }
}

pub struct EmailComposer {
    backend: Option<Arc<dyn GenerativeTextBackend>>,
    settings: GenerationSettings,
    breaker: GenerationBreaker,
}

impl EmailComposer {
    pub fn new(
        backend: Option<Arc<dyn GenerativeTextBackend>>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            backend,
            settings,
            breaker: create_generation_circuit_breaker(),
        }
    }

    pub fn template_only() -> Self {
        Self::new(None, GenerationSettings::default())
    }

    /// Name of the configured backend, if any.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|backend| backend.name())
    }

    pub async fn compose(
        &self,
        lead: &Lead,
        validation: &ValidationOutcome,
        score: u8,
    ) -> EmailDraft {
        let (subject, body) = match self.backend.as_deref() {
            None => {
                tracing::info!(
                    "No generative backend configured; using template for {}",
                    lead.company
                );
                template_email(lead, validation)
            }
            Some(backend) => match self.generate(backend, lead, validation, score).await {
                Ok(draft) => draft,
                Err(e) => {
                    tracing::warn!(
                        "Generation via {} failed for {}, falling back to template: {}",
                        backend.name(),
                        lead.company,
                        e
                    );
                    template_email(lead, validation)
                }
            },
        };

        EmailDraft {
            subject,
            body,
            personalization_factors: personalization_factors(lead, validation),
        }
    }

    async fn generate(
        &self,
        backend: &dyn GenerativeTextBackend,
        lead: &Lead,
        validation: &ValidationOutcome,
        score: u8,
    ) -> Result<(String, String), AppError> {
        let request = GenerationRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: build_user_prompt(lead, validation, score),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let raw = match self.breaker.call(backend.complete(&request)).await {
            Ok(raw) => raw,
            Err(failsafe::Error::Inner(e)) => return Err(e),
            Err(failsafe::Error::Rejected) => {
                return Err(AppError::GenerationError(
                    "circuit open, backend calls suspended".to_string(),
                ))
            }
        };

        let (subject, body) = parse_email(&raw);
        if subject.is_empty() {
            return Err(AppError::GenerationError(
                "completion has no subject line".to_string(),
            ));
        }

        tracing::info!("Generated email draft for {} via {}", lead.company, backend.name());
        Ok((subject, body))
    }
}

pub fn build_user_prompt(lead: &Lead, validation: &ValidationOutcome, score: u8) -> String {
    let tech = validation
        .tech_stack
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Create a personalized sales email for:\n\n\
         Company: {}\n\
         Contact: {} ({})\n\
         Industry: {}\n\
         Tech Stack: {}\n\
         Funding: {}\n\
         Company Size: {}\n\
         Lead Score: {}/100\n\n\
         {}\n\n\
         Make it specific to their company and tech stack.",
        lead.company,
        lead.contact,
        lead.title,
        lead.industry.as_deref().unwrap_or(UNSPECIFIED),
        tech,
        validation.funding_round,
        lead.employees.as_deref().unwrap_or(UNSPECIFIED),
        score,
        PRODUCT_CONTEXT,
    )
}

/// Split a completion into (subject, body).
///
/// The first line starting with `subject:` (any case) is the subject and
/// everything after it is the body. Without such a line the first line is
/// the subject.
pub fn parse_email(content: &str) -> (String, String) {
    let lines: Vec<&str> = content.trim().lines().collect();

    let labelled = lines.iter().enumerate().find_map(|(i, line)| {
        line.get(..8)
            .filter(|prefix| prefix.eq_ignore_ascii_case("subject:"))
            .map(|_| (i, line[8..].trim()))
    });

    let (subject, body_start) = match labelled {
        Some((i, subject)) if !subject.is_empty() => (subject.to_string(), i + 1),
        _ => match lines.first() {
            Some(first) => (first.trim().to_string(), 1),
            None => (String::new(), 0),
        },
    };

    let body = lines
        .get(body_start..)
        .unwrap_or_default()
        .join("\n")
        .trim()
        .to_string();

    (subject, body)
}

/// Deterministic fallback draft.
pub fn template_email(lead: &Lead, validation: &ValidationOutcome) -> (String, String) {
    let subject = format!("{} + SaaSquatch: Boost Lead Gen by 40%", lead.company);

    let first_name = lead.contact.split_whitespace().next().unwrap_or("there");
    let tech = validation
        .tech_stack
        .first()
        .map(String::as_str)
        .unwrap_or("a modern tech stack");
    let stage_line = if validation.funding_round.is_determined() {
        format!(
            "Given your {} stage, you're likely scaling your sales team.",
            validation.funding_round
        )
    } else {
        "As you grow, you're likely scaling your sales team.".to_string()
    };
    let industry = lead.industry.as_deref().unwrap_or("B2B");

    let body = format!(
        "Hi {first_name},\n\n\
         I noticed {company} is using {tech}. {stage_line}\n\n\
         At SaaSquatch, we help {industry} companies generate 40% more qualified leads while cutting costs by 60% vs ZoomInfo.\n\n\
         Quick question: Happy with your current lead data accuracy?\n\n\
         Worth a 15-min chat?\n\n\
         Best,\n\
         [Your Name]\n\n\
         P.S. We helped a similar company increase response rates by 6x using AI personalization.",
        company = lead.company,
    );

    (subject, body)
}

/// Inputs disclosed alongside the draft.
pub fn personalization_factors(lead: &Lead, validation: &ValidationOutcome) -> Vec<String> {
    let mut factors = vec![
        format!("Company name: {}", lead.company),
        format!("Contact name: {}", lead.contact),
        format!(
            "Industry: {}",
            lead.industry.as_deref().unwrap_or(UNSPECIFIED)
        ),
    ];

    if !validation.tech_stack.is_empty() {
        let tech = validation
            .tech_stack
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        factors.push(format!("Tech stack: {}", tech));
    }

    if validation.funding_round.is_determined() {
        factors.push(format!("Funding stage: {}", validation.funding_round));
    }

    factors
}
