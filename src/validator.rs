//! Multi-source lead validation.
//!
//! Fans out to the email, company and web-activity providers concurrently,
//! waits for all three, then merges them into a single
//! [`ValidationOutcome`] with an additive confidence score and a funding
//! stage derived from the company's reported capital raised.

use crate::errors::{AppError, ResultExt};
use crate::models::{
    CompanyProfile, EmailVerification, FundingRound, Lead, ValidationOutcome, WebActivity,
};
use crate::providers::ProviderSet;
use regex::Regex;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

const EMAIL_FORMAT_POINTS: u32 = 25;
const MX_RECORD_POINTS: u32 = 15;
const COMPANY_FOUND_POINTS: u32 = 30;
const ACTIVE_SITE_POINTS: u32 = 30;

/// Whole string must be a USD-millions amount: "$5M", "$1.5M", "12 M".
static RAISED_MILLIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(\d+(?:\.\d+)?)\s*M$").expect("funding regex is valid")
});

pub struct Validator {
    providers: ProviderSet,
    /// Per-provider deadline; `None` waits indefinitely.
    timeout: Option<Duration>,
}

impl Validator {
    pub fn new(providers: ProviderSet, timeout: Option<Duration>) -> Self {
        Self { providers, timeout }
    }

    /// Validate a lead against all three providers.
    ///
    /// A provider that returns an error fails the whole validation. A
    /// provider that exceeds the configured timeout contributes its
    /// negative signal instead.
    pub async fn validate(&self, lead: &Lead) -> Result<ValidationOutcome, AppError> {
        let domain = normalize_domain(&lead.website);
        tracing::debug!(
            "Validating lead {} <{}> against domain {}",
            lead.company,
            lead.email,
            domain
        );

        let (email_result, company_result, activity_result) = tokio::join!(
            self.bounded(
                self.providers.email.name(),
                self.providers.email.verify(&lead.email),
                EmailVerification::default(),
            ),
            self.bounded(
                self.providers.company.name(),
                self.providers.company.enrich(&domain),
                None,
            ),
            self.bounded(
                self.providers.activity.name(),
                self.providers.activity.check(&domain),
                WebActivity::default(),
            ),
        );

        let email = email_result
            .with_context(|| format!("email verification failed for {}", lead.email))?;
        let company = company_result
            .with_context(|| format!("company enrichment failed for {}", domain))?;
        let activity = activity_result
            .with_context(|| format!("web activity check failed for {}", domain))?;

        Ok(merge_signals(&lead.email, email, company, activity))
    }

    async fn bounded<T, F>(&self, source: &str, call: F, fallback: T) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let Some(limit) = self.timeout else {
            return call.await;
        };

        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Provider {} timed out after {:?}; using negative signal",
                    source,
                    limit
                );
                Ok(fallback)
            }
        }
    }
}

/// Combine raw provider payloads into the outcome.
pub fn merge_signals(
    address: &str,
    email: EmailVerification,
    company: Option<CompanyProfile>,
    activity: WebActivity,
) -> ValidationOutcome {
    let email_valid = email.valid && is_valid_email_format(address);
    let company = company.filter(|profile| *profile != CompanyProfile::default());
    let company_exists = company.is_some();

    let funding_round = company
        .as_ref()
        .map(|profile| parse_funding_round(profile.metrics.raised.as_deref()))
        .unwrap_or(FundingRound::NotAvailable);
    let tech_stack = company.map(|profile| profile.tech).unwrap_or_default();

    ValidationOutcome {
        email_valid,
        company_exists,
        recent_activity: activity.active,
        tech_stack,
        funding_round,
        confidence: confidence_score(email_valid, email.mx_found, company_exists, activity.active),
    }
}

/// Additive confidence, capped at 100.
pub fn confidence_score(
    email_valid: bool,
    mx_found: bool,
    company_exists: bool,
    active: bool,
) -> u8 {
    let mut total = 0;
    if email_valid {
        total += EMAIL_FORMAT_POINTS;
    }
    if mx_found {
        total += MX_RECORD_POINTS;
    }
    if company_exists {
        total += COMPANY_FOUND_POINTS;
    }
    if active {
        total += ACTIVE_SITE_POINTS;
    }
    total.min(100) as u8
}

/// Classify a reported "amount raised" string. Anything that is not a
/// plain USD-millions figure yields `NotAvailable`.
pub fn parse_funding_round(raised: Option<&str>) -> FundingRound {
    let Some(raw) = raised else {
        return FundingRound::NotAvailable;
    };

    RAISED_MILLIONS
        .captures(raw.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|amount| amount.as_str().parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .map(FundingRound::from_millions)
        .unwrap_or(FundingRound::NotAvailable)
}

/// True iff the address has an `@` and the part after it contains a `.`.
pub fn is_valid_email_format(address: &str) -> bool {
    address
        .split('@')
        .nth(1)
        .is_some_and(|domain| domain.contains('.'))
}

/// Reduce a website to the bare host used as the provider lookup key.
///
/// "https://www.Acme.com/about" -> "acme.com"; inputs that do not parse as
/// a URL are returned trimmed and lowercased.
pub fn normalize_domain(website: &str) -> String {
    let trimmed = website.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let host = url::Url::parse(&candidate)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .unwrap_or_else(|| trimmed.to_lowercase());

    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyMetrics;

    fn profile(raised: Option<&str>, tech: &[&str]) -> CompanyProfile {
        CompanyProfile {
            name: "Acme".to_string(),
            domain: "acme.com".to_string(),
            metrics: CompanyMetrics {
                raised: raised.map(str::to_string),
                ..Default::default()
            },
            tech: tech.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn verified() -> EmailVerification {
        EmailVerification {
            valid: true,
            format_valid: true,
            mx_found: true,
            smtp_valid: true,
        }
    }

    fn active() -> WebActivity {
        WebActivity {
            active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_funding_classification() {
        assert_eq!(parse_funding_round(Some("$1.5M")), FundingRound::Seed);
        assert_eq!(parse_funding_round(Some("$5M")), FundingRound::SeriesA);
        assert_eq!(parse_funding_round(Some("$20M")), FundingRound::SeriesB);
        assert_eq!(parse_funding_round(Some("$40M")), FundingRound::SeriesCPlus);
        assert_eq!(parse_funding_round(None), FundingRound::NotAvailable);
        assert_eq!(parse_funding_round(Some("$500K")), FundingRound::NotAvailable);
        assert_eq!(parse_funding_round(Some("0")), FundingRound::NotAvailable);
    }

    #[test]
    fn test_malformed_funding_is_not_available() {
        assert_eq!(parse_funding_round(Some("$M")), FundingRound::NotAvailable);
        assert_eq!(parse_funding_round(Some("$5M-$10M")), FundingRound::NotAvailable);
        assert_eq!(parse_funding_round(Some("€5M")), FundingRound::NotAvailable);
        assert_eq!(parse_funding_round(Some("lots M")), FundingRound::NotAvailable);
    }

    #[test]
    fn test_email_format_rule() {
        assert!(is_valid_email_format("jane@acme.com"));
        assert!(!is_valid_email_format("jane.acme.com"));
        assert!(!is_valid_email_format("jane@localhost"));
        assert!(!is_valid_email_format(""));
    }

    #[test]
    fn test_confidence_all_signals_is_100() {
        assert_eq!(confidence_score(true, true, true, true), 100);
        assert_eq!(confidence_score(false, false, false, false), 0);
        assert_eq!(confidence_score(false, true, true, true), 75);
    }

    #[test]
    fn test_merge_preserves_tech_order() {
        let outcome = merge_signals(
            "jane@acme.com",
            verified(),
            Some(profile(Some("$20M"), &["Python", "React", "AWS"])),
            active(),
        );

        assert_eq!(outcome.tech_stack, vec!["Python", "React", "AWS"]);
        assert_eq!(outcome.funding_round, FundingRound::SeriesB);
        assert_eq!(outcome.confidence, 100);
    }

    #[test]
    fn test_empty_company_profile_counts_as_absent() {
        let outcome = merge_signals(
            "jane@acme.com",
            verified(),
            Some(CompanyProfile::default()),
            active(),
        );

        assert!(!outcome.company_exists);
        assert!(outcome.tech_stack.is_empty());
        assert_eq!(outcome.funding_round, FundingRound::NotAvailable);
        assert_eq!(outcome.confidence, 70);
    }

    #[test]
    fn test_provider_validity_cannot_override_format_rule() {
        let outcome = merge_signals("not-an-email", verified(), None, active());
        assert!(!outcome.email_valid);
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("acme.com"), "acme.com");
        assert_eq!(normalize_domain("https://www.Acme.com/about"), "acme.com");
        assert_eq!(normalize_domain("  http://acme.io:8080 "), "acme.io");
        assert_eq!(normalize_domain("www.acme.co.uk"), "acme.co.uk");
    }

    #[tokio::test]
    async fn test_validate_with_simulated_providers() {
        let validator = Validator::new(ProviderSet::simulated(), None);
        let lead = Lead {
            company: "Acme".to_string(),
            contact: "Jane Doe".to_string(),
            title: "CTO".to_string(),
            email: "jane@acme.com".to_string(),
            website: "acme.com".to_string(),
            industry: None,
            employees: None,
            revenue: None,
        };

        let outcome = validator.validate(&lead).await.unwrap();

        assert!(outcome.email_valid);
        assert!(outcome.company_exists);
        assert!(outcome.recent_activity);
        assert_eq!(outcome.confidence, 100);
        assert_eq!(outcome.funding_round, FundingRound::SeriesA);
        assert_eq!(outcome.tech_stack, vec!["React", "AWS", "Salesforce", "HubSpot"]);
    }
}
