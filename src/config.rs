use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// Process-wide, read-only configuration. Built once in `main` and handed to
/// the components that need it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// When absent the email composer only uses the template path.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub generation_temperature: f32,
    pub generation_max_tokens: u32,
    pub generation_timeout: Option<Duration>,
    pub provider_timeout: Option<Duration>,
    pub batch_max_leads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            generation_temperature: 0.7,
            generation_max_tokens: 300,
            generation_timeout: None,
            provider_timeout: None,
            batch_max_leads: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("OPENAI_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })
                .transpose()?
                .unwrap_or(defaults.openai_base_url),
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|model| !model.trim().is_empty())
                .unwrap_or(defaults.openai_model),
            generation_temperature: std::env::var("GENERATION_TEMPERATURE")
                .ok()
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| {
                    raw.trim()
                        .parse::<f32>()
                        .ok()
                        .filter(|t| (0.0..=2.0).contains(t))
                        .ok_or_else(|| {
                            anyhow::anyhow!("GENERATION_TEMPERATURE must be a number in 0.0-2.0")
                        })
                })
                .transpose()?
                .unwrap_or(defaults.generation_temperature),
            generation_max_tokens: parse_optional_env("GENERATION_MAX_TOKENS")?
                .unwrap_or(defaults.generation_max_tokens),
            generation_timeout: parse_optional_env::<u64>("GENERATION_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            provider_timeout: parse_optional_env::<u64>("PROVIDER_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            batch_max_leads: parse_optional_env("BATCH_MAX_LEADS")?
                .unwrap_or(defaults.batch_max_leads),
        };

        // Never log the API key itself
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        if config.openai_api_key.is_some() {
            tracing::info!(
                "Generative backend configured: {} ({})",
                config.openai_base_url,
                config.openai_model
            );
        } else {
            tracing::warn!("OPENAI_API_KEY not set; email drafts will use the template");
        }
        if config.provider_timeout.is_none() {
            tracing::debug!("No provider timeout configured");
        }

        Ok(config)
    }
}

/// Reads a positive numeric env var; unset or blank means `None`.
fn parse_optional_env<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            let value: T = raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{} must be a positive number", name))?;
            if value <= T::default() {
                anyhow::bail!("{} must be greater than zero", name);
            }
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}
