//! Lead Enrichment API Library
//!
//! Enriches sales leads by aggregating validation signals from external
//! providers, computing a weighted quality score, and drafting a
//! personalized outreach email.
//!
//! # Modules
//!
//! - `circuit_breaker`: Circuit breaker guarding the generative backend.
//! - `composer`: Email drafting with template fallback.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `generation`: Generative text backend trait and OpenAI-compatible client.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Core data models.
//! - `pipeline`: Validate -> score -> compose orchestration, batch fan-out.
//! - `providers`: Validation provider traits and simulated adapters.
//! - `scorer`: Composite lead scoring.
//! - `validator`: Multi-source validation and confidence.

pub mod circuit_breaker;
pub mod composer;
pub mod config;
pub mod errors;
pub mod generation;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod scorer;
pub mod validator;
