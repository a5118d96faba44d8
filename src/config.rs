use anyhow::{Context, Result};
use std::time::Duration;

use crate::i18n::Language;
use crate::vocabulary::CefrLevel;

/// Card count bounds accepted by the vocabulary endpoint
pub const MIN_CARD_COUNT: u32 = 1;
pub const MAX_CARD_COUNT: u32 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    // Backends
    pub reise_api_url: String,
    pub portal_api_url: String,
    pub request_timeout: Duration,

    // Recording
    pub recording_max: Duration,

    // Session defaults
    pub default_level: Option<CefrLevel>,
    pub default_card_count: u32,
    pub prompt_language: Language,
    pub auxiliary_noun_pool: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_level = match std::env::var("DEFAULT_CEFR_LEVEL") {
            Ok(v) if !v.trim().is_empty() => Some(
                v.parse::<CefrLevel>()
                    .with_context(|| format!("DEFAULT_CEFR_LEVEL is invalid: {}", v))?,
            ),
            _ => None,
        };

        let prompt_language = match std::env::var("PROMPT_LANGUAGE") {
            Ok(v) => Language::from_code(&v)
                .with_context(|| format!("PROMPT_LANGUAGE is invalid: {}", v))?,
            Err(_) => Language::English,
        };

        Ok(Self {
            // Backends
            reise_api_url: std::env::var("REISE_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            portal_api_url: std::env::var("PORTAL_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),

            // Recording
            recording_max: Duration::from_secs(
                std::env::var("RECORDING_MAX_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs: &u64| *secs > 0)
                    .unwrap_or(5),
            ),

            // Session defaults
            default_level,
            default_card_count: std::env::var("DEFAULT_CARD_COUNT")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10)
                .clamp(MIN_CARD_COUNT, MAX_CARD_COUNT),
            prompt_language,
            auxiliary_noun_pool: std::env::var("AUXILIARY_NOUN_POOL")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(20)
                .clamp(MIN_CARD_COUNT, MAX_CARD_COUNT),
        })
    }

    /// Config pointing both backends at one base URL (tests, local proxies)
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            reise_api_url: base.clone(),
            portal_api_url: base,
            request_timeout: Duration::from_secs(30),
            recording_max: Duration::from_secs(5),
            default_level: None,
            default_card_count: 10,
            prompt_language: Language::English,
            auxiliary_noun_pool: 20,
        }
    }
}
