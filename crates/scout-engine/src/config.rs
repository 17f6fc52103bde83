use std::env;

use anyhow::{bail, Result};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

const DEFAULT_REQUEST_TIMEOUT_S: f64 = 90.0;
const MIN_REQUEST_TIMEOUT_S: f64 = 5.0;
const MAX_REQUEST_TIMEOUT_S: f64 = 300.0;

/// Process-level settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoutConfig {
    pub api_key: String,
    pub api_base: String,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub request_timeout_s: f64,
}

impl ScoutConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Fails when no API key variable is set; every other field has a default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let Some(api_key) = API_KEY_VARS.iter().find_map(|key| non_empty(*key)) else {
            bail!(
                "missing API key: set one of {} before starting scout",
                API_KEY_VARS.join(", ")
            );
        };

        let api_base = non_empty("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let request_timeout_s = match non_empty("SCOUT_REQUEST_TIMEOUT") {
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    value.clamp(MIN_REQUEST_TIMEOUT_S, MAX_REQUEST_TIMEOUT_S)
                }
                _ => bail!("SCOUT_REQUEST_TIMEOUT must be a number of seconds, got '{raw}'"),
            },
            None => DEFAULT_REQUEST_TIMEOUT_S,
        };

        Ok(Self {
            api_key,
            api_base,
            text_model: non_empty("SCOUT_TEXT_MODEL"),
            image_model: non_empty("SCOUT_IMAGE_MODEL"),
            request_timeout_s,
        })
    }
}
