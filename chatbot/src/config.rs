use std::env;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Generation service settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl ServiceConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            model: non_empty("GEMINI_MODEL").unwrap_or(defaults.model),
            temperature: parse_or(non_empty("GEMINI_TEMPERATURE"), "GEMINI_TEMPERATURE", defaults.temperature),
            max_output_tokens: parse_or(
                non_empty("GEMINI_MAX_OUTPUT_TOKENS"),
                "GEMINI_MAX_OUTPUT_TOKENS",
                defaults.max_output_tokens,
            ),
        }
    }

    /// Reports a missing credential. Requests still go out and fail at the service.
    pub fn warn_if_unconfigured(&self) -> bool {
        if self.api_key.is_none() {
            log::warn!("Google API key not found. Set GOOGLE_API_KEY (or GEMINI_API_KEY) in the environment or .env");
            return true;
        }
        false
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, name: &str, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable {}={}", name, value);
            default
        }),
        None => default,
    }
}
