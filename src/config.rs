use std::time::Duration;

use clap::Args;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Runtime settings. Every flag can also come from the environment (or a
/// `.env` file loaded at startup).
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini REST endpoint
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Model used for regular requests
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Model used when a request asks for the flash variant
    #[arg(long, env = "GEMINI_FLASH_MODEL", default_value = DEFAULT_MODEL)]
    pub flash_model: String,

    #[arg(long, env = "GEMINI_MAX_OUTPUT_TOKENS", default_value_t = 1000)]
    pub max_output_tokens: u32,

    #[arg(long, env = "GEMINI_TEMPERATURE", default_value_t = 1.0)]
    pub temperature: f32,

    /// Timeout for the generation call, in seconds
    #[arg(long, env = "GEMINI_TIMEOUT_SECS", default_value_t = 60)]
    pub model_timeout_secs: u64,

    /// Timeout for fetching the page, in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 5)]
    pub fetch_timeout_secs: u64,
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Model name for a request; `use_flash` picks the flash variant.
    pub fn model_for(&self, use_flash: bool) -> &str {
        if use_flash {
            &self.flash_model
        } else {
            &self.model
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            flash_model: DEFAULT_MODEL.to_string(),
            max_output_tokens: 1000,
            temperature: 1.0,
            model_timeout_secs: 60,
            fetch_timeout_secs: 5,
        }
    }
}
