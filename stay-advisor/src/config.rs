use anyhow::{Context, Result, anyhow, bail};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Default number of generation attempts per query: one try plus one retry.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

static GLOBAL_CONFIG: OnceLock<AdvisorConfig> = OnceLock::new();

/// Which hosted completion API the generator talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    OpenRouter,
}

impl LlmProvider {
    fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-3.5-turbo",
            LlmProvider::OpenRouter => "openai/gpt-4.1-mini",
        }
    }

    fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            other => Err(anyhow!("unknown LLM_PROVIDER {:?}", other)),
        }
    }
}

/// Settings for the generator and the retry loop.
#[derive(Clone)]
pub struct AdvisorConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    /// Total generation attempts per query, including the first.
    pub max_attempts: u32,
    pub generation_timeout: Duration,
}

impl AdvisorConfig {
    pub fn new(provider: LlmProvider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Load configuration from environment variables, reading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Configuration loaded once per process. Later calls return the cached
    /// value.
    pub fn global() -> Result<&'static AdvisorConfig> {
        if let Some(config) = GLOBAL_CONFIG.get() {
            return Ok(config);
        }
        let config = Self::from_env()?;
        Ok(GLOBAL_CONFIG.get_or_init(|| config))
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::OpenAi,
        };

        let api_key = get(provider.api_key_var())
            .or_else(|| get("API_KEY"))
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("{} must be set", provider.api_key_var()))?;

        let mut config = Self::new(provider, api_key);

        if let Some(model) = get("LLM_MODEL") {
            config.model = model;
        }

        if let Some(value) = get("MAX_ATTEMPTS") {
            config.max_attempts = value
                .parse()
                .context("MAX_ATTEMPTS must be a positive integer")?;
        }
        if config.max_attempts == 0 {
            bail!("MAX_ATTEMPTS must be at least 1");
        }

        if let Some(value) = get("GENERATION_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .context("GENERATION_TIMEOUT_SECS must be a number of seconds")?;
            config.generation_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

impl fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_attempts", &self.max_attempts)
            .field("generation_timeout", &self.generation_timeout)
            .finish()
    }
}
