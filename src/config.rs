//! Start-up configuration read from the process environment.

use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// `None` disables the request timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub gemini: GeminiConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout_secs = match var("CAMPUS_GEMINI_TIMEOUT_SECS") {
            None => Some(DEFAULT_TIMEOUT_SECS),
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    anyhow::anyhow!("CAMPUS_GEMINI_TIMEOUT_SECS must be a whole number, got {raw:?}")
                })?;
                (secs > 0).then_some(secs)
            }
        };

        Ok(Self {
            workspace: var("CAMPUS_WORKSPACE").map(PathBuf::from),
            gemini: GeminiConfig {
                api_key: var("CAMPUS_GEMINI_API_KEY").or_else(|| var("GEMINI_API_KEY")),
                model: var("CAMPUS_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: var("CAMPUS_GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout_secs,
            },
        })
    }
}
