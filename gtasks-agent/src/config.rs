//! Environment-driven configuration
//!
//! Settings come from the environment (a local `.env` is loaded by `main`)
//! and are collected once into a [`Config`] that is passed down explicitly.

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TASKS_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Runtime configuration for the agent
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the chat model endpoint
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub openai_base_url: String,
    /// Chat model identifier
    pub model: String,
    /// Sampling temperature; 0 keeps tool selection deterministic
    pub temperature: f32,
    /// OAuth access token for the Tasks API
    pub tasks_access_token: String,
    /// Base URL of the Tasks API
    pub tasks_base_url: String,
}

impl Config {
    /// Read configuration from the environment
    pub fn from_env() -> Result<Self> {
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set (put it in the environment or a .env file)")?;
        let tasks_access_token = std::env::var("GTASKS_ACCESS_TOKEN")
            .context("GTASKS_ACCESS_TOKEN is not set (a valid Google Tasks OAuth access token)")?;

        Ok(Self {
            openai_api_key,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            temperature: 0.0,
            tasks_access_token,
            tasks_base_url: env_or("GTASKS_BASE_URL", DEFAULT_TASKS_BASE_URL),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(
            env_or("GTASKS_TEST_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
