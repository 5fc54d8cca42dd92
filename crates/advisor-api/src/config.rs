//! Service configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration for the advisor API.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// SQLite connection string for the recommendation cache.
    pub database_url: String,
    /// Root directory of the resource inventory snapshots.
    pub inventory_root: PathBuf,
    /// Name of the LLM provider to use ("anthropic" or "openai").
    pub provider: String,
    /// Model identifier passed to the provider.
    pub model: String,
    /// Cloud platform tag used in cache keys.
    pub platform: String,
    /// Token budget per analysis answer.
    pub max_tokens: Option<u32>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables, with sensible
    /// defaults for local development.
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("ADVISOR_BIND_ADDR", "0.0.0.0:8080")
            .parse()
            .context("ADVISOR_BIND_ADDR is not a valid socket address")?;

        let max_tokens = match std::env::var("ADVISOR_MAX_TOKENS") {
            Ok(raw) => Some(
                raw.parse()
                    .context("ADVISOR_MAX_TOKENS is not a valid integer")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            bind_addr,
            database_url: env_or(
                "ADVISOR_DATABASE_URL",
                "sqlite://advisor-cache.db?mode=rwc",
            ),
            inventory_root: PathBuf::from(env_or("ADVISOR_INVENTORY_ROOT", "./inventory")),
            provider: env_or("ADVISOR_PROVIDER", "anthropic"),
            model: env_or("ADVISOR_MODEL", "claude-sonnet-4-20250514"),
            platform: env_or("ADVISOR_PLATFORM", "azure"),
            max_tokens,
        })
    }
}
