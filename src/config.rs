//! Server configuration loaded from the environment

use anyhow::{anyhow, Context, Result};
use relayq_shared::{limits, QueueConfig};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Period of the background expiry sweep
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Shared secret every API caller must present
    pub api_key: String,
    pub queue: QueueConfig,
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from process environment, honouring a `.env` file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr =
            lookup("RELAYQ_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let api_key = lookup("RELAYQ_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("RELAYQ_API_KEY must be set to a non-empty value"))?;

        let max_pending: usize = parse_or(
            &lookup,
            "RELAYQ_MAX_QUEUE_SIZE",
            limits::MAX_PENDING_COMMANDS,
        )?;
        if max_pending == 0 {
            return Err(anyhow!("RELAYQ_MAX_QUEUE_SIZE must be greater than zero"));
        }

        let expiration_ms = parse_or(
            &lookup,
            "RELAYQ_COMMAND_EXPIRATION_MS",
            limits::COMMAND_EXPIRATION_MS,
        )?;
        let cooldown_ms = parse_or(&lookup, "RELAYQ_COOLDOWN_MS", limits::PLAYER_COOLDOWN_MS)?;

        let sweep_interval_ms: u64 =
            parse_or(&lookup, "RELAYQ_SWEEP_INTERVAL_MS", DEFAULT_SWEEP_INTERVAL_MS)?;
        if sweep_interval_ms == 0 {
            return Err(anyhow!("RELAYQ_SWEEP_INTERVAL_MS must be greater than zero"));
        }

        Ok(Self {
            bind_addr,
            api_key,
            queue: QueueConfig {
                max_pending,
                expiration_ms,
                cooldown_ms,
            },
            sweep_interval: Duration::from_millis(sweep_interval_ms),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
