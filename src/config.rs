//! Configuration for the remote connection and sync tuning.
//!
//! Configuration is stored in `.hermes/config.yaml` and includes:
//! - The remote repository (owner and name)
//! - The bearer token (environment variables take precedence)
//! - Batch size, pauses and rate-limit policy for `hermes sync`

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{HermesError, Result};
use crate::fs::write_file_atomic;
use crate::sync::{RateLimitPolicy, SyncOptions};

/// Environment variables checked for a token, in order.
pub const TOKEN_ENV_VARS: &[&str] = &["HERMES_TOKEN", "GITHUB_TOKEN"];

/// Keys accepted by `hermes config set`.
pub const SETTABLE_KEYS: &[&str] = &[
    "remote.owner",
    "remote.repo",
    "auth.token",
    "sync.batch_size",
    "sync.rate_limit_policy",
    "sync.rate_limit_retries",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub sync: SyncSettings,
}

/// Repository the queues are replayed against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitPolicyName {
    #[default]
    Skip,
    Retry,
}

impl std::fmt::Display for RateLimitPolicyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateLimitPolicyName::Skip => write!(f, "skip"),
            RateLimitPolicyName::Retry => write!(f, "retry"),
        }
    }
}

impl std::str::FromStr for RateLimitPolicyName {
    type Err = HermesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(RateLimitPolicyName::Skip),
            "retry" => Ok(RateLimitPolicyName::Retry),
            _ => Err(HermesError::Config(format!(
                "unknown rate limit policy '{s}', expected 'skip' or 'retry'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub batch_size: usize,
    pub entry_pause_ms: u64,
    pub batch_pause_ms: u64,
    pub rate_limit_cooldown_secs: u64,
    pub rate_limit_policy: RateLimitPolicyName,
    /// Only used with the `retry` policy
    pub rate_limit_retries: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            entry_pause_ms: 500,
            batch_pause_ms: 1000,
            rate_limit_cooldown_secs: 60,
            rate_limit_policy: RateLimitPolicyName::Skip,
            rate_limit_retries: 1,
        }
    }
}

impl SyncSettings {
    pub fn to_options(&self) -> SyncOptions {
        let rate_limit_policy = match self.rate_limit_policy {
            RateLimitPolicyName::Skip => RateLimitPolicy::SkipAfterCooldown,
            RateLimitPolicyName::Retry => RateLimitPolicy::RetryAfterCooldown {
                max_retries: self.rate_limit_retries,
            },
        };

        SyncOptions {
            batch_size: self.batch_size.max(1),
            entry_pause: Duration::from_millis(self.entry_pause_ms),
            batch_pause: Duration::from_millis(self.batch_pause_ms),
            rate_limit_cooldown: Duration::from_secs(self.rate_limit_cooldown_secs),
            rate_limit_policy,
        }
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        write_file_atomic(path, &content)
    }

    /// Token from the environment, falling back to the config file
    pub fn token(&self) -> Option<SecretString> {
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = env::var(var)
                && !token.is_empty()
            {
                return Some(SecretString::from(token));
            }
        }

        self.auth
            .token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.clone()))
    }

    pub fn remote(&self) -> Result<&RemoteConfig> {
        self.remote.as_ref().ok_or_else(|| {
            HermesError::Config(
                "no remote configured. Run: hermes config set remote.owner <owner> and remote.repo <repo>"
                    .to_string(),
            )
        })
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "remote.owner" => {
                self.remote.get_or_insert_with(Default::default).owner = value.to_string()
            }
            "remote.repo" => {
                self.remote.get_or_insert_with(Default::default).repo = value.to_string()
            }
            "auth.token" => self.auth.token = Some(value.to_string()),
            "sync.batch_size" => {
                let size: usize = value.parse().map_err(|_| {
                    HermesError::Config(format!("invalid batch size '{value}'"))
                })?;
                if size == 0 {
                    return Err(HermesError::Config(
                        "batch size must be at least 1".to_string(),
                    ));
                }
                self.sync.batch_size = size;
            }
            "sync.rate_limit_policy" => self.sync.rate_limit_policy = value.parse()?,
            "sync.rate_limit_retries" => {
                self.sync.rate_limit_retries = value.parse().map_err(|_| {
                    HermesError::Config(format!("invalid retry count '{value}'"))
                })?;
            }
            _ => {
                return Err(HermesError::Config(format!(
                    "unknown config key '{key}', expected one of: {}",
                    SETTABLE_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
