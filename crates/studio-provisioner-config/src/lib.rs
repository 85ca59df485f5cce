// studio-provisioner-config - Runtime configuration for the Lambda handlers
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from STUDIO_PROVISIONER_CONFIG env var
// 3. Config file contents from STUDIO_PROVISIONER_CONFIG_CONTENT env var
// 4. Default config file locations (./config.toml, ./.studio-provisioner.toml)
// 5. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub handler: HandlerConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub response: ResponseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which custom resource this function serves
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<HandlerKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Domain,
    Profile,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerKind::Domain => write!(f, "domain"),
            HandlerKind::Profile => write!(f, "profile"),
        }
    }
}

impl std::str::FromStr for HandlerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "domain" | "studio-domain" => Ok(HandlerKind::Domain),
            "profile" | "user-profile" | "userprofile" => Ok(HandlerKind::Profile),
            _ => anyhow::bail!("Unsupported handler kind: {}. Supported: domain, profile", s),
        }
    }
}

/// Poll cadence for each resource kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_domain_interval_secs")]
    pub domain_interval_secs: u64,
    #[serde(default = "default_profile_interval_secs")]
    pub profile_interval_secs: u64,
    /// Extra time kept on top of the interval before starting another poll
    #[serde(default = "default_timeout_margin_secs")]
    pub timeout_margin_secs: u64,
}

fn default_domain_interval_secs() -> u64 {
    10
}

fn default_profile_interval_secs() -> u64 {
    5
}

fn default_timeout_margin_secs() -> u64 {
    1
}

impl PollingConfig {
    pub fn interval_for(&self, kind: HandlerKind) -> Duration {
        match kind {
            HandlerKind::Domain => Duration::from_secs(self.domain_interval_secs),
            HandlerKind::Profile => Duration::from_secs(self.profile_interval_secs),
        }
    }

    pub fn timeout_margin(&self) -> Duration {
        Duration::from_secs(self.timeout_margin_secs)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            domain_interval_secs: default_domain_interval_secs(),
            profile_interval_secs: default_profile_interval_secs(),
            timeout_margin_secs: default_timeout_margin_secs(),
        }
    }
}

/// Delivery of the outcome to the presigned ResponseURL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    #[serde(default = "default_response_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_response_timeout_secs() -> u64 {
    10
}

impl ResponseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_response_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// CloudWatch parses JSON lines, so JSON is the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    #[default]
    Json,
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Handler kind; only valid after `validate()` succeeded
    pub fn handler_kind(&self) -> Result<HandlerKind> {
        self.handler
            .kind
            .ok_or_else(|| anyhow::anyhow!("handler.kind is not configured"))
    }
}
