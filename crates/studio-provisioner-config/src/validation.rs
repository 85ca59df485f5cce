// Configuration validation
//
// Validates that required fields are present and values are sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

/// Past this, only a handful of polls fit in a 15 minute invocation
const MAX_SENSIBLE_INTERVAL_SECS: u64 = 60;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_handler_config(&config.handler)?;
    validate_polling_config(&config.polling)?;
    validate_response_config(&config.response)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_handler_config(config: &HandlerConfig) -> Result<()> {
    if config.kind.is_none() {
        bail!("handler.kind is required (set STUDIO_PROVISIONER_HANDLER_KIND to 'domain' or 'profile')");
    }
    Ok(())
}

fn validate_polling_config(config: &PollingConfig) -> Result<()> {
    if config.domain_interval_secs == 0 {
        bail!("polling.domain_interval_secs must be greater than 0");
    }

    if config.profile_interval_secs == 0 {
        bail!("polling.profile_interval_secs must be greater than 0");
    }

    for (name, value) in [
        ("polling.domain_interval_secs", config.domain_interval_secs),
        ("polling.profile_interval_secs", config.profile_interval_secs),
    ] {
        if value > MAX_SENSIBLE_INTERVAL_SECS {
            warn!(
                setting = name,
                value, "poll interval is very long; few polls fit in a Lambda invocation"
            );
        }
    }

    Ok(())
}

fn validate_response_config(config: &ResponseConfig) -> Result<()> {
    if config.timeout_secs == 0 {
        bail!("response.timeout_secs must be greater than 0");
    }
    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("logging.level must not be empty");
    }
    Ok(())
}
