use super::{HandlerKind, LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "STUDIO_PROVISIONER_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    /// Get a variable by its key without the STUDIO_PROVISIONER_ prefix
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Handler selection
    if let Some(kind) = get_env_string(env, "HANDLER_KIND") {
        config.handler.kind = Some(
            kind.parse::<HandlerKind>()
                .context("Invalid STUDIO_PROVISIONER_HANDLER_KIND value")?,
        );
    }

    // Logging (level and format)
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = match format.to_lowercase().as_str() {
            "text" => LogFormat::Text,
            _ => LogFormat::Json,
        };
    }

    // Polling
    if let Some(val) = get_env_u64(env, "DOMAIN_POLL_INTERVAL_SECS")? {
        config.polling.domain_interval_secs = val;
    }
    if let Some(val) = get_env_u64(env, "PROFILE_POLL_INTERVAL_SECS")? {
        config.polling.profile_interval_secs = val;
    }
    if let Some(val) = get_env_u64(env, "TIMEOUT_MARGIN_SECS")? {
        config.polling.timeout_margin_secs = val;
    }

    // Response delivery
    if let Some(val) = get_env_u64(env, "RESPONSE_TIMEOUT_SECS")? {
        config.response.timeout_secs = val;
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.trim().is_empty())
}

fn get_env_u64<E: EnvSource>(env: &E, key: &str) -> Result<Option<u64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .trim()
                .parse::<u64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn test_env_overrides_apply() {
        let env = MapEnv(HashMap::from([
            ("HANDLER_KIND", "domain"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "text"),
            ("DOMAIN_POLL_INTERVAL_SECS", "15"),
            ("TIMEOUT_MARGIN_SECS", "2"),
            ("RESPONSE_TIMEOUT_SECS", "30"),
        ]));
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env).unwrap();

        assert_eq!(config.handler.kind, Some(HandlerKind::Domain));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.polling.domain_interval_secs, 15);
        assert_eq!(config.polling.profile_interval_secs, 5);
        assert_eq!(config.polling.timeout_margin_secs, 2);
        assert_eq!(config.response.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let env = MapEnv(HashMap::from([("PROFILE_POLL_INTERVAL_SECS", "five")]));
        let mut config = RuntimeConfig::default();
        let err = apply_env_overrides(&mut config, &env).unwrap_err();
        assert!(err
            .to_string()
            .contains("STUDIO_PROVISIONER_PROFILE_POLL_INTERVAL_SECS"));
    }

    #[test]
    fn test_invalid_handler_kind_is_an_error() {
        let env = MapEnv(HashMap::from([("HANDLER_KIND", "bucket")]));
        let mut config = RuntimeConfig::default();
        assert!(apply_env_overrides(&mut config, &env).is_err());
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let env = MapEnv(HashMap::from([("LOG_LEVEL", "  ")]));
        let mut config = RuntimeConfig::default();
        apply_env_overrides(&mut config, &env).unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
