use crate::config::types::{Config, SelectorConfig, StorageConfig, WorkerConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_worker_config(&config.worker)?;
    validate_storage_config(&config.storage)?;
    if let Some(selector) = &config.selector {
        validate_selector_config(selector)?;
    }
    Ok(())
}

/// Validates worker configuration
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.max_depth < -1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be -1 (unbounded) or >= 0, got {}",
            config.max_depth
        )));
    }

    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.backoff_unit_ms < 1 {
        return Err(ConfigError::Validation(
            "backoff_unit_ms must be >= 1".to_string(),
        ));
    }

    if config.max_backoff < 1 {
        return Err(ConfigError::Validation(format!(
            "max_backoff must be >= 1, got {}",
            config.max_backoff
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the exclusion table
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    let Some(exclude) = &config.exclude else {
        return Ok(());
    };

    for (suffix, fragments) in exclude {
        validate_domain_suffix(suffix)?;

        for fragment in fragments {
            validate_fragment(suffix, fragment)?;
        }
    }

    Ok(())
}

/// Validates a domain suffix key such as "example.com" or "co.uk"
fn validate_domain_suffix(suffix: &str) -> Result<(), ConfigError> {
    if suffix.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain suffix cannot be empty".to_string(),
        ));
    }

    if !suffix
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain suffix '{}' contains invalid characters",
            suffix
        )));
    }

    if suffix.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain suffix '{}' cannot contain consecutive dots",
            suffix
        )));
    }

    Ok(())
}

/// Fragments are compared against whole `/`-separated segments, so they can
/// never contain a slash themselves.
fn validate_fragment(suffix: &str, fragment: &str) -> Result<(), ConfigError> {
    if fragment.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Exclusion list for '{}' contains an empty fragment",
            suffix
        )));
    }

    if fragment.contains('/') {
        return Err(ConfigError::Validation(format!(
            "Exclusion fragment '{}' for '{}' cannot contain '/'",
            fragment, suffix
        )));
    }

    Ok(())
}
