//! Configuration validation.

use super::{Config, EndpointConfig};
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    validate_endpoint("source", &config.source)?;
    validate_endpoint("target", &config.target)?;

    // Cannot migrate into the datastore being read
    if config.source.endpoint.trim_end_matches('/') == config.target.endpoint.trim_end_matches('/')
    {
        return Err(MigrateError::Config(
            "source and target cannot be the same endpoint".into(),
        ));
    }

    if config.migration.page_size == 0 {
        return Err(MigrateError::Config(
            "migration.page_size must be at least 1".into(),
        ));
    }
    if config.migration.sample_size == 0 {
        return Err(MigrateError::Config(
            "migration.sample_size must be at least 1".into(),
        ));
    }

    Ok(())
}

fn validate_endpoint(side: &str, endpoint: &EndpointConfig) -> Result<()> {
    if endpoint.endpoint.is_empty() {
        return Err(MigrateError::Config(format!("{}.endpoint is required", side)));
    }
    if !(endpoint.endpoint.starts_with("https://") || endpoint.endpoint.starts_with("http://")) {
        return Err(MigrateError::Config(format!(
            "{}.endpoint must be an http(s) URL, got '{}'",
            side, endpoint.endpoint
        )));
    }
    if endpoint.auth_header.trim().is_empty() {
        return Err(MigrateError::Config(format!(
            "{}.auth_header cannot be empty",
            side
        )));
    }
    Ok(())
}
