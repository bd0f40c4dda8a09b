//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` so the user sees
//! them all at once.

use eduhub_common::ConfigError;

use crate::schema::EduhubConfig;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &EduhubConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_api(&mut errors, config);
    validate_messages(&mut errors, config);
    validate_logging(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_api(errors: &mut Vec<String>, config: &EduhubConfig) {
    let api = &config.api;
    if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
        errors.push(format!(
            "api.base_url must start with http:// or https://, got '{}'",
            api.base_url
        ));
    }
    if api.connect_timeout_secs == 0 {
        errors.push("api.connect_timeout_secs must be greater than 0".into());
    }
    if !api.login_route.starts_with('/') {
        errors.push(format!(
            "api.login_route must start with '/', got '{}'",
            api.login_route
        ));
    }
}

fn validate_messages(errors: &mut Vec<String>, config: &EduhubConfig) {
    if config.messages.poll_interval_ms == 0 {
        errors.push("messages.poll_interval_ms must be greater than 0".into());
    }
}

fn validate_logging(errors: &mut Vec<String>, config: &EduhubConfig) {
    if config.logging.level.trim().is_empty() {
        errors.push("logging.level must not be empty".into());
    }
}
