use crate::config::types::{AuthConfig, Config, CrawlerConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    if let Some(auth) = &config.auth {
        validate_auth_config(auth)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;

    if config.sections_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "sections-file cannot be empty".to_string(),
        ));
    }

    if config.max_workers < 1 || config.max_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 64, got {}",
            config.max_workers
        )));
    }

    if config.max_links == Some(0) {
        return Err(ConfigError::Validation(
            "max-links must be >= 1 when set".to_string(),
        ));
    }

    for ext in &config.document_extensions {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "document extensions are given without a leading dot, got '{}'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.retries < 1 {
        return Err(ConfigError::InvalidRetryCount(config.retries));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates login configuration
fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    validate_http_url("login-url", &config.login_url)?;

    if config.retries < 1 {
        return Err(ConfigError::InvalidRetryCount(config.retries));
    }

    if config.credentials_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "credentials-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if config.documents_dir.as_os_str().is_empty() || config.texts_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "documents-dir and texts-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Requires an absolute http(s) URL
fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", key, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            key, value
        )));
    }

    Ok(())
}
