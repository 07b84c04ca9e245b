use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - API base URL is http(s)
/// - Page size is at least 1
/// - Search threshold and minimum match length are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = config.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must start with http:// or https://, got '{}'",
            base_url
        )));
    }

    if config.listing.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "listing.page_size must be at least 1".to_string(),
        ));
    }

    let threshold = config.search.threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(ConfigError::ValidationError(format!(
            "search.threshold must be in (0, 1], got {}",
            threshold
        )));
    }

    if config.search.min_match_len == 0 {
        return Err(ConfigError::ValidationError(
            "search.min_match_len must be at least 1".to_string(),
        ));
    }

    if config.payouts.min_withdrawal < 0.0 {
        return Err(ConfigError::ValidationError(
            "payouts.min_withdrawal cannot be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[api]
base_url = "https://api.example.com"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_non_http_base_url_fails() {
        let mut config = base_config();
        config.api.base_url = "ftp://api.example.com".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_page_size_fails() {
        let mut config = base_config();
        config.listing.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_threshold_bounds() {
        let mut config = base_config();
        config.search.threshold = 0.0;
        assert!(validate_config(&config).is_err());
        config.search.threshold = 1.0;
        assert!(validate_config(&config).is_ok());
        config.search.threshold = 1.5;
        assert!(validate_config(&config).is_err());
    }
}
