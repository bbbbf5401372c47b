use super::{types::Config, ConfigError};

fn check_url(section: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{}.url must start with http:// or https://, got {:?}",
            section, url
        )))
    }
}

fn check_non_zero(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ValidationError(format!("{} cannot be 0", field)));
    }
    Ok(())
}

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Service URLs are http(s)
/// - An `[llm]` section exists when the matcher strategy needs one
/// - Limits are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(catalog) = &config.catalog {
        check_url("catalog", &catalog.url)?;
        check_non_zero("catalog.page_size", catalog.page_size.into())?;
        check_non_zero("catalog.timeout_secs", catalog.timeout_secs.into())?;
    }

    if let Some(tracker) = &config.tracker {
        check_url("tracker", &tracker.url)?;
        if tracker.project_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tracker.project_key cannot be empty".to_string(),
            ));
        }
        check_non_zero("tracker.timeout_secs", tracker.timeout_secs.into())?;
    }

    if config.matcher.strategy.requires_llm() && config.llm.is_none() {
        return Err(ConfigError::ValidationError(format!(
            "matcher strategy {:?} requires an [llm] section",
            config.matcher.strategy
        )));
    }

    if let Some(llm) = &config.llm {
        if llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model cannot be empty".to_string(),
            ));
        }
        if let Some(base) = &llm.api_base {
            check_url("llm.api_base", base)?;
        }
        check_non_zero("llm.timeout_secs", llm.timeout_secs.into())?;
        check_non_zero("llm.max_tokens", llm.max_tokens.into())?;
    }

    check_non_zero("resolver.max_request_chars", config.resolver.max_request_chars as u64)?;
    check_non_zero("resolver.max_related", config.resolver.max_related as u64)?;
    check_non_zero("matcher.max_candidates", config.matcher.max_candidates as u64)?;
    check_non_zero("drafting.max_assets", config.drafting.max_assets as u64)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, MatchStrategy};

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = load_config_from_str("[server]\nport = 0\n").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_limits_fail() {
        let cases = [
            ("[resolver]\nmax_related = 0\n", "resolver.max_related"),
            ("[resolver]\nmax_request_chars = 0\n", "resolver.max_request_chars"),
            ("[matcher]\nmax_candidates = 0\n", "matcher.max_candidates"),
            ("[drafting]\nmax_assets = 0\n", "drafting.max_assets"),
            (
                "[catalog]\nurl = \"http://om:8585\"\ntoken = \"t\"\ntimeout_secs = 0\n",
                "catalog.timeout_secs",
            ),
            (
                "[llm]\nprovider = \"ollama\"\nmodel = \"llama3\"\ntimeout_secs = 0\n",
                "llm.timeout_secs",
            ),
        ];
        for (toml, field) in cases {
            let config = load_config_from_str(toml).unwrap();
            let err = validate_config(&config).unwrap_err();
            assert!(err.to_string().contains(field), "{}: {}", field, err);
        }
    }

    #[test]
    fn test_validate_bad_catalog_url() {
        let config = load_config_from_str(
            r#"
[catalog]
url = "openmetadata.local"
token = "t"
"#,
        )
        .unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("catalog.url"));
    }

    #[test]
    fn test_validate_llm_strategy_without_llm() {
        let mut config = Config::default();
        config.matcher.strategy = MatchStrategy::Llm;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_llm_strategy_with_llm() {
        let config = load_config_from_str(
            r#"
[llm]
provider = "ollama"
model = "llama3"

[matcher]
strategy = "llm"
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_project_key() {
        let config = load_config_from_str(
            r#"
[tracker]
url = "https://company.atlassian.net"
email = "bot@company.com"
api_token = "t"
project_key = " "
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_err());
    }
}
