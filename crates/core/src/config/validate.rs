use super::{types::Config, ConfigError};
use crate::ticket::ReferencePattern;

/// Validate configuration
/// Currently validates:
/// - Jira host, credentials and project key are present
/// - Project key contains no whitespace
/// - Request timeout is not 0
/// - Block marker is not empty
/// - Reference pattern contains `{key}` and compiles
/// - Type markers are not empty strings
/// - Input and output are different files
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let jira = &config.jira;
    for (name, value) in [
        ("jira.host", &jira.host),
        ("jira.username", &jira.username),
        ("jira.password", &jira.password),
        ("jira.project_key", &jira.project_key),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if jira.project_key.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError(format!(
            "jira.project_key '{}' cannot contain whitespace",
            jira.project_key
        )));
    }

    if jira.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "jira.timeout_secs cannot be 0".to_string(),
        ));
    }

    let changelog = &config.changelog;
    if changelog.block_marker.is_empty() {
        return Err(ConfigError::ValidationError(
            "changelog.block_marker cannot be empty".to_string(),
        ));
    }

    ReferencePattern::new(&changelog.reference_pattern, &jira.project_key)
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let markers = &changelog.type_markers;
    if markers
        .feature
        .iter()
        .chain(&markers.fix)
        .chain(&markers.breaking_change)
        .any(|m| m.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "changelog.type_markers cannot contain empty markers".to_string(),
        ));
    }

    if changelog.input == changelog.output {
        return Err(ConfigError::ValidationError(format!(
            "changelog.output must differ from changelog.input ({})",
            changelog.input.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChangelogConfig, JiraConfig, MetricsConfig};

    fn valid_config() -> Config {
        Config {
            jira: JiraConfig {
                host: "acme.atlassian.net".to_string(),
                username: "bot".to_string(),
                password: "token".to_string(),
                project_key: "PROJ".to_string(),
                base_url: None,
                api_version: "2".to_string(),
                timeout_secs: 30,
            },
            changelog: ChangelogConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_password_fails() {
        let mut config = valid_config();
        config.jira.password = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("jira.password")));
    }

    #[test]
    fn test_validate_project_key_with_space_fails() {
        let mut config = valid_config();
        config.jira.project_key = "MY PROJ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_timeout_zero_fails() {
        let mut config = valid_config();
        config.jira.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.contains("timeout_secs")));
    }

    #[test]
    fn test_validate_reference_pattern_without_key_fails() {
        let mut config = valid_config();
        config.changelog.reference_pattern = r"#\d+".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_type_marker_fails() {
        let mut config = valid_config();
        config.changelog.type_markers.fix.push(" ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_output_same_as_input_fails() {
        let mut config = valid_config();
        config.changelog.output = config.changelog.input.clone();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
