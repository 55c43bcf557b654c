use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub jira: JiraConfig,
    #[serde(default)]
    pub changelog: ChangelogConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Jira connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JiraConfig {
    /// Jira hostname (e.g., "acme.atlassian.net"), also used for browse links
    #[serde(deserialize_with = "string_or_scalar")]
    pub host: String,
    #[serde(deserialize_with = "string_or_scalar")]
    pub username: String,
    /// Password or API token
    #[serde(deserialize_with = "string_or_scalar")]
    pub password: String,
    /// Ticket prefix, e.g. "PROJ" for PROJ-123
    #[serde(deserialize_with = "string_or_scalar")]
    pub project_key: String,
    /// REST endpoint override (default: https://{host})
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(
        default = "default_api_version",
        deserialize_with = "string_or_scalar"
    )]
    pub api_version: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl JiraConfig {
    /// Base URL for REST calls.
    pub fn rest_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host),
        }
    }
}

/// Accept numbers and booleans where a string is expected.
///
/// Environment values are parsed into typed values, so a numeric token
/// like `CHANGELOG_JIRA_JIRA__PASSWORD=123456` arrives as an integer.
fn string_or_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrScalar;

    impl de::Visitor<'_> for StringOrScalar {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(StringOrScalar)
}

fn default_api_version() -> String {
    "2".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Changelog input/output and format conventions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangelogConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Substring that opens a block of merged pull requests
    #[serde(default = "default_block_marker")]
    pub block_marker: String,
    /// Inline ticket reference stripped from rendered entries.
    /// `{key}` expands to the escaped project key.
    #[serde(default = "default_reference_pattern")]
    pub reference_pattern: String,
    #[serde(default)]
    pub type_markers: TypeMarkers,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            block_marker: default_block_marker(),
            reference_pattern: default_reference_pattern(),
            type_markers: TypeMarkers::default(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_output() -> PathBuf {
    PathBuf::from("CHANGELOG-JIRA.txt")
}

fn default_block_marker() -> String {
    "### Pull Requests".to_string()
}

fn default_reference_pattern() -> String {
    r"#{key}-\d+".to_string()
}

/// Keywords recognized at the start of an entry, per category
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TypeMarkers {
    #[serde(default = "default_feature_markers")]
    pub feature: Vec<String>,
    #[serde(default = "default_fix_markers")]
    pub fix: Vec<String>,
    #[serde(default = "default_breaking_change_markers")]
    pub breaking_change: Vec<String>,
}

impl Default for TypeMarkers {
    fn default() -> Self {
        Self {
            feature: default_feature_markers(),
            fix: default_fix_markers(),
            breaking_change: default_breaking_change_markers(),
        }
    }
}

fn default_feature_markers() -> Vec<String> {
    vec!["feat".to_string(), "feature".to_string()]
}

fn default_fix_markers() -> Vec<String> {
    vec!["bugfix".to_string(), "fix".to_string()]
}

fn default_breaking_change_markers() -> Vec<String> {
    vec!["breaking-changes".to_string()]
}

/// Metrics export configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Write the Prometheus text exposition here after each run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfile: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub jira: SanitizedJiraConfig,
    pub changelog: ChangelogConfig,
    pub metrics: MetricsConfig,
}

/// Sanitized Jira config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJiraConfig {
    pub host: String,
    pub username: String,
    pub password_configured: bool,
    pub project_key: String,
    pub rest_base_url: String,
    pub api_version: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            jira: SanitizedJiraConfig {
                host: config.jira.host.clone(),
                username: config.jira.username.clone(),
                password_configured: !config.jira.password.is_empty(),
                project_key: config.jira.project_key.clone(),
                rest_base_url: config.jira.rest_base_url(),
                api_version: config.jira.api_version.clone(),
                timeout_secs: config.jira.timeout_secs,
            },
            changelog: config.changelog.clone(),
            metrics: config.metrics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jira_config() -> JiraConfig {
        JiraConfig {
            host: "acme.atlassian.net".to_string(),
            username: "bot".to_string(),
            password: "secret-token".to_string(),
            project_key: "PROJ".to_string(),
            base_url: None,
            api_version: default_api_version(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[jira]
host = "acme.atlassian.net"
username = "bot"
password = "token"
project_key = "PROJ"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.jira.host, "acme.atlassian.net");
        assert_eq!(config.jira.api_version, "2");
        assert_eq!(config.jira.timeout_secs, 30);
        assert_eq!(config.changelog.input, PathBuf::from("CHANGELOG.md"));
        assert_eq!(config.changelog.output, PathBuf::from("CHANGELOG-JIRA.txt"));
        assert_eq!(config.changelog.block_marker, "### Pull Requests");
        assert_eq!(config.changelog.reference_pattern, r"#{key}-\d+");
        assert_eq!(config.changelog.type_markers, TypeMarkers::default());
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_deserialize_missing_jira_fails() {
        let toml = r#"
[changelog]
input = "CHANGES.md"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_custom_changelog_conventions() {
        let toml = r###"
[jira]
host = "jira.example.com"
username = "bot"
password = "token"
project_key = "APP"

[changelog]
output = "RELEASE-NOTES.md"
block_marker = "## Merged pull requests"
reference_pattern = '\\#{key}-\d+'

[changelog.type_markers]
feature = ["feat"]
"###;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.changelog.output, PathBuf::from("RELEASE-NOTES.md"));
        assert_eq!(config.changelog.block_marker, "## Merged pull requests");
        assert_eq!(config.changelog.reference_pattern, r"\\#{key}-\d+");
        assert_eq!(config.changelog.type_markers.feature, vec!["feat"]);
        // Unspecified categories keep their defaults
        assert_eq!(config.changelog.type_markers.fix, vec!["bugfix", "fix"]);
    }

    #[test]
    fn test_deserialize_numeric_credentials() {
        let toml = r#"
[jira]
host = "jira.example.com"
username = 42
password = 123456
project_key = "APP"
api_version = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.jira.username, "42");
        assert_eq!(config.jira.password, "123456");
        assert_eq!(config.jira.api_version, "3");
    }

    #[test]
    fn test_rest_base_url() {
        let mut jira = jira_config();
        assert_eq!(jira.rest_base_url(), "https://acme.atlassian.net");

        jira.base_url = Some("http://127.0.0.1:9999/".to_string());
        assert_eq!(jira.rest_base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_sanitized_config_hides_password() {
        let config = Config {
            jira: jira_config(),
            changelog: ChangelogConfig::default(),
            metrics: MetricsConfig::default(),
        };
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.jira.password_configured);
        assert_eq!(sanitized.jira.rest_base_url, "https://acme.atlassian.net");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-token"));
    }
}
