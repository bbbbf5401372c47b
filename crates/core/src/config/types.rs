use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub drafting: DraftingConfig,
    #[serde(default)]
    pub tracker: Option<TrackerConfig>,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// OpenMetadata catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// OpenMetadata base URL (e.g., "https://openmetadata.example.com")
    pub url: String,
    /// JWT bot token
    pub token: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Search index to query
    #[serde(default = "default_search_index")]
    pub search_index: String,
    /// Maximum hits requested per search
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_timeout() -> u32 {
    30
}

fn default_search_index() -> String {
    "table_search_index".to_string()
}

fn default_page_size() -> u32 {
    20
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Anthropic Claude API.
    Anthropic,
    /// OpenAI API or any OpenAI-compatible endpoint.
    OpenAi,
    /// Local Ollama instance.
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::OpenAi => "open_ai",
            LlmProvider::Ollama => "ollama",
        }
    }
}

/// LLM client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider.
    pub provider: LlmProvider,
    /// Model name/identifier.
    pub model: String,
    /// API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Maximum tokens for completions.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    1024
}

/// How the resolver decides whether a candidate matches the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Token comparison of request and asset names. No LLM, works offline.
    #[default]
    Name,
    /// Ask the LLM to judge the candidates.
    Llm,
    /// Try the name heuristic, ask the LLM only when it finds nothing.
    NameThenLlm,
}

impl MatchStrategy {
    /// Returns true if this strategy requires LLM to be configured.
    pub fn requires_llm(&self) -> bool {
        !matches!(self, MatchStrategy::Name)
    }
}

/// Matcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default)]
    pub strategy: MatchStrategy,
    /// Maximum candidates shown to the LLM matcher.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_max_candidates() -> usize {
    20
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            max_candidates: default_max_candidates(),
        }
    }
}

/// SQL drafting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftingConfig {
    /// Draft a query when no exact match exists. Needs `[llm]`.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum assets described in the drafting prompt.
    #[serde(default = "default_max_assets")]
    pub max_assets: usize,
    /// Maximum columns listed per asset in the drafting prompt.
    #[serde(default = "default_max_columns")]
    pub max_columns: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_assets() -> usize {
    5
}

fn default_max_columns() -> usize {
    10
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_assets: default_max_assets(),
            max_columns: default_max_columns(),
        }
    }
}

/// Jira tracker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// Jira base URL (e.g., "https://company.atlassian.net")
    pub url: String,
    /// Account email used for basic auth
    pub email: String,
    /// Jira API token
    pub api_token: String,
    /// Project key tickets are filed under (e.g., "DATA")
    pub project_key: String,
    /// Issue type name
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
    /// Labels added to every ticket
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Priority name, omitted from the payload when unset
    #[serde(default = "default_priority")]
    pub priority: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_issue_type() -> String {
    "Task".to_string()
}

fn default_labels() -> Vec<String> {
    vec!["data-product".to_string(), "auto-generated".to_string()]
}

fn default_priority() -> Option<String> {
    Some("Medium".to_string())
}

/// Resolver limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Requests longer than this are truncated.
    #[serde(default = "default_max_request_chars")]
    pub max_request_chars: usize,
    /// Maximum related assets carried by an unmatched outcome.
    #[serde(default = "default_max_related")]
    pub max_related: usize,
}

fn default_max_request_chars() -> usize {
    2000
}

fn default_max_related() -> usize {
    10
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_request_chars: default_max_request_chars(),
            max_related: default_max_related(),
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<SanitizedCatalogConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<SanitizedLlmConfig>,
    pub matcher: MatcherConfig,
    pub drafting: DraftingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<SanitizedTrackerConfig>,
    pub resolver: ResolverConfig,
}

/// Sanitized catalog config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub url: String,
    pub token_configured: bool,
    pub timeout_secs: u32,
    pub search_index: String,
    pub page_size: u32,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub timeout_secs: u32,
    pub max_tokens: u32,
}

/// Sanitized tracker config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTrackerConfig {
    pub url: String,
    pub email: String,
    pub api_token_configured: bool,
    pub project_key: String,
    pub issue_type: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            catalog: config.catalog.as_ref().map(|c| SanitizedCatalogConfig {
                url: c.url.clone(),
                token_configured: !c.token.is_empty(),
                timeout_secs: c.timeout_secs,
                search_index: c.search_index.clone(),
                page_size: c.page_size,
            }),
            llm: config.llm.as_ref().map(|l| SanitizedLlmConfig {
                provider: l.provider.as_str().to_string(),
                model: l.model.clone(),
                api_key_configured: l.api_key.as_ref().is_some_and(|k| !k.is_empty()),
                api_base: l.api_base.clone(),
                timeout_secs: l.timeout_secs,
                max_tokens: l.max_tokens,
            }),
            matcher: config.matcher.clone(),
            drafting: config.drafting.clone(),
            tracker: config.tracker.as_ref().map(|t| SanitizedTrackerConfig {
                url: t.url.clone(),
                email: t.email.clone(),
                api_token_configured: !t.api_token.is_empty(),
                project_key: t.project_key.clone(),
                issue_type: t.issue_type.clone(),
            }),
            resolver: config.resolver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.catalog.is_none());
        assert!(config.llm.is_none());
        assert!(config.tracker.is_none());
        assert_eq!(config.matcher.strategy, MatchStrategy::Name);
        assert!(config.drafting.enabled);
        assert_eq!(config.resolver.max_request_chars, 2000);
        assert_eq!(config.resolver.max_related, 10);
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[catalog]
url = "https://openmetadata.example.com"
token = "jwt-token"

[llm]
provider = "open_ai"
model = "gpt-4o-mini"
api_key = "sk-test"

[matcher]
strategy = "name_then_llm"

[drafting]
max_assets = 3

[tracker]
url = "https://company.atlassian.net"
email = "bot@company.com"
api_token = "jira-token"
project_key = "DATA"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);

        let catalog = config.catalog.as_ref().unwrap();
        assert_eq!(catalog.timeout_secs, 30);
        assert_eq!(catalog.search_index, "table_search_index");
        assert_eq!(catalog.page_size, 20);

        let llm = config.llm.as_ref().unwrap();
        assert_eq!(llm.provider, LlmProvider::OpenAi);
        assert_eq!(llm.max_tokens, 1024);

        assert_eq!(config.matcher.strategy, MatchStrategy::NameThenLlm);
        assert_eq!(config.drafting.max_assets, 3);
        assert_eq!(config.drafting.max_columns, 10);

        let tracker = config.tracker.as_ref().unwrap();
        assert_eq!(tracker.issue_type, "Task");
        assert_eq!(tracker.labels, vec!["data-product", "auto-generated"]);
        assert_eq!(tracker.priority.as_deref(), Some("Medium"));
    }

    #[test]
    fn test_strategy_requires_llm() {
        assert!(!MatchStrategy::Name.requires_llm());
        assert!(MatchStrategy::Llm.requires_llm());
        assert!(MatchStrategy::NameThenLlm.requires_llm());
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let toml = r#"
[catalog]
url = "https://om.example.com"
token = "super-secret"

[llm]
provider = "anthropic"
model = "claude-3-haiku-20240307"
api_key = "sk-ant-secret"

[tracker]
url = "https://company.atlassian.net"
email = "bot@company.com"
api_token = "jira-secret"
project_key = "DATA"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(!json.contains("sk-ant-secret"));
        assert!(!json.contains("jira-secret"));

        assert!(sanitized.catalog.as_ref().unwrap().token_configured);
        assert!(sanitized.llm.as_ref().unwrap().api_key_configured);
        assert_eq!(sanitized.llm.as_ref().unwrap().provider, "anthropic");
        assert!(sanitized.tracker.as_ref().unwrap().api_token_configured);
    }

    #[test]
    fn test_sanitized_config_without_sections() {
        let sanitized = SanitizedConfig::from(&Config::default());
        assert!(sanitized.catalog.is_none());
        assert!(sanitized.llm.is_none());
        assert!(sanitized.tracker.is_none());
        assert_eq!(sanitized.server.port, 8080);
    }
}
