//! Search client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::parser::{expand_path, QUERY_PLACEHOLDER};
use crate::{Result, SearchError};

/// Host queried when none is configured (a local YaCy peer).
pub const DEFAULT_HOST: &str = "localhost:8090";

/// Configuration consumed by every search invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Host and optional port of the search peer, without scheme.
    #[serde(default = "default_host")]
    pub host: String,
    /// Path template overriding the parser's own; must contain `{query}`.
    #[serde(default)]
    pub search_path: Option<String>,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout: u64,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_connect_timeout() -> u64 {
    15
}

fn default_read_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("yacy-search/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            search_path: None,
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl SearchConfig {
    /// Creates a configuration for `host` with default timeouts.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|e| SearchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the search path template.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Sets the connect timeout in seconds.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout = secs;
        self
    }

    /// Sets the read timeout in seconds.
    pub fn with_read_timeout(mut self, secs: u64) -> Self {
        self.read_timeout = secs;
        self
    }

    /// Sets the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<()> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(SearchError::Config("host must not be empty".into()));
        }
        if host.contains("://") || host.contains('/') {
            return Err(SearchError::Config(
                "host must not contain a scheme or path".into(),
            ));
        }
        if self.connect_timeout == 0 {
            return Err(SearchError::Config(
                "connect_timeout must be greater than 0".into(),
            ));
        }
        if self.read_timeout == 0 {
            return Err(SearchError::Config(
                "read_timeout must be greater than 0".into(),
            ));
        }
        if let Some(path) = &self.search_path {
            if !path.contains(QUERY_PLACEHOLDER) {
                return Err(SearchError::Config(format!(
                    "search_path must contain {QUERY_PLACEHOLDER}"
                )));
            }
        }
        Ok(())
    }

    /// Builds the request URL for `terms`, using `default_path` unless the
    /// configuration overrides it.
    pub fn search_url(&self, default_path: &str, terms: &str) -> Result<Url> {
        let template = self.search_path.as_deref().unwrap_or(default_path);
        let path = expand_path(template, terms);
        let url = Url::parse(&format!(
            "http://{}/{}",
            self.host.trim(),
            path.trim_start_matches('/')
        ))?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::XmlResultParser;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = SearchConfig::default();
        assert_eq!(config.host, "localhost:8090");
        assert!(config.search_path.is_none());
        assert_eq!(config.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.read_timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("yacy-search/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = SearchConfig::new("peer.example:8090")
            .with_search_path("yacysearch.rss?query={query}&maximumRecords=50")
            .with_connect_timeout(3)
            .with_read_timeout(4)
            .with_user_agent("test-agent");
        assert_eq!(config.host, "peer.example:8090");
        assert_eq!(config.connect_timeout, 3);
        assert_eq!(config.read_timeout, 4);
        assert_eq!(config.user_agent, "test-agent");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_url_default_path() {
        let config = SearchConfig::new("localhost:8090");
        let url = config
            .search_url(XmlResultParser::SEARCH_PATH, "hello+world")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8090/yacysearch.rss?query=hello+world"
        );
    }

    #[test]
    fn test_search_url_override_path() {
        let config = SearchConfig::new("peer.example").with_search_path("/search.rss?q={query}");
        let url = config.search_url(XmlResultParser::SEARCH_PATH, "rust").unwrap();
        assert_eq!(url.as_str(), "http://peer.example/search.rss?q=rust");
    }

    #[test]
    fn test_search_url_invalid_host() {
        let config = SearchConfig::new("bad host:99999");
        let err = config.search_url(XmlResultParser::SEARCH_PATH, "x").unwrap_err();
        assert!(matches!(err, SearchError::InvalidUrl(_)));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = SearchConfig::new("  ");
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_scheme() {
        let config = SearchConfig::new("http://localhost:8090");
        assert!(matches!(config.validate(), Err(SearchError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = SearchConfig::default().with_connect_timeout(0);
        assert!(config.validate().is_err());
        let config = SearchConfig::default().with_read_timeout(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_path_without_placeholder() {
        let config = SearchConfig::default().with_search_path("yacysearch.rss");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let json = r#"{"host":"peer.example:8090"}"#;
        let config: SearchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.host, "peer.example:8090");
        assert_eq!(config.connect_timeout, 15); // default
        assert_eq!(config.read_timeout, 10); // default
        assert!(config.search_path.is_none());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"host":"search.example:8080","read_timeout":30}}"#).unwrap();
        let config = SearchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "search.example:8080");
        assert_eq!(config.read_timeout, 30);
        assert_eq!(config.connect_timeout, 15);
    }

    #[test]
    fn test_config_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = SearchConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn test_config_from_missing_file() {
        let err = SearchConfig::from_file("/nonexistent/yacy-search.json").unwrap_err();
        assert!(matches!(err, SearchError::Io(_)));
    }
}
