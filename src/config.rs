use std::time::Duration;

use thiserror::Error;

pub const URL_ENV: &str = "ENTITY_CONSOLE_URL";
pub const API_KEY_ENV: &str = "ENTITY_CONSOLE_API_KEY";
pub const DEFAULT_REST_PATH: &str = "/rest/v1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("URL must start with 'http://' or 'https://': {0}")]
    UnsupportedScheme(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("{0}")]
    Invalid(String),
}

/// Where the REST store lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Scheme and authority, e.g. `https://db.example.com`
    pub base_url: String,

    /// Path prefix of the REST endpoint
    pub rest_path: String,

    /// Sent as `apikey` and as the bearer token
    pub api_key: Option<String>,

    /// Database schema selected through the profile headers
    pub schema: Option<String>,

    /// Per-request timeout; `None` waits for the server
    pub timeout: Option<Duration>,

    /// Upper bound applied to reads that carry no limit of their own
    pub max_rows: Option<usize>,
}

impl StoreConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            rest_path: DEFAULT_REST_PATH.to_string(),
            api_key: None,
            schema: None,
            timeout: None,
            max_rows: None,
        }
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn rest_path(mut self, path: &str) -> Self {
        self.rest_path = normalize_path(path);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_rows(mut self, max: usize) -> Self {
        self.max_rows = Some(max);
        self
    }

    /// Parses `https://[api_key@]host[:port][/rest/path]`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = StoreConfig::from_url("https://anon-key@db.example.com/rest/v1")?;
    /// ```
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let (scheme, rest) = url
            .split_once("://")
            .filter(|(scheme, _)| matches!(*scheme, "http" | "https"))
            .ok_or_else(|| ConfigError::UnsupportedScheme(url.to_string()))?;

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let (api_key, host) = match authority.rsplit_once('@') {
            Some((key, host)) => (Some(key), host),
            None => (None, authority),
        };
        if host.is_empty() {
            return Err(ConfigError::MissingHost(url.to_string()));
        }

        let mut config = Self::new(&format!("{}://{}", scheme, host));
        if !path.trim_matches('/').is_empty() {
            config = config.rest_path(path);
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            config = config.api_key(key);
        }
        Ok(config)
    }

    /// Reads `ENTITY_CONSOLE_URL` and, when set, `ENTITY_CONSOLE_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(URL_ENV).map_err(|_| ConfigError::MissingEnv(URL_ENV))?;
        let mut config = Self::from_url(&url)?;
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config = config.api_key(&key);
        }
        Ok(config)
    }

    /// Endpoint of one collection.
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}{}/{}", self.base_url, self.rest_path, collection)
    }

    /// Connection string with the key masked.
    pub fn to_url(&self) -> String {
        match self.api_key {
            Some(_) => {
                let (scheme, host) = self
                    .base_url
                    .split_once("://")
                    .unwrap_or(("https", self.base_url.as_str()));
                format!("{}://***@{}{}", scheme, host, self.rest_path)
            }
            None => format!("{}{}", self.base_url, self.rest_path),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::Invalid("timeout must be > 0".to_string()));
        }
        if self.max_rows == Some(0) {
            return Err(ConfigError::Invalid("max_rows must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Settings of the console as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// `None` runs against the seeded in-memory store.
    pub store: Option<StoreConfig>,
}

impl ConsoleConfig {
    pub fn demo() -> Self {
        Self { store: None }
    }

    pub fn remote(store: StoreConfig) -> Self {
        Self {
            store: Some(store),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.store.is_none()
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::demo()
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = StoreConfig::new("https://db.example.com/")
            .api_key("secret")
            .schema("styling")
            .max_rows(500);

        assert_eq!(config.base_url, "https://db.example.com");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.schema.as_deref(), Some("styling"));
        assert_eq!(
            config.collection_url("vendors"),
            "https://db.example.com/rest/v1/vendors"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_is_opt_in() {
        let config = StoreConfig::new("https://db.example.com");
        assert_eq!(config.timeout, None);
        assert!(config.validate().is_ok());

        let bounded = config.clone().timeout(Duration::from_secs(5));
        assert_eq!(bounded.timeout, Some(Duration::from_secs(5)));
        assert!(config.timeout(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_from_url() {
        let config = StoreConfig::from_url("https://anon@db.example.com:8443/api/").unwrap();
        assert_eq!(config.base_url, "https://db.example.com:8443");
        assert_eq!(config.rest_path, "/api");
        assert_eq!(config.api_key.as_deref(), Some("anon"));
        assert_eq!(config.to_url(), "https://***@db.example.com:8443/api");
    }

    #[test]
    fn test_from_url_default_path() {
        let config = StoreConfig::from_url("http://localhost:3000").unwrap();
        assert_eq!(config.rest_path, DEFAULT_REST_PATH);
        assert_eq!(config.api_key, None);
        assert_eq!(config.to_url(), "http://localhost:3000/rest/v1");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            StoreConfig::from_url("postgres://x@y/z"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            StoreConfig::from_url("https://key@/rest"),
            Err(ConfigError::MissingHost(_))
        ));
        assert!(StoreConfig::new("http://h").max_rows(0).validate().is_err());
    }

    #[test]
    fn test_console_defaults_to_demo() {
        let config = ConsoleConfig::default();
        assert!(config.is_demo());
        assert!(!ConsoleConfig::remote(StoreConfig::new("http://h")).is_demo());
    }
}
