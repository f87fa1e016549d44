//! Configuration types for unlock-bench

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

/// Sweep behavior configuration (ladder, classification threshold, timeouts)
///
/// Groups settings that shape how each dataset is swept.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Concurrency ladder, swept in order (default: [1, 5, 10, 20])
    ///
    /// Each level is also the number of attempts made per target at that level.
    /// Must be non-empty, strictly increasing and free of zeros.
    #[serde(default = "default_ladder")]
    pub ladder: Vec<usize>,

    /// Minimum artifact size in bytes for a 200 response to count as unlocked (default: 10240)
    ///
    /// Smaller bodies are treated as soft blocks (challenge or stub pages served with a
    /// success status).
    #[serde(default = "default_min_success_bytes")]
    pub min_success_bytes: u64,

    /// Per-request timeout applied by the HTTP transport (default: 60s)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Keep soft-block bodies on disk for inspection (default: false)
    ///
    /// The report never names a soft-block artifact either way.
    #[serde(default)]
    pub keep_soft_block_artifacts: bool,

    /// Maximum characters of raw response/exception text written per diagnostic line (default: 500)
    #[serde(default = "default_log_excerpt_chars")]
    pub log_excerpt_chars: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            ladder: default_ladder(),
            min_success_bytes: default_min_success_bytes(),
            request_timeout: default_request_timeout(),
            keep_soft_block_artifacts: false,
            log_excerpt_chars: default_log_excerpt_chars(),
        }
    }
}

/// Target list column names
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    /// Column holding the target URL (default: "url")
    #[serde(default = "default_url_column")]
    pub url_column: String,

    /// Optional column holding the target category (default: "category")
    #[serde(default = "default_category_column")]
    pub category_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            url_column: default_url_column(),
            category_column: default_category_column(),
        }
    }
}

/// Main configuration for a benchmark run
///
/// Fields are organized into logical sub-configs:
/// - [`sweep`](SweepConfig) - ladder, threshold, timeouts
/// - [`input`](InputConfig) - target list column names
/// - [`provider`](ProviderConfig) - which provider adapter to drive and how
///
/// Sub-configs are flattened, so a config file is a single flat JSON object with a
/// nested `provider` section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Target lists to benchmark, one sweep and one report each
    #[serde(default)]
    pub datasets: Vec<PathBuf>,

    /// Parent of the run root (default: "./results")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Sweep settings
    #[serde(flatten)]
    pub sweep: SweepConfig,

    /// Target list settings
    #[serde(flatten)]
    pub input: InputConfig,

    /// Provider adapter settings
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            output_dir: default_output_dir(),
            sweep: SweepConfig::default(),
            input: InputConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Check the configuration for values the harness cannot work with
    pub fn validate(&self) -> Result<()> {
        validate_ladder(&self.sweep.ladder)?;

        if self.sweep.request_timeout.is_zero() {
            return Err(Error::config(
                "request_timeout",
                "request timeout must be at least one second",
            ));
        }
        if self.sweep.log_excerpt_chars == 0 {
            return Err(Error::config(
                "log_excerpt_chars",
                "excerpt length must be greater than zero",
            ));
        }
        if self.input.url_column.trim().is_empty() {
            return Err(Error::config("url_column", "URL column name is empty"));
        }

        self.provider.validate()
    }
}

/// Validate a concurrency ladder: non-empty, positive, strictly increasing
pub fn validate_ladder(ladder: &[usize]) -> Result<()> {
    if ladder.is_empty() {
        return Err(Error::config("ladder", "ladder must contain at least one level"));
    }
    if ladder.contains(&0) {
        return Err(Error::config("ladder", "concurrency levels must be positive"));
    }
    if let Some(pair) = ladder.windows(2).find(|w| w[0] >= w[1]) {
        return Err(Error::config(
            "ladder",
            format!(
                "ladder must be strictly increasing ({} is followed by {})",
                pair[0], pair[1]
            ),
        ));
    }
    Ok(())
}

/// Which provider to benchmark
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Fetch targets directly through an HTTP forward proxy
    ProxyGateway(ProxyGatewayConfig),
    /// Wrap targets in a JSON payload posted to an unlocker API
    UnlockerApi(UnlockerApiConfig),
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::ProxyGateway(ProxyGatewayConfig::default())
    }
}

impl ProviderConfig {
    /// Provider name, used for the run root directory
    pub fn name(&self) -> &str {
        match self {
            ProviderConfig::ProxyGateway(c) => c.name.as_deref().unwrap_or("proxy_gateway"),
            ProviderConfig::UnlockerApi(c) => c.name.as_deref().unwrap_or("unlocker_api"),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::ProxyGateway(c) => {
                if let Some(proxy) = &c.proxy_url {
                    url::Url::parse(proxy).map_err(|e| {
                        Error::config("provider.proxy_url", format!("invalid proxy URL: {e}"))
                    })?;
                }
                Ok(())
            }
            ProviderConfig::UnlockerApi(c) => {
                url::Url::parse(&c.endpoint).map_err(|e| {
                    Error::config("provider.endpoint", format!("invalid endpoint URL: {e}"))
                })?;
                if !c.url_pointer.starts_with('/') {
                    return Err(Error::config(
                        "provider.url_pointer",
                        "must be a JSON pointer starting with '/'",
                    ));
                }
                if !c.payload.is_object() {
                    return Err(Error::config(
                        "provider.payload",
                        "payload template must be a JSON object",
                    ));
                }
                if !c.proxy_pool.is_empty() {
                    match &c.proxy_pointer {
                        Some(p) if p.starts_with('/') => {}
                        _ => {
                            return Err(Error::config(
                                "provider.proxy_pointer",
                                "a proxy pool needs a JSON pointer for the selected proxy",
                            ));
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

/// Forward-proxy provider configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyGatewayConfig {
    /// Provider name (default: "proxy_gateway")
    #[serde(default)]
    pub name: Option<String>,

    /// Proxy URL, e.g. "http://unblock.example.net:17611" (None = direct connection)
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Proxy username
    #[serde(default)]
    pub username: Option<String>,

    /// Proxy password
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the proxy password (used when `password` is unset)
    #[serde(default)]
    pub password_env: Option<String>,

    /// Headers sent with every target request (default: a desktop browser header set)
    #[serde(default = "default_browser_headers")]
    pub headers: BTreeMap<String, String>,

    /// Accept invalid TLS certificates, as gateway proxies often re-sign traffic (default: true)
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
}

impl Default for ProxyGatewayConfig {
    fn default() -> Self {
        Self {
            name: None,
            proxy_url: None,
            username: None,
            password: None,
            password_env: None,
            headers: default_browser_headers(),
            accept_invalid_certs: true,
        }
    }
}

/// Unlocker API provider configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnlockerApiConfig {
    /// Provider name (default: "unlocker_api")
    #[serde(default)]
    pub name: Option<String>,

    /// API endpoint receiving the payload
    pub endpoint: String,

    /// Payload template; the target URL is written at `url_pointer`
    #[serde(default = "default_payload")]
    pub payload: serde_json::Value,

    /// JSON pointer for the target URL inside the payload (default: "/url")
    #[serde(default = "default_url_pointer")]
    pub url_pointer: String,

    /// Extra headers sent with every API request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Name of the authentication header (e.g. "Authorization", "x-api-token")
    #[serde(default)]
    pub auth_header: Option<String>,

    /// Authentication header value
    #[serde(default)]
    pub auth_value: Option<String>,

    /// Environment variable holding the authentication value (used when `auth_value` is unset)
    #[serde(default)]
    pub auth_env: Option<String>,

    /// Upstream proxies; one is chosen at random per request and written at `proxy_pointer`
    #[serde(default)]
    pub proxy_pool: Vec<String>,

    /// JSON pointer for the selected upstream proxy inside the payload
    #[serde(default)]
    pub proxy_pointer: Option<String>,
}

fn default_ladder() -> Vec<usize> {
    vec![1, 5, 10, 20]
}

fn default_min_success_bytes() -> u64 {
    10 * 1024
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_log_excerpt_chars() -> usize {
    500
}

fn default_url_column() -> String {
    "url".to_string()
}

fn default_category_column() -> String {
    "category".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./results")
}

fn default_true() -> bool {
    true
}

fn default_payload() -> serde_json::Value {
    serde_json::json!({})
}

fn default_url_pointer() -> String {
    "/url".to_string()
}

fn default_browser_headers() -> BTreeMap<String, String> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Cache-Control", "no-cache"),
        ("Pragma", "no-cache"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:124.0) Gecko/20100101 Firefox/124.0",
        ),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.sweep.ladder, vec![1, 5, 10, 20]);
        assert_eq!(config.sweep.min_success_bytes, 10240);
        assert_eq!(config.sweep.request_timeout, Duration::from_secs(60));
        assert!(!config.sweep.keep_soft_block_artifacts);
        assert_eq!(config.input.url_column, "url");
        assert_eq!(config.output_dir, PathBuf::from("./results"));
        assert_eq!(config.provider.name(), "proxy_gateway");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn flat_fields_and_tagged_provider_parse() {
        let json = r#"{
            "datasets": ["url_walmart.csv"],
            "ladder": [1, 2],
            "min_success_bytes": 2048,
            "request_timeout": 15,
            "provider": {
                "kind": "unlocker_api",
                "name": "brightdata",
                "endpoint": "https://api.example.com/request",
                "payload": {"zone": "web_unlocker1", "format": "raw"},
                "auth_header": "Authorization",
                "auth_value": "Bearer abc"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.datasets, vec![PathBuf::from("url_walmart.csv")]);
        assert_eq!(config.sweep.ladder, vec![1, 2]);
        assert_eq!(config.sweep.min_success_bytes, 2048);
        assert_eq!(config.sweep.request_timeout, Duration::from_secs(15));
        assert_eq!(config.provider.name(), "brightdata");
        match &config.provider {
            ProviderConfig::UnlockerApi(api) => {
                assert_eq!(api.url_pointer, "/url");
                assert_eq!(api.payload["zone"], "web_unlocker1");
            }
            other => panic!("expected unlocker_api, got {other:?}"),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ladder_must_be_strictly_increasing() {
        assert!(validate_ladder(&[1, 5, 10, 20]).is_ok());
        assert!(validate_ladder(&[3]).is_ok());
        assert!(validate_ladder(&[]).is_err());
        assert!(validate_ladder(&[0, 1]).is_err());
        assert!(validate_ladder(&[1, 5, 5]).is_err());
        assert!(validate_ladder(&[10, 5]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.sweep = SweepConfig {
            request_timeout: Duration::ZERO,
            ..SweepConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "request_timeout"));
    }

    #[test]
    fn bad_proxy_url_is_rejected() {
        let config = Config {
            provider: ProviderConfig::ProxyGateway(ProxyGatewayConfig {
                proxy_url: Some("not a url".to_string()),
                ..ProxyGatewayConfig::default()
            }),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn proxy_pool_requires_pointer() {
        let json = r#"{
            "kind": "unlocker_api",
            "endpoint": "http://127.0.0.1/v1/web_unlock",
            "proxy_pool": ["user:pass@10.0.0.1:6666"]
        }"#;
        let provider: ProviderConfig = serde_json::from_str(json).unwrap();
        let config = Config {
            provider,
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("proxy"));
    }

    #[test]
    fn default_sweep_config_matches_serde_defaults() {
        let from_serde: SweepConfig = serde_json::from_str("{}").unwrap();
        let from_default = SweepConfig::default();

        assert_eq!(from_serde.ladder, from_default.ladder);
        assert_eq!(from_serde.min_success_bytes, from_default.min_success_bytes);
        assert_eq!(from_serde.request_timeout, from_default.request_timeout);
        assert_eq!(from_serde.log_excerpt_chars, from_default.log_excerpt_chars);
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, r#"{"ladder": [2, 4], "output_dir": "out"}"#).unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.sweep.ladder, vec![2, 4]);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
