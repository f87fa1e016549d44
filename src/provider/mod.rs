//! Provider adapters and the HTTP transport they run over.
//!
//! The harness never knows how a provider wants to be called. It asks a
//! [`ProviderAdapter`] to describe the request for a target URL, hands that description to a
//! [`Transport`], and asks the adapter again whether the response counts as success.
//!
//! - [`gateway`] - forward-proxy providers (target fetched through the proxy)
//! - [`unlocker`] - unlocker APIs (target wrapped in a JSON payload)

mod gateway;
mod unlocker;

pub use gateway::ProxyGateway;
pub use unlocker::UnlockerApi;

use crate::config::ProviderConfig;
use crate::error::{FetchError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Provider-neutral description of one outgoing request
#[derive(Clone, Debug)]
pub struct RequestSpec {
    /// HTTP method
    pub method: reqwest::Method,
    /// Request URL (the target itself, or the provider's API endpoint)
    pub url: String,
    /// Request headers, sent in order
    pub headers: Vec<(String, String)>,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
    /// Extra context for diagnostic lines (e.g. which upstream proxy was selected)
    pub context: Option<String>,
}

impl RequestSpec {
    /// A bare GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            context: None,
        }
    }

    /// A POST request carrying a JSON body
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            context: None,
        }
    }
}

/// A fully-read response
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

/// Forward proxy the transport must route through
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy URL
    pub url: String,
    /// Basic-auth credentials, if any
    pub credentials: Option<(String, String)>,
}

/// Everything provider-specific: request shape, credentials, success semantics
pub trait ProviderAdapter: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Describe the request that fetches `url` through this provider
    fn build_request(&self, url: &str) -> RequestSpec;

    /// Whether the provider reported success (default: exactly HTTP 200)
    fn is_success_status(&self, response: &RawResponse) -> bool {
        response.status == 200
    }

    /// Human-readable detail for a non-success response, bounded to `max_chars`
    fn extract_error_detail(&self, response: &RawResponse, max_chars: usize) -> String {
        crate::utils::body_excerpt(&response.body, max_chars)
    }

    /// Forward proxy the transport should use for every request
    fn transport_proxy(&self) -> Option<ProxySettings> {
        None
    }

    /// Whether the transport should accept invalid TLS certificates
    fn accept_invalid_certs(&self) -> bool {
        false
    }
}

/// Sends a [`RequestSpec`] and reads the whole response.
///
/// Abstracted so the harness can be exercised without a network.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send the request; any transport-level fault is returned as a [`FetchError`]
    async fn send(&self, request: RequestSpec) -> std::result::Result<RawResponse, FetchError>;
}

/// Production [`Transport`] backed by a reqwest client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client honoring the adapter's proxy and TLS policy
    pub fn for_adapter(adapter: &dyn ProviderAdapter, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(adapter.accept_invalid_certs());

        if let Some(proxy) = adapter.transport_proxy() {
            let mut p = reqwest::Proxy::all(&proxy.url)?;
            if let Some((user, pass)) = &proxy.credentials {
                p = p.basic_auth(user, pass);
            }
            builder = builder.proxy(p);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestSpec) -> std::result::Result<RawResponse, FetchError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(FetchError::from_reqwest)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Build the adapter described by the configuration
pub fn build_adapter(config: &ProviderConfig) -> Result<Arc<dyn ProviderAdapter>> {
    let name = config.name().to_string();
    match config {
        ProviderConfig::ProxyGateway(c) => Ok(Arc::new(ProxyGateway::from_config(name, c)?)),
        ProviderConfig::UnlockerApi(c) => Ok(Arc::new(UnlockerApi::from_config(name, c)?)),
    }
}

/// Resolve a secret given inline or through an environment variable
pub(crate) fn resolve_secret(
    inline: Option<&String>,
    env_var: Option<&String>,
    key: &str,
) -> Result<Option<String>> {
    if let Some(value) = inline {
        return Ok(Some(value.clone()));
    }
    match env_var {
        Some(var) => std::env::var(var).map(Some).map_err(|_| {
            crate::error::Error::config(key, format!("environment variable {var} is not set"))
        }),
        None => Ok(None),
    }
}
