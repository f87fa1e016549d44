//! Forward-proxy gateway providers.

use super::{ProviderAdapter, ProxySettings, RequestSpec, resolve_secret};
use crate::config::ProxyGatewayConfig;
use crate::error::Result;

/// Fetches the target URL itself, routed through the provider's proxy endpoint
#[derive(Debug, Clone)]
pub struct ProxyGateway {
    name: String,
    proxy: Option<ProxySettings>,
    headers: Vec<(String, String)>,
    accept_invalid_certs: bool,
}

impl ProxyGateway {
    /// Build from configuration, resolving the proxy password from the environment if needed
    pub fn from_config(name: String, config: &ProxyGatewayConfig) -> Result<Self> {
        let password = resolve_secret(
            config.password.as_ref(),
            config.password_env.as_ref(),
            "provider.password_env",
        )?;

        let proxy = config.proxy_url.as_ref().map(|url| ProxySettings {
            url: url.clone(),
            credentials: config
                .username
                .clone()
                .map(|user| (user, password.clone().unwrap_or_default())),
        });

        Ok(Self {
            name,
            proxy,
            headers: config
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            accept_invalid_certs: config.accept_invalid_certs,
        })
    }
}

impl ProviderAdapter for ProxyGateway {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_request(&self, url: &str) -> RequestSpec {
        let mut request = RequestSpec::get(url);
        request.headers = self.headers.clone();
        request
    }

    fn transport_proxy(&self) -> Option<ProxySettings> {
        self.proxy.clone()
    }

    fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }
}
