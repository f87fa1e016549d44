//! Unlocker API providers: the target URL travels inside a JSON payload.

use super::{ProviderAdapter, RawResponse, RequestSpec, resolve_secret};
use crate::config::UnlockerApiConfig;
use crate::error::Result;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

/// Posts a payload template with the target URL filled in to the provider's API endpoint
#[derive(Debug, Clone)]
pub struct UnlockerApi {
    name: String,
    endpoint: String,
    payload: Value,
    url_pointer: String,
    headers: Vec<(String, String)>,
    proxy_pool: Vec<String>,
    proxy_pointer: Option<String>,
}

impl UnlockerApi {
    /// Build from configuration, resolving the auth value from the environment if needed
    pub fn from_config(name: String, config: &UnlockerApiConfig) -> Result<Self> {
        let mut headers: Vec<(String, String)> = config
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if let Some(auth_header) = &config.auth_header {
            let value = resolve_secret(
                config.auth_value.as_ref(),
                config.auth_env.as_ref(),
                "provider.auth_env",
            )?;
            if let Some(value) = value {
                headers.push((auth_header.clone(), value));
            }
        }

        Ok(Self {
            name,
            endpoint: config.endpoint.clone(),
            payload: config.payload.clone(),
            url_pointer: config.url_pointer.clone(),
            headers,
            proxy_pool: config.proxy_pool.clone(),
            proxy_pointer: config.proxy_pointer.clone(),
        })
    }

    /// Pick an upstream proxy uniformly at random (stateless)
    fn select_proxy(&self) -> Option<&String> {
        self.proxy_pool.choose(&mut rand::thread_rng())
    }
}

impl ProviderAdapter for UnlockerApi {
    fn name(&self) -> &str {
        &self.name
    }

    fn build_request(&self, url: &str) -> RequestSpec {
        let mut payload = self.payload.clone();
        set_pointer(&mut payload, &self.url_pointer, Value::String(url.to_string()));

        let mut context = None;
        if let (Some(pointer), Some(proxy)) = (&self.proxy_pointer, self.select_proxy()) {
            set_pointer(&mut payload, pointer, Value::String(proxy.clone()));
            context = Some(format!("proxy {}", proxy_display(proxy)));
        }

        let mut request = RequestSpec::post_json(&self.endpoint, payload);
        request.headers = self.headers.clone();
        request.context = context;
        request
    }

    /// Unlocker APIs usually answer errors with a JSON envelope; prefer its message.
    fn extract_error_detail(&self, response: &RawResponse, max_chars: usize) -> String {
        let message = serde_json::from_slice::<Value>(&response.body)
            .ok()
            .and_then(|v| {
                ["message", "error", "msg"]
                    .iter()
                    .find_map(|key| v.get(*key).map(envelope_text))
            });

        match message {
            Some(text) => crate::utils::excerpt(&text, max_chars).to_string(),
            None => crate::utils::body_excerpt(&response.body, max_chars),
        }
    }
}

fn envelope_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Host part of a `user:pass@host:port` proxy string; never log credentials
fn proxy_display(proxy: &str) -> &str {
    proxy.rsplit('@').next().unwrap_or(proxy)
}

/// Write `value` at a JSON pointer, creating intermediate objects as needed.
///
/// Only object keys are supported; a non-object on the path is replaced by an object.
fn set_pointer(root: &mut Value, pointer: &str, value: Value) {
    let tokens: Vec<String> = pointer
        .split('/')
        .skip(1)
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect();

    let Some((last, parents)) = tokens.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for token in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.clone(), value);
    }
}
