//! Benchmark harness split into focused submodules.
//!
//! The [`Benchmark`] struct owns one provider adapter, one transport and the event bus;
//! its methods are organized by stage:
//! - [`runner`] - dataset iteration and report writing
//! - [`sweep`] - the concurrency ladder with its per-level barrier
//! - [`pool`] - bounded, panic-isolated execution of one level
//! - [`worker`] - a single attempt: request, classify, persist, record
//! - [`context`] - state shared by every worker of a sweep

mod context;
mod pool;
mod runner;
mod sweep;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::provider::{HttpTransport, ProviderAdapter, Transport, build_adapter};
use crate::types::Event;
use crate::utils::sanitize_filename;

/// Capacity of the event bus; slow subscribers beyond this lag and miss events
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Benchmark instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Benchmark {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// The provider under test
    pub(crate) adapter: Arc<dyn ProviderAdapter>,
    /// HTTP client shared by every attempt of every level
    pub(crate) transport: Arc<dyn Transport>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl Benchmark {
    /// Create a benchmark from configuration
    ///
    /// Validates the configuration, builds the provider adapter it names and an HTTP
    /// transport honoring the adapter's proxy and TLS policy.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let adapter = build_adapter(&config.provider)?;
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::for_adapter(
            adapter.as_ref(),
            config.sweep.request_timeout,
        )?);

        tracing::info!(
            provider = adapter.name(),
            ladder = ?config.sweep.ladder,
            datasets = config.datasets.len(),
            "Benchmark initialized"
        );

        Ok(Self::with_parts(config, adapter, transport))
    }

    /// Create a benchmark from explicit parts
    ///
    /// Useful for custom providers or transports that `ProviderConfig` cannot describe.
    /// The configuration is taken as-is; call [`Config::validate`] first if it came from
    /// an untrusted source.
    pub fn with_parts(
        config: Config,
        adapter: Arc<dyn ProviderAdapter>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            adapter,
            transport,
            event_tx,
        }
    }

    /// Subscribe to benchmark events
    ///
    /// Every subscriber receives every event sent after it subscribed.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this benchmark runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The provider under test
    pub fn provider_name(&self) -> &str {
        self.adapter.name()
    }

    /// Run root for the provider under test: `<output_dir>/<sanitized adapter name>`
    ///
    /// Named after the adapter that actually runs, so custom adapters passed to
    /// [`Benchmark::with_parts`] get their own directory.
    pub fn run_root(&self) -> PathBuf {
        self.config
            .output_dir
            .join(sanitize_filename(self.adapter.name()))
    }
}
