//! Shared test helpers: a scripted transport and a ready-made benchmark around it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::FetchError;
use crate::harness::Benchmark;
use crate::provider::{ProviderAdapter, RawResponse, RequestSpec, Transport};

/// What the mock transport does for a URL
#[derive(Clone, Debug)]
pub(crate) enum Scripted {
    /// Answer with this status and a body of `size` bytes
    Respond { status: u16, size: usize },
    /// Fail with a timeout fault
    Timeout,
    /// Panic inside the worker
    Panic,
}

/// Transport that answers from a per-URL script and tracks concurrency
pub(crate) struct MockTransport {
    script: HashMap<String, Scripted>,
    fallback: Scripted,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Every URL answers 200 with `size` bytes
    pub(crate) fn ok(size: usize) -> Self {
        Self {
            script: HashMap::new(),
            fallback: Scripted::Respond { status: 200, size },
            latency: Duration::from_millis(10),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Override the behavior for one URL
    pub(crate) fn with(mut self, url: &str, scripted: Scripted) -> Self {
        self.script.insert(url.to_string(), scripted);
        self
    }

    /// Simulated network latency per request
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Highest number of requests observed in flight at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Total number of requests sent
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requested URLs in the order they were sent
    pub(crate) fn requested(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RequestSpec) -> Result<RawResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(request.url.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.script.get(&request.url).unwrap_or(&self.fallback) {
            Scripted::Respond { status, size } => Ok(RawResponse {
                status: *status,
                body: vec![b'x'; *size],
            }),
            Scripted::Timeout => Err(FetchError::Timeout("operation timed out after 60s".into())),
            Scripted::Panic => panic!("scripted panic for {}", request.url),
        }
    }
}

/// Adapter that fetches the target directly
pub(crate) struct DirectAdapter;

impl ProviderAdapter for DirectAdapter {
    fn name(&self) -> &str {
        "mock provider"
    }

    fn build_request(&self, url: &str) -> RequestSpec {
        RequestSpec::get(url)
    }
}

/// Write a target list with a `url,category` header
pub(crate) fn write_targets(dir: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
    let mut text = String::from("url,category\n");
    for (url, category) in rows {
        text.push_str(&format!("{url},{category}\n"));
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

/// Benchmark over a mock transport writing into `output_dir`
pub(crate) fn create_test_benchmark(
    output_dir: &Path,
    ladder: Vec<usize>,
    transport: Arc<MockTransport>,
) -> Benchmark {
    let mut config = Config {
        output_dir: output_dir.to_path_buf(),
        ..Config::default()
    };
    config.sweep.ladder = ladder;
    Benchmark::with_parts(config, Arc::new(DirectAdapter), transport)
}

/// Dataset directory the mock benchmark writes a dataset into
pub(crate) fn dataset_dir(output_dir: &Path, dataset: &str) -> PathBuf {
    output_dir.join("mock provider").join(dataset)
}
