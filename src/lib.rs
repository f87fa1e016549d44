//! # unlock-bench
//!
//! Concurrency-swept benchmark harness for web-unlocking and proxy providers.
//!
//! ## Design Philosophy
//!
//! unlock-bench is designed to be:
//! - **Provider-agnostic** - Proxy gateways and unlocker APIs plug in behind one adapter trait
//! - **Sensible defaults** - A ladder of `[1, 5, 10, 20]` and a 10 KB soft-block threshold
//! - **Library-first** - The binary is a thin shell; everything is usable from Rust
//! - **Event-driven** - Consumers subscribe to per-task and per-level events
//!
//! For every target list the harness sweeps the concurrency ladder. At level `L` each
//! target is attempted `L` times with at most `L` attempts in flight, and level `L+1`
//! starts only once every attempt of level `L` has finished. Each attempt yields one row
//! in `global_results.csv`; failures are detailed in `error.log`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unlock_bench::{Benchmark, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::from_file("bench.json")?;
//!     config.datasets = vec!["url_walmart.csv".into()];
//!
//!     let bench = Benchmark::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = bench.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     for report in bench.run_all().await? {
//!         println!("{}: {} attempts", report.dataset, report.records.len());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Append-only diagnostic log for failed attempts
pub mod diagnostics;
/// Error types
pub mod error;
/// Benchmark harness (decomposed into focused submodules)
pub mod harness;
/// Provider adapters and HTTP transport
pub mod provider;
/// Result aggregation and report output
pub mod report;
/// Target list loading
pub mod targets;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, InputConfig, ProviderConfig, SweepConfig};
pub use error::{Error, FetchError, Result};
pub use harness::Benchmark;
pub use provider::{HttpTransport, ProviderAdapter, RawResponse, RequestSpec, Transport};
pub use report::{RunReport, write_report};
pub use types::{AttemptRecord, Classification, Event, LevelSummary, Outcome, Target};
