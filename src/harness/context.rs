//! Shared state handed to every fetch worker of a sweep.

use std::sync::Arc;

use crate::config::SweepConfig;
use crate::diagnostics::DiagnosticLog;
use crate::provider::{ProviderAdapter, Transport};
use crate::types::Event;

/// Everything a worker needs, shared across all attempts of one dataset sweep
pub(crate) struct FetchContext {
    pub(crate) adapter: Arc<dyn ProviderAdapter>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) diagnostics: Arc<DiagnosticLog>,
    pub(crate) sweep: Arc<SweepConfig>,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}
