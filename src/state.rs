//! Shared application state.

use crate::config::ConfigV1;
use crate::metrics::{PrometheusBackend, WorkflowMetrics};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Workflow metrics handed to instrumented code.
    pub metrics: Arc<WorkflowMetrics>,
    /// Registry the workflow views were registered with; rendered on `/metrics`.
    pub backend: Arc<PrometheusBackend>,
}
