//! Application startup and server initialization.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ConfigV1;
use crate::metrics::{PrometheusBackend, RegistrationError, WorkflowMetrics};
use crate::routes;
use crate::state::AppState;

/// Builds the workflow metrics and, when enabled, registers their views.
///
/// # Errors
///
/// Returns the [`RegistrationError`] from `init`; the service must not start
/// with mis-specified metrics.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, RegistrationError> {
    let backend = Arc::new(PrometheusBackend::new());
    let metrics = Arc::new(WorkflowMetrics::new(backend.clone())?);

    if config.metrics.enabled {
        metrics.init(config.metrics.app_id.clone(), config.metrics.namespace.clone())?;
    } else {
        warn!("Workflow metrics disabled by configuration");
    }

    Ok(AppState {
        config,
        metrics,
        backend,
    })
}

/// Initializes metrics and serves `/metrics` and `/health` on the
/// configured address.
///
/// # Errors
///
/// Returns an error if metrics registration fails, if the server cannot bind
/// to the specified address, or on a runtime error while serving.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone())?;

    info!("Starting server on {}", config.bind_address);

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
