//! Aggregation backends that views are registered with and observations are
//! pushed into.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::{debug, warn};

use super::view::{Aggregation, View};
use super::RegistrationError;
use crate::utils::log_throttle::should_emit;

const RECORD_FAILURE_LOG_WINDOW: Duration = Duration::from_secs(60);

/// Where registered views live and observations end up.
///
/// `record` must not block for long or fail loudly: it runs on the request
/// path of whatever is being instrumented.
pub trait ViewBackend: Send + Sync {
    /// Registers `view`. Registering an identical view again succeeds.
    fn register_view(&self, view: &View) -> Result<(), RegistrationError>;

    /// Pushes one observation. `label_values` follow `view.tag_keys()`.
    fn record(&self, view: &View, label_values: &[&str], value: f64);
}

enum Collector {
    Counter(IntCounterVec),
    Histogram(HistogramVec),
}

struct RegisteredView {
    view: View,
    collector: Collector,
}

/// Backend that owns a `prometheus::Registry`.
///
/// Every view on the registry goes through this backend, so identical
/// re-registrations can be told apart from conflicting ones. Instances that
/// should export together share one `Arc<PrometheusBackend>`.
pub struct PrometheusBackend {
    registry: Registry,
    views: RwLock<HashMap<&'static str, RegisteredView>>,
}

impl PrometheusBackend {
    pub fn new() -> Self {
        PrometheusBackend {
            registry: Registry::new(),
            views: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders all registered views in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    fn build_collector(view: &View) -> prometheus::Result<Collector> {
        let name = metric_name(view.name());
        let help = view.measure().description();
        let labels: Vec<&str> = view.tag_keys().iter().map(|key| key.as_str()).collect();

        match view.aggregation() {
            Aggregation::Count => {
                IntCounterVec::new(Opts::new(name, help), &labels).map(Collector::Counter)
            }
            Aggregation::Distribution(bounds) => HistogramVec::new(
                HistogramOpts::new(name, help).buckets(bounds.to_vec()),
                &labels,
            )
            .map(Collector::Histogram),
        }
    }
}

impl Default for PrometheusBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBackend for PrometheusBackend {
    fn register_view(&self, view: &View) -> Result<(), RegistrationError> {
        view.validate()?;

        let mut views = self.views.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = views.get(view.name()) {
            if existing.view == *view {
                debug!(view = view.name(), "View already registered");
                return Ok(());
            }
            return Err(RegistrationError::IncompatibleView {
                name: view.name().to_string(),
            });
        }

        let backend_error = |e: prometheus::Error| match e {
            prometheus::Error::AlreadyReg => RegistrationError::IncompatibleView {
                name: view.name().to_string(),
            },
            other => RegistrationError::Backend {
                name: view.name().to_string(),
                reason: other.to_string(),
            },
        };

        let collector = Self::build_collector(view).map_err(backend_error)?;
        let registered = match &collector {
            Collector::Counter(c) => self.registry.register(Box::new(c.clone())),
            Collector::Histogram(h) => self.registry.register(Box::new(h.clone())),
        };
        registered.map_err(backend_error)?;

        views.insert(
            view.name(),
            RegisteredView {
                view: view.clone(),
                collector,
            },
        );
        Ok(())
    }

    fn record(&self, view: &View, label_values: &[&str], value: f64) {
        let views = self.views.read().unwrap_or_else(PoisonError::into_inner);
        let Some(registered) = views.get(view.name()) else {
            if let Some(suppressed) =
                should_emit("metrics.backend.unregistered", RECORD_FAILURE_LOG_WINDOW)
            {
                warn!(
                    view = view.name(),
                    suppressed, "Dropping observation for unregistered view"
                );
            }
            return;
        };

        let result = match &registered.collector {
            Collector::Counter(c) => c
                .get_metric_with_label_values(label_values)
                .map(|counter| counter.inc_by(value as u64)),
            Collector::Histogram(h) => h
                .get_metric_with_label_values(label_values)
                .map(|histogram| histogram.observe(value)),
        };

        if let Err(e) = result {
            if let Some(suppressed) =
                should_emit("metrics.backend.record_failed", RECORD_FAILURE_LOG_WINDOW)
            {
                warn!(
                    view = view.name(),
                    error = %e,
                    suppressed,
                    "Dropping observation rejected by backend"
                );
            }
        }
    }
}

/// Maps a measure name such as `runtime/workflow/operation/count` onto a
/// valid Prometheus metric name.
pub fn metric_name(measure_name: &str) -> String {
    measure_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
