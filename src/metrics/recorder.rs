//! Workflow metrics: measure declarations, view registration and the
//! recording entry points used by the workflow engine.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::backend::ViewBackend;
use super::measure::{MeasureRegistry, UNIT_MILLISECONDS};
use super::tags::{EventTags, TagKey};
use super::view::View;
use super::RegistrationError;
use crate::utils::log_throttle::should_emit;

const MISSING_TAG_LOG_WINDOW: Duration = Duration::from_secs(60);

const OPERATION_TAG_KEYS: [TagKey; 5] = [
    TagKey::AppId,
    TagKey::Component,
    TagKey::Namespace,
    TagKey::Operation,
    TagKey::Status,
];

const EXECUTION_TAG_KEYS: [TagKey; 5] = [
    TagKey::AppId,
    TagKey::Component,
    TagKey::Namespace,
    TagKey::ExecutionType,
    TagKey::Status,
];

/// Entry points for instrumented code.
///
/// Calls never fail. Implementations that are disabled simply drop them, so
/// call sites can record unconditionally.
pub trait WorkflowRecorder: Send + Sync {
    fn is_enabled(&self) -> bool;

    /// Counts one workflow operation request and, when `elapsed_ms > 0`,
    /// records its latency.
    fn workflow_operation_event(
        &self,
        operation: &str,
        component: &str,
        status: &str,
        elapsed_ms: f64,
    );

    /// Counts one workflow or activity execution and, when `elapsed_ms > 0`,
    /// records how long it ran.
    fn execution_event(&self, component: &str, execution_type: &str, status: &str, elapsed_ms: f64);
}

/// A recorder that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRecorder;

impl WorkflowRecorder for NoopRecorder {
    fn is_enabled(&self) -> bool {
        false
    }

    fn workflow_operation_event(
        &self,
        _operation: &str,
        _component: &str,
        _status: &str,
        _elapsed_ms: f64,
    ) {
    }

    fn execution_event(
        &self,
        _component: &str,
        _execution_type: &str,
        _status: &str,
        _elapsed_ms: f64,
    ) {
    }
}

/// A recorder that was never constructed behaves like [`NoopRecorder`].
impl<R: WorkflowRecorder> WorkflowRecorder for Option<R> {
    fn is_enabled(&self) -> bool {
        self.as_ref().is_some_and(R::is_enabled)
    }

    fn workflow_operation_event(
        &self,
        operation: &str,
        component: &str,
        status: &str,
        elapsed_ms: f64,
    ) {
        if let Some(recorder) = self {
            recorder.workflow_operation_event(operation, component, status, elapsed_ms);
        }
    }

    fn execution_event(
        &self,
        component: &str,
        execution_type: &str,
        status: &str,
        elapsed_ms: f64,
    ) {
        if let Some(recorder) = self {
            recorder.execution_event(component, execution_type, status, elapsed_ms);
        }
    }
}

impl<R: WorkflowRecorder + ?Sized> WorkflowRecorder for Arc<R> {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn workflow_operation_event(
        &self,
        operation: &str,
        component: &str,
        status: &str,
        elapsed_ms: f64,
    ) {
        (**self).workflow_operation_event(operation, component, status, elapsed_ms);
    }

    fn execution_event(
        &self,
        component: &str,
        execution_type: &str,
        status: &str,
        elapsed_ms: f64,
    ) {
        (**self).execution_event(component, execution_type, status, elapsed_ms);
    }
}

/// Values fixed by [`WorkflowMetrics::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct MetricsState {
    app_id: String,
    namespace: String,
}

/// Workflow operation and execution metrics.
///
/// Starts disabled. [`init`](Self::init) registers the views and then
/// publishes the app id and namespace in one step; until that publish every
/// recording call is a no-op.
pub struct WorkflowMetrics {
    backend: Arc<dyn ViewBackend>,
    /// Successful/failed requests to create/get/purge workflows and add events.
    operation_count: View,
    /// Response latency of workflow operation requests.
    operation_latency: View,
    /// Successful/failed/recoverable workflow and activity executions.
    execution_count: View,
    /// Time taken to run a workflow or activity to completion.
    execution_latency: View,
    state: OnceLock<MetricsState>,
}

impl WorkflowMetrics {
    pub fn new(backend: Arc<dyn ViewBackend>) -> Result<Self, RegistrationError> {
        let mut measures = MeasureRegistry::new();

        let operation_count = measures.define_counter(
            "runtime/workflow/operation/count",
            "The number of successful/failed workflow operation requests.",
        )?;
        let operation_latency = measures.define_latency(
            "runtime/workflow/operation/latency",
            "The latencies of responses for workflow operation requests.",
            UNIT_MILLISECONDS,
        )?;
        let execution_count = measures.define_counter(
            "runtime/workflow/execution/count",
            "The number of successful/failed/recoverable workflow/activity executions.",
        )?;
        let execution_latency = measures.define_latency(
            "runtime/workflow/execution/latency",
            "The total time taken to run a workflow/activity to completion.",
            UNIT_MILLISECONDS,
        )?;

        Ok(WorkflowMetrics {
            backend,
            operation_count: View::count(operation_count, &OPERATION_TAG_KEYS),
            operation_latency: View::latency(operation_latency, &OPERATION_TAG_KEYS),
            execution_count: View::count(execution_count, &EXECUTION_TAG_KEYS),
            execution_latency: View::latency(execution_latency, &EXECUTION_TAG_KEYS),
            state: OnceLock::new(),
        })
    }

    /// The views registered by [`init`](Self::init), in registration order.
    pub fn views(&self) -> [&View; 4] {
        [
            &self.operation_count,
            &self.operation_latency,
            &self.execution_count,
            &self.execution_latency,
        ]
    }

    /// Registers the workflow views and enables recording.
    ///
    /// Repeating the call with the same app id and namespace is a no-op.
    /// With different values it fails with
    /// [`RegistrationError::AlreadyInitialized`] and the first values stay.
    pub fn init(
        &self,
        app_id: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        let requested = MetricsState {
            app_id: app_id.into(),
            namespace: namespace.into(),
        };

        if let Some(current) = self.state.get() {
            return Self::check_reinit(current, &requested);
        }

        for view in self.views() {
            self.backend.register_view(view)?;
            debug!(
                view = view.name(),
                tag_keys = ?view.tag_keys(),
                "Registered workflow metrics view"
            );
        }

        match self.state.set(requested) {
            Ok(()) => {
                info!(
                    app_id = %self.app_id().unwrap_or_default(),
                    namespace = %self.namespace().unwrap_or_default(),
                    "Workflow metrics enabled"
                );
                Ok(())
            }
            // Lost a race against a concurrent init; compare against the winner.
            Err(requested) => match self.state.get() {
                Some(current) => Self::check_reinit(current, &requested),
                None => Ok(()),
            },
        }
    }

    fn check_reinit(
        current: &MetricsState,
        requested: &MetricsState,
    ) -> Result<(), RegistrationError> {
        if current == requested {
            debug!(app_id = %current.app_id, "Workflow metrics already initialized");
            return Ok(());
        }
        warn!(
            app_id = %current.app_id,
            namespace = %current.namespace,
            requested_app_id = %requested.app_id,
            requested_namespace = %requested.namespace,
            "Refusing to re-initialize workflow metrics with different values"
        );
        Err(RegistrationError::AlreadyInitialized {
            app_id: current.app_id.clone(),
            namespace: current.namespace.clone(),
        })
    }

    pub fn app_id(&self) -> Option<&str> {
        self.state.get().map(|s| s.app_id.as_str())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.state.get().map(|s| s.namespace.as_str())
    }

    fn record(&self, view: &View, tags: &EventTags<'_>, value: f64) {
        match tags.resolve(view.tag_keys()) {
            Ok(values) => self.backend.record(view, &values, value),
            Err(missing) => {
                if let Some(suppressed) =
                    should_emit("metrics.workflow.missing_tag", MISSING_TAG_LOG_WINDOW)
                {
                    warn!(
                        view = view.name(),
                        tag_key = %missing,
                        suppressed,
                        "Dropping observation without a required tag"
                    );
                }
            }
        }
    }
}

impl WorkflowRecorder for WorkflowMetrics {
    fn is_enabled(&self) -> bool {
        self.state.get().is_some()
    }

    fn workflow_operation_event(
        &self,
        operation: &str,
        component: &str,
        status: &str,
        elapsed_ms: f64,
    ) {
        let Some(state) = self.state.get() else {
            return;
        };

        let tags = EventTags::operation(
            &state.app_id,
            &state.namespace,
            component,
            operation,
            status,
        );
        self.record(&self.operation_count, &tags, 1.0);

        // Zero, negative and NaN mean "not measured".
        if elapsed_ms > 0.0 {
            self.record(&self.operation_latency, &tags, elapsed_ms);
        }
    }

    fn execution_event(
        &self,
        component: &str,
        execution_type: &str,
        status: &str,
        elapsed_ms: f64,
    ) {
        let Some(state) = self.state.get() else {
            return;
        };

        let tags = EventTags::execution(
            &state.app_id,
            &state.namespace,
            component,
            execution_type,
            status,
        );
        self.record(&self.execution_count, &tags, 1.0);

        if elapsed_ms > 0.0 {
            self.record(&self.execution_latency, &tags, elapsed_ms);
        }
    }
}
