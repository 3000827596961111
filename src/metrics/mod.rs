//! Workflow metrics recording.
//!
//! Measures are declared by [`WorkflowMetrics`], bound to typed tag keys as
//! [`View`]s and registered with a [`ViewBackend`] once at startup.

mod backend;
mod error;
mod measure;
mod recorder;
mod tags;
mod view;

pub use backend::{PrometheusBackend, ViewBackend, metric_name};
pub use error::RegistrationError;
pub use measure::{Measure, MeasureKind, MeasureRegistry, UNIT_DIMENSIONLESS, UNIT_MILLISECONDS};
pub use recorder::{NoopRecorder, WorkflowMetrics, WorkflowRecorder};
pub use tags::{COMPONENT_NAME, EventTags, ExecutionType, Operation, Status, TagKey};
pub use view::{Aggregation, DEFAULT_LATENCY_BUCKETS_MS, View};
