//! The single error type produced by the workflow metrics subsystem.

use thiserror::Error;

/// Raised while defining measures or registering views.
///
/// Recording never fails from the caller's point of view, so this is only
/// ever returned from construction and [`init`](super::WorkflowMetrics::init).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("measure '{name}' is already defined")]
    DuplicateMeasure { name: String },

    #[error("view '{name}' is already registered with a different definition")]
    IncompatibleView { name: String },

    #[error("view '{name}' is invalid: {reason}")]
    InvalidView { name: String, reason: String },

    #[error("workflow metrics already initialized for app '{app_id}' in namespace '{namespace}'")]
    AlreadyInitialized { app_id: String, namespace: String },

    #[error("backend rejected view '{name}': {reason}")]
    Backend { name: String, reason: String },
}
