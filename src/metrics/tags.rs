//! Tag keys, well-known tag values, and resolution of an event's fields
//! into the label values a view expects.

use std::fmt;

/// Component label used by the workflow engine's own call sites.
pub const COMPONENT_NAME: &str = "dapr";

/// Dimension keys a view can be sliced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKey {
    AppId,
    Component,
    Namespace,
    Operation,
    ExecutionType,
    Status,
}

impl TagKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKey::AppId => "app_id",
            TagKey::Component => "component",
            TagKey::Namespace => "namespace",
            TagKey::Operation => "operation",
            TagKey::ExecutionType => "execution_type",
            TagKey::Status => "status",
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an operation or execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failed,
    Recoverable,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Recoverable => "recoverable",
        }
    }
}

/// Control-plane workflow requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateWorkflow,
    GetWorkflow,
    AddEvent,
    PurgeWorkflow,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateWorkflow => "create_workflow",
            Operation::GetWorkflow => "get_workflow",
            Operation::AddEvent => "add_event",
            Operation::PurgeWorkflow => "purge_workflow",
        }
    }
}

/// What kind of unit ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionType {
    Workflow,
    Activity,
    Event,
    Timer,
}

impl ExecutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionType::Workflow => "workflow",
            ExecutionType::Activity => "activity",
            ExecutionType::Event => "event",
            ExecutionType::Timer => "timer",
        }
    }
}

/// Semantic fields of a single recorded event.
///
/// Every [`TagKey`] maps to exactly one field here, so a view can never ask
/// for a dimension the resolver does not know about. Fields that only exist
/// for one event class are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTags<'a> {
    pub app_id: &'a str,
    pub namespace: &'a str,
    pub component: &'a str,
    pub operation: Option<&'a str>,
    pub execution_type: Option<&'a str>,
    pub status: &'a str,
}

impl<'a> EventTags<'a> {
    pub fn operation(
        app_id: &'a str,
        namespace: &'a str,
        component: &'a str,
        operation: &'a str,
        status: &'a str,
    ) -> Self {
        Self {
            app_id,
            namespace,
            component,
            operation: Some(operation),
            execution_type: None,
            status,
        }
    }

    pub fn execution(
        app_id: &'a str,
        namespace: &'a str,
        component: &'a str,
        execution_type: &'a str,
        status: &'a str,
    ) -> Self {
        Self {
            app_id,
            namespace,
            component,
            operation: None,
            execution_type: Some(execution_type),
            status,
        }
    }

    fn value(&self, key: TagKey) -> Option<&'a str> {
        match key {
            TagKey::AppId => Some(self.app_id),
            TagKey::Component => Some(self.component),
            TagKey::Namespace => Some(self.namespace),
            TagKey::Operation => self.operation,
            TagKey::ExecutionType => self.execution_type,
            TagKey::Status => Some(self.status),
        }
    }

    /// Label values in the order of `keys`.
    ///
    /// Returns the first key without a value as the error, so the caller can
    /// drop the observation instead of attributing it to the wrong series.
    pub fn resolve(&self, keys: &[TagKey]) -> Result<Vec<&'a str>, TagKey> {
        keys.iter()
            .map(|key| self.value(*key).ok_or(*key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_follows_view_key_order() {
        let tags = EventTags::operation("a1", "ns1", "dapr", "create_workflow", "success");
        let values = tags
            .resolve(&[
                TagKey::Status,
                TagKey::AppId,
                TagKey::Operation,
                TagKey::Namespace,
                TagKey::Component,
            ])
            .expect("all keys present");
        assert_eq!(values, vec!["success", "a1", "create_workflow", "ns1", "dapr"]);
    }

    #[test]
    fn test_resolve_ignores_extra_fields() {
        let tags = EventTags::execution("a1", "ns1", "dapr", "activity", "failed");
        let values = tags.resolve(&[TagKey::ExecutionType]).expect("present");
        assert_eq!(values, vec!["activity"]);
    }

    #[test]
    fn test_resolve_reports_missing_key() {
        let tags = EventTags::execution("a1", "ns1", "dapr", "activity", "failed");
        let missing = tags
            .resolve(&[TagKey::AppId, TagKey::Operation, TagKey::Status])
            .unwrap_err();
        assert_eq!(missing, TagKey::Operation);
    }

    #[test]
    fn test_tag_key_names() {
        let keys = [
            TagKey::AppId,
            TagKey::Component,
            TagKey::Namespace,
            TagKey::Operation,
            TagKey::ExecutionType,
            TagKey::Status,
        ];
        let names: Vec<&str> = keys.iter().map(TagKey::as_str).collect();
        assert_eq!(
            names,
            vec!["app_id", "component", "namespace", "operation", "execution_type", "status"]
        );
        assert_eq!(TagKey::ExecutionType.to_string(), "execution_type");
    }

    #[test]
    fn test_well_known_values() {
        assert_eq!(Status::Recoverable.as_str(), "recoverable");
        assert_eq!(Operation::PurgeWorkflow.as_str(), "purge_workflow");
        assert_eq!(ExecutionType::Activity.as_str(), "activity");
        assert_eq!(COMPONENT_NAME, "dapr");
    }
}
