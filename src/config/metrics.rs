use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity stamped on every workflow metric, and whether recording is on.
///
/// With `enabled: false` the views are never registered and every recording
/// call is dropped.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct MetricsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub app_id: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_enabled() -> bool {
    true
}

fn default_namespace() -> String {
    "default".to_string()
}
