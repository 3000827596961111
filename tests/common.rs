#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use figment::{
    Figment,
    providers::{Format, Yaml},
};
use prometheus::proto::{Metric, MetricFamily};
use workflow_metrics::config::{extract_config, ConfigV1};
use workflow_metrics::routes::create_router;
use workflow_metrics::startup::build_state;
use workflow_metrics::state::AppState;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:9091
logging:
  level: "debug"
  format: "json"
metrics:
  enabled: true
  app_id: a1
  namespace: ns1
"#;

pub const DISABLED_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:9091
metrics:
  enabled: false
  app_id: a1
  namespace: ns1
"#;

pub fn load_test_config(yaml: &str) -> ConfigV1 {
    extract_config(Figment::new().merge(Yaml::string(yaml)))
        .expect("Failed to parse test config YAML")
}

pub fn build_app(yaml: &str) -> (Router, AppState) {
    let config = Arc::new(load_test_config(yaml));
    let state = build_state(config).expect("metrics should initialize");
    (create_router(state.clone()), state)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Finds the series of `family` whose labels match `labels` exactly.
pub fn find_series<'a>(
    families: &'a [MetricFamily],
    family: &str,
    labels: &[(&str, &str)],
) -> Option<&'a Metric> {
    families
        .iter()
        .find(|mf| mf.get_name() == family)?
        .get_metric()
        .iter()
        .find(|m| {
            let pairs = m.get_label();
            pairs.len() == labels.len()
                && labels.iter().all(|(name, value)| {
                    pairs
                        .iter()
                        .any(|p| p.get_name() == *name && p.get_value() == *value)
                })
        })
}

/// Number of series currently exported for `family`.
pub fn series_count(families: &[MetricFamily], family: &str) -> usize {
    families
        .iter()
        .find(|mf| mf.get_name() == family)
        .map(|mf| mf.get_metric().len())
        .unwrap_or(0)
}
