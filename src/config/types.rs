use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::metrics::MetricsConfig;

const CONFIG_FILE: &str = "./config.yaml";
const ENV_PREFIX: &str = "WFMETRICS_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Extracts a v1 config from an already assembled figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from "config.yaml" in the current directory, with
/// `WFMETRICS_`-prefixed environment variables taking precedence
/// (`WFMETRICS_METRICS__APP_ID=...`).
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    match extract_config(figment) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error rendering schema: {}", e),
    }
}
