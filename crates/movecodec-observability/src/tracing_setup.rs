//! Tracing / logging initialisation helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Log level, globally and per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// component (crate) name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_component(mut self, component: &str, level: impl Into<String>) -> Self {
        self.components.insert(component.to_string(), level.into());
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// `EnvFilter` directive string, e.g. `info,movecodec_registry=debug`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.directives()).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber, writing to stderr. Call once at startup.
///
/// An invalid directive string falls back to `info`.
pub fn init_tracing(config: &LogConfig) {
    if let Err(e) = try_init_tracing(config) {
        eprintln!("tracing already initialised: {e}");
    }
}

/// Like [`init_tracing`], but reports a subscriber that is already installed.
pub fn try_init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = config.filter();
    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_per_component() {
        let config = LogConfig::default()
            .with_level("warn")
            .with_component("movecodec-registry", "debug")
            .with_component("movecodec_codegen", "info");
        assert_eq!(
            config.directives(),
            "warn,movecodec_codegen=info,movecodec_registry=debug"
        );
    }

    #[test]
    fn serde_defaults() {
        let config: LogConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LogConfig::default());

        let yaml = "level: debug\njson: true\ncomponents:\n  movecodec-bcs: trace\n";
        let config: LogConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.json);
        assert_eq!(config.directives(), "debug,movecodec_bcs=trace");
    }

    #[test]
    fn second_init_is_reported() {
        let config = LogConfig::default().with_level("error");
        let _ = try_init_tracing(&config);
        assert!(try_init_tracing(&config).is_err());
    }
}
