//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the navigation engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where session state is persisted.
    pub storage: StorageConfig,

    /// Deferred module loading.
    pub loader: LoaderConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Path segments that identify each section.
    pub sections: SectionsConfig,

    /// Ordered route table. Specific patterns must precede broader wildcards.
    pub routes: Vec<RouteConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            loader: LoaderConfig::default(),
            observability: ObservabilityConfig::default(),
            sections: SectionsConfig::default(),
            routes: default_routes(),
        }
    }
}

/// Durable storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding persisted slots. `None` keeps state in memory only.
    pub path: Option<PathBuf>,

    /// Prefix for every slot key (e.g. `nav.section`).
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            namespace: "nav".to_string(),
        }
    }
}

/// Deferred module loader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delay before the single retry of a failed import, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 1500,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,

    /// Install the Prometheus recorder.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
        }
    }
}

/// Marker segments per section. A path belongs to a section when any of
/// its segments equals one of that section's markers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionsConfig {
    pub passenger: Vec<String>,
    pub driver: Vec<String>,
    pub admin: Vec<String>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            passenger: vec!["passenger".to_string(), "ride".to_string()],
            driver: vec!["driver".to_string()],
            admin: vec!["admin".to_string()],
        }
    }
}

/// One route: a path pattern and the view it maps to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Exact path (`/admin/diagnostic`) or wildcard (`/admin/*`).
    pub pattern: String,

    /// View key handed to the host when this route matches.
    pub view: String,
}

impl RouteConfig {
    pub fn new(pattern: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            view: view.into(),
        }
    }
}

/// The built-in route table.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("/", "landing"),
        RouteConfig::new("/welcome", "landing"),
        RouteConfig::new("/admin/diagnostic", "admin-diagnostic"),
        RouteConfig::new("/admin/*", "admin-app"),
        RouteConfig::new("/driver/*", "driver-app"),
        RouteConfig::new("/passenger/*", "passenger-app"),
        RouteConfig::new("/ride/*", "passenger-app"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.storage.namespace, "nav");
        assert_eq!(config.loader.retry_delay_ms, 1500);
        assert_eq!(config.routes.len(), default_routes().len());
    }

    #[test]
    fn test_partial_config() {
        let config: EngineConfig = toml::from_str(
            r#"
            [storage]
            path = "state.json"

            [sections]
            driver = ["driver", "fleet"]

            [[routes]]
            pattern = "/"
            view = "home"

            [[routes]]
            pattern = "/fleet/*"
            view = "driver-app"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.path, Some(PathBuf::from("state.json")));
        assert_eq!(config.storage.namespace, "nav");
        assert_eq!(config.sections.driver, vec!["driver", "fleet"]);
        assert_eq!(config.sections.admin, vec!["admin"]);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].view, "driver-app");
    }
}
