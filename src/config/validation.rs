//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile route patterns and check table ordering
//! - Validate value ranges and section markers
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - An exact route declared after a wildcard covering it still works
//!   (exact always wins) and is only logged as a warning
//! - A wildcard declared after a broader wildcard can never match and is
//!   rejected

use std::collections::HashMap;

use thiserror::Error;

use crate::config::schema::{EngineConfig, RouteConfig, SectionsConfig};
use crate::dispatch::ViewKey;
use crate::routing::matcher::{PatternError, RouteEntry};
use crate::routing::ROOT_PATH;
use crate::session::Section;

/// Upper bound on the deferred-load retry delay.
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index}: {source}")]
    Pattern { index: usize, source: PatternError },

    #[error("route #{index} (`{pattern}`) has an empty view")]
    EmptyView { index: usize, pattern: String },

    #[error("exact route `{pattern}` is declared twice (routes #{first} and #{second})")]
    DuplicateExact {
        pattern: String,
        first: usize,
        second: usize,
    },

    #[error("wildcard route `{pattern}` (#{index}) is unreachable behind `{shadowed_by}`")]
    UnreachableWildcard {
        pattern: String,
        index: usize,
        shadowed_by: String,
    },

    #[error("no route matches the root path `/`")]
    NoRootRoute,

    #[error("section `{0}` has no path markers")]
    NoMarkers(Section),

    #[error("marker `{0}` must be a single non-empty path segment")]
    InvalidMarker(String),

    #[error("marker `{marker}` is claimed by both {first} and {second}")]
    DuplicateMarker {
        marker: String,
        first: Section,
        second: Section,
    },

    #[error("storage namespace is empty")]
    EmptyNamespace,

    #[error("retry delay {0}ms exceeds the 60000ms limit")]
    RetryDelayTooLong(u64),

    #[error("unknown log level `{0}`")]
    InvalidLogLevel(String),
}

/// Validate the whole configuration.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = match compile_routes(&config.routes) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    };

    errors.extend(validate_sections(&config.sections));

    if config.storage.namespace.trim().is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    }
    if config.loader.retry_delay_ms > MAX_RETRY_DELAY_MS {
        errors.push(ValidationError::RetryDelayTooLong(config.loader.retry_delay_ms));
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse every route in declaration order and check the table as a whole.
pub fn compile_routes(routes: &[RouteConfig]) -> Result<Vec<RouteEntry>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut entries: Vec<(usize, RouteEntry)> = Vec::with_capacity(routes.len());

    for (index, route) in routes.iter().enumerate() {
        if route.view.trim().is_empty() {
            errors.push(ValidationError::EmptyView {
                index,
                pattern: route.pattern.clone(),
            });
            continue;
        }
        match RouteEntry::parse(&route.pattern, ViewKey::new(route.view.trim())) {
            Ok(entry) => entries.push((index, entry)),
            Err(source) => errors.push(ValidationError::Pattern { index, source }),
        }
    }

    let mut exact_seen: HashMap<&str, usize> = HashMap::new();
    for (pos, (index, entry)) in entries.iter().enumerate() {
        let earlier = &entries[..pos];

        if !entry.is_wildcard() {
            if let Some(first) = exact_seen.insert(entry.prefix(), *index) {
                errors.push(ValidationError::DuplicateExact {
                    pattern: entry.pattern().to_string(),
                    first,
                    second: *index,
                });
            }
            if let Some((_, wildcard)) = earlier
                .iter()
                .find(|(_, e)| e.matches_wildcard(entry.prefix()))
            {
                tracing::warn!(
                    route = %entry.pattern(),
                    wildcard = %wildcard.pattern(),
                    "Exact route declared after a wildcard that covers it"
                );
            }
            continue;
        }

        if let Some((_, broader)) = earlier
            .iter()
            .find(|(_, e)| e.matches_wildcard(entry.prefix()))
        {
            errors.push(ValidationError::UnreachableWildcard {
                pattern: entry.pattern().to_string(),
                index: *index,
                shadowed_by: broader.pattern().to_string(),
            });
        }
    }

    if !entries.is_empty() && !entries.iter().any(|(_, e)| e.matches(ROOT_PATH)) {
        errors.push(ValidationError::NoRootRoute);
    }
    if routes.is_empty() {
        errors.push(ValidationError::NoRootRoute);
    }

    if errors.is_empty() {
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    } else {
        Err(errors)
    }
}

fn validate_sections(sections: &SectionsConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut owners: HashMap<&str, Section> = HashMap::new();

    for (section, markers) in [
        (Section::Passenger, &sections.passenger),
        (Section::Driver, &sections.driver),
        (Section::Admin, &sections.admin),
    ] {
        if markers.is_empty() {
            errors.push(ValidationError::NoMarkers(section));
        }
        for marker in markers {
            if marker.is_empty() || marker.contains('/') {
                errors.push(ValidationError::InvalidMarker(marker.clone()));
                continue;
            }
            if let Some(first) = owners.insert(marker.as_str(), section) {
                if first != section {
                    errors.push(ValidationError::DuplicateMarker {
                        marker: marker.clone(),
                        first,
                        second: section,
                    });
                }
            }
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = EngineConfig::default();
        config.routes = vec![
            RouteConfig::new("/*", "all"),
            RouteConfig::new("/admin/*", "admin"),
            RouteConfig::new("admin", "bad"),
            RouteConfig::new("/x", ""),
        ];
        config.storage.namespace = " ".into();
        config.loader.retry_delay_ms = 120_000;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnreachableWildcard { index: 1, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Pattern { index: 2, .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::EmptyView { index: 3, .. })));
        assert!(errors.contains(&ValidationError::EmptyNamespace));
        assert!(errors.contains(&ValidationError::RetryDelayTooLong(120_000)));
        assert!(errors.contains(&ValidationError::InvalidLogLevel("loud".into())));
    }

    #[test]
    fn test_duplicate_exact_routes() {
        let routes = vec![
            RouteConfig::new("/", "landing"),
            RouteConfig::new("/admin/diagnostic", "a"),
            RouteConfig::new("/admin/diagnostic/", "b"),
        ];
        let errors = compile_routes(&routes).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateExact {
                pattern: "/admin/diagnostic/".into(),
                first: 1,
                second: 2,
            }]
        );
    }

    #[test]
    fn test_exact_after_wildcard_is_allowed() {
        let routes = vec![
            RouteConfig::new("/", "landing"),
            RouteConfig::new("/admin/*", "admin"),
            RouteConfig::new("/admin/diagnostic", "diag"),
        ];
        assert_eq!(compile_routes(&routes).unwrap().len(), 3);
    }

    #[test]
    fn test_root_route_required() {
        let routes = vec![RouteConfig::new("/driver/*", "driver")];
        assert_eq!(
            compile_routes(&routes).unwrap_err(),
            vec![ValidationError::NoRootRoute]
        );
        assert_eq!(compile_routes(&[]).unwrap_err(), vec![ValidationError::NoRootRoute]);
    }

    #[test]
    fn test_marker_conflicts() {
        let sections = SectionsConfig {
            passenger: vec!["ride".into()],
            driver: vec!["ride".into(), "a/b".into()],
            admin: vec![],
        };
        let errors = validate_sections(&sections);
        assert!(errors.contains(&ValidationError::NoMarkers(Section::Admin)));
        assert!(errors.contains(&ValidationError::InvalidMarker("a/b".into())));
        assert!(errors.contains(&ValidationError::DuplicateMarker {
            marker: "ride".into(),
            first: Section::Passenger,
            second: Section::Driver,
        }));
    }
}
