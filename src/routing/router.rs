//! Route lookup.
//!
//! # Responsibilities
//! - Store the compiled, ordered route table
//! - Look up the entry for a pathname
//! - Return an explicit no-match; the controller decides the fallback

use crate::config::schema::RouteConfig;
use crate::config::validation::{compile_routes, ValidationError};
use crate::routing::matcher::{match_path, RouteEntry};

/// Path every unmatched navigation falls back to.
pub const ROOT_PATH: &str = "/";

/// Immutable, ordered route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table from already-parsed entries, keeping their order.
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    /// Compile and validate the configured routes.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, Vec<ValidationError>> {
        let entries = compile_routes(routes)?;
        tracing::debug!(routes = entries.len(), "Route table compiled");
        Ok(Self::new(entries))
    }

    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        match_path(path, &self.entries)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_routes;

    #[test]
    fn test_default_table() {
        let table = RouteTable::from_config(&default_routes()).unwrap();
        assert_eq!(table.resolve("/").unwrap().view().as_str(), "landing");
        assert_eq!(
            table.resolve("/admin/diagnostic").unwrap().view().as_str(),
            "admin-diagnostic"
        );
        assert_eq!(table.resolve("/admin/settings").unwrap().view().as_str(), "admin-app");
        assert_eq!(table.resolve("/driver/dashboard").unwrap().view().as_str(), "driver-app");
        assert!(table.resolve("/nowhere").is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let routes = vec![
            RouteConfig::new("/*", "everything"),
            RouteConfig::new("/admin/*", "admin"),
        ];
        assert!(RouteTable::from_config(&routes).is_err());
    }
}
