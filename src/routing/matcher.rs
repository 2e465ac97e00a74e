//! Path matching logic.
//!
//! # Responsibilities
//! - Normalize navigation targets to a canonical pathname
//! - Parse route patterns (exact or trailing `/*` wildcard)
//! - Pick the matching entry from an ordered table
//!
//! # Design Decisions
//! - Paths are case-sensitive
//! - A wildcard matches its own prefix and anything nested below it, but
//!   only on segment boundaries (`/admin/*` does not match `/administrator`)
//! - Matching is pure and allocation-free, safe to call on every render

use thiserror::Error;
use url::Url;

use crate::dispatch::ViewKey;

/// Errors in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route pattern is empty")]
    Empty,

    #[error("route pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("route pattern `{0}` may only use `*` as a trailing `/*`")]
    MisplacedWildcard(String),
}

/// Canonical form of a pathname: leading slash, no empty segments, no
/// trailing slash except for the root.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.trim().split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Reduce a navigation target (absolute URL, path with query or fragment,
/// or relative path) to a normalized pathname.
pub fn parse_target(target: &str) -> Result<String, url::ParseError> {
    let base = Url::parse("http://localhost/")?;
    let url = base.join(target.trim())?;
    Ok(normalize_path(url.path()))
}

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pattern: String,
    /// Exact path, or the wildcard's prefix without the trailing `/*`.
    prefix: String,
    is_wildcard: bool,
    view: ViewKey,
}

impl RouteEntry {
    pub fn parse(pattern: &str, view: ViewKey) -> Result<Self, PatternError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let (prefix, is_wildcard) = match pattern.strip_suffix("/*") {
            Some(base) => {
                let base = normalize_path(base);
                // `/*` covers everything; its prefix is the empty string
                let prefix = if base == "/" { String::new() } else { base };
                (prefix, true)
            }
            None => (normalize_path(pattern), false),
        };
        if prefix.contains('*') {
            return Err(PatternError::MisplacedWildcard(pattern.to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            prefix,
            is_wildcard,
            view,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    pub fn view(&self) -> &ViewKey {
        &self.view
    }

    /// Exact entries only: `path` equals the pattern.
    pub fn matches_exactly(&self, path: &str) -> bool {
        !self.is_wildcard && self.prefix == path
    }

    /// Wildcard entries only: `path` is the prefix or nested below it.
    pub fn matches_wildcard(&self, path: &str) -> bool {
        if !self.is_wildcard {
            return false;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matches_exactly(path) || self.matches_wildcard(path)
    }
}

/// Find the entry for `path`. Exact entries win; otherwise the first
/// matching wildcard in table order.
pub fn match_path<'a>(path: &str, table: &'a [RouteEntry]) -> Option<&'a RouteEntry> {
    table
        .iter()
        .find(|entry| entry.matches_exactly(path))
        .or_else(|| table.iter().find(|entry| entry.matches_wildcard(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pattern: &str, view: &'static str) -> RouteEntry {
        RouteEntry::parse(pattern, ViewKey::from_static(view)).unwrap()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/driver/"), "/driver");
        assert_eq!(normalize_path("driver//trips"), "/driver/trips");
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("/admin/settings?tab=2#top").unwrap(), "/admin/settings");
        assert_eq!(parse_target("https://rides.example/driver/").unwrap(), "/driver");
        assert_eq!(parse_target("passenger").unwrap(), "/passenger");
    }

    #[test]
    fn test_pattern_errors() {
        let view = ViewKey::from_static("v");
        assert_eq!(RouteEntry::parse("", view.clone()), Err(PatternError::Empty));
        assert!(matches!(
            RouteEntry::parse("admin", view.clone()),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            RouteEntry::parse("/admin/*/x", view.clone()),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            RouteEntry::parse("/adm*", view),
            Err(PatternError::MisplacedWildcard(_))
        ));
    }

    #[test]
    fn test_wildcard_respects_segment_boundaries() {
        let admin = entry("/admin/*", "admin");
        assert!(admin.matches("/admin"));
        assert!(admin.matches("/admin/settings"));
        assert!(admin.matches("/admin/a/b/c"));
        assert!(!admin.matches("/administrator"));
        assert!(!admin.matches("/"));

        let all = entry("/*", "all");
        assert!(all.matches("/"));
        assert!(all.matches("/anything/at/all"));
    }

    #[test]
    fn test_exact_beats_earlier_wildcard() {
        let table = vec![entry("/admin/*", "B"), entry("/admin/diagnostic", "A")];
        let found = match_path("/admin/diagnostic", &table).unwrap();
        assert_eq!(found.view().as_str(), "A");
    }

    #[test]
    fn test_first_wildcard_wins() {
        let table = vec![
            entry("/admin/diagnostic", "A"),
            entry("/admin/*", "B"),
            entry("/*", "C"),
        ];
        assert_eq!(match_path("/admin/diagnostic", &table).unwrap().view().as_str(), "A");
        assert_eq!(match_path("/admin/users", &table).unwrap().view().as_str(), "B");
        assert_eq!(match_path("/ride", &table).unwrap().view().as_str(), "C");
    }

    #[test]
    fn test_no_match() {
        let table = vec![entry("/driver/*", "D"), entry("/", "root")];
        assert!(match_path("/unknown", &table).is_none());
        assert_eq!(match_path("/", &table).unwrap().view().as_str(), "root");
    }
}
