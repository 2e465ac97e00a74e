//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation target (URL or path)
//!     → matcher.rs (normalize to a pathname, evaluate patterns)
//!     → router.rs (ordered table lookup)
//!     → Return: matched RouteEntry or no-match
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → config::validation (pattern syntax, duplicates, shadowing)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex: exact comparison and segment-aligned prefixes only
//! - Exact entries beat wildcards regardless of declaration order
//! - Among wildcards, declaration order is priority

pub mod matcher;
pub mod router;

pub use matcher::{match_path, normalize_path, parse_target, PatternError, RouteEntry};
pub use router::{RouteTable, ROOT_PATH};
