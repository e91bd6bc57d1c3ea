//! Route matching
//!
//! Patterns compile once at registration time; the [`RouteTable`] keeps them
//! in per-verb buckets and answers "which route handles this request" with
//! first-match-wins semantics, falling back to catch-all routes and finally
//! to a synthesized 404.

pub mod pattern;
pub mod route;
pub mod table;

pub use pattern::{PathParams, Pattern, PatternList, PatternParam, DEFAULT_PRIORITY};
pub use route::{PatternSource, Predicate, Route, RouteSpec};
pub use table::{RouteMatch, RouteTable, Verb};
