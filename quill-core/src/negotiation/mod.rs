//! Content negotiation
//!
//! Accept-style headers are parsed into [`AcceptedList`]s of weighted
//! [`AcceptEntry`] values. The `Accept` header uses media-type matching
//! ([`ContentType`]); language, charset and encoding lists use plain tokens.
//!
//! # Example
//!
//! ```rust
//! use quill_core::negotiation::AcceptedList;
//!
//! let languages = AcceptedList::tokens("fr;q=0.9, en");
//! assert_eq!(languages.get_highest_priority_for(&["fr", "en"]), Some("en"));
//! ```

pub mod accepted;
pub mod content_type;

pub use accepted::{AcceptEntry, AcceptedList, MatchStrategy};
pub use content_type::{ContentType, DEFAULT_CHARSET};
