//! Filtering, name matching and ordering over a layout index.
//!
//! A query is three '/'-delimited strings:
//! - a filter sequence, one constraint per tree level (`a,b`, `low-high`, `*`)
//! - a sort sequence of property names, highest priority first
//! - a name filter of substrings, any of which may match
//!
//! [`Query::compile`] parses them once; [`Query::run`] walks the index.

mod engine;
mod filter;
mod name_filter;
mod sort;

pub use engine::{query, Query};
pub use filter::{FilterConstraint, FilterSequence, WILDCARD};
pub use name_filter::NameFilter;
pub use sort::SortSequence;
