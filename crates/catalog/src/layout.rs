//! Hierarchical grouping of items.
//!
//! A [`LayoutSequence`] names the properties items are grouped by, outermost
//! first. [`LayoutIndex::build`] turns a flat item list into a tree whose
//! depth equals the sequence length:
//!
//! - `key` - canonical per-level keys derived from property values
//! - `sequence` - parsing and validation of '/'-delimited layouts
//! - `index` - the tree itself, rebuilt wholesale on every change

mod index;
mod key;
mod sequence;

pub use index::{LayoutIndex, LayoutNode};
pub use key::{LayoutKey, ABSENT_KEY_LABEL};
pub use sequence::{LayoutSequence, SEQUENCE_DELIMITER};
