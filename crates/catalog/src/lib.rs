//! Collection catalogue core.
//!
//! This crate provides the two engines behind a collection catalogue:
//! - Hierarchical layout index and query engine (filter, name match, sort)
//! - Capacity-bounded file placement and storage rebalancing
//!
//! Around them sit the typed property model, per-library state and a
//! repository that resolves libraries and their storage roots.

pub mod config;
pub mod error;
pub mod item;
pub mod layout;
pub mod library;
pub mod property;
pub mod query;
pub mod repository;
pub mod storage;

// Re-export main types
pub use config::{load_or_create_config, CatalogConfig};
pub use error::{CatalogError, Result};
pub use item::Item;
pub use layout::{LayoutIndex, LayoutKey, LayoutNode, LayoutSequence};
pub use library::Library;
pub use property::{PropertyCatalog, PropertyDefinition, PropertyType, PropertyValue};
pub use query::{query, Query};
pub use repository::Repository;
pub use storage::{place_file, rebalance, RebalanceReport, StorageRoot, StorageStats};
