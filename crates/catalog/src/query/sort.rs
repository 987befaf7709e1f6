//! Multi-key ordering of query results.

use std::cmp::Ordering;

use crate::item::Item;
use crate::layout::SEQUENCE_DELIMITER;
use crate::property::{compare_values, PropertyCatalog, PropertyDefinition};

/// Property names to order by, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSequence {
    names: Vec<String>,
}

impl SortSequence {
    pub fn parse(raw: &str) -> Self {
        let names = raw
            .split(SEQUENCE_DELIMITER)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Looks the names up in `catalog`, dropping ones it does not define.
    pub fn resolve<'a>(&self, catalog: &'a PropertyCatalog) -> Vec<&'a PropertyDefinition> {
        self.names
            .iter()
            .filter_map(|name| {
                let definition = catalog.get(name);
                if definition.is_none() {
                    tracing::debug!(property = %name, "ignoring unknown sort property");
                }
                definition
            })
            .collect()
    }

    /// Stable sort; items equal on every key keep their relative order.
    pub fn sort(&self, items: &mut [&Item], catalog: &PropertyCatalog) {
        let keys = self.resolve(catalog);
        if keys.is_empty() {
            return;
        }
        items.sort_by(|left, right| compare_items(&keys, left, right));
    }
}

fn compare_items(keys: &[&PropertyDefinition], left: &Item, right: &Item) -> Ordering {
    keys.iter()
        .map(|key| compare_values(key.kind, left.value(&key.name), right.value(&key.name)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
