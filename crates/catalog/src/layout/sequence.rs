//! Layout sequence parsing and validation.

use std::ops::Deref;

use crate::error::{CatalogError, Result};
use crate::property::{PropertyCatalog, PropertyDefinition};

/// Separator between elements of layout, filter and sort sequences.
pub const SEQUENCE_DELIMITER: char = '/';

/// Ordered grouping properties; the length fixes the tree depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutSequence {
    properties: Vec<PropertyDefinition>,
}

impl LayoutSequence {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a '/'-delimited list of property names.
    ///
    /// Every name must exist in `catalog` and appear at most once. Blank
    /// elements are skipped, so an empty string yields an empty layout.
    pub fn parse(raw: &str, catalog: &PropertyCatalog) -> Result<Self> {
        let mut properties: Vec<PropertyDefinition> = Vec::new();
        for name in raw
            .split(SEQUENCE_DELIMITER)
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            let definition = catalog.get(name).ok_or_else(|| {
                CatalogError::Validation(format!("unknown layout property: {name}"))
            })?;
            if properties.iter().any(|existing| existing.matches_name(name)) {
                return Err(CatalogError::Validation(format!(
                    "layout property {name} listed more than once"
                )));
            }
            properties.push(definition.clone());
        }
        Ok(Self { properties })
    }

    pub fn depth(&self) -> usize {
        self.properties.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties
            .iter()
            .any(|definition| definition.matches_name(name))
    }
}

impl Deref for LayoutSequence {
    type Target = [PropertyDefinition];

    fn deref(&self) -> &Self::Target {
        &self.properties
    }
}

impl std::fmt::Display for LayoutSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .properties
            .iter()
            .map(|definition| definition.name.as_str())
            .collect::<Vec<_>>();
        f.write_str(&names.join("/"))
    }
}
