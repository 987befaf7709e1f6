//! A single collection: its properties, items, layout and cached index.

use crate::error::{CatalogError, Result};
use crate::item::Item;
use crate::layout::{LayoutIndex, LayoutSequence};
use crate::property::{PropertyCatalog, PropertyDefinition, PropertyType, PropertyValue};
use crate::query::Query;

/// One collection of items.
///
/// The layout index is derived state: it is rebuilt in full after every
/// change to the items or the layout and is never persisted.
#[derive(Debug, Clone)]
pub struct Library {
    name: String,
    properties: PropertyCatalog,
    items: Vec<Item>,
    layout: LayoutSequence,
    index: LayoutIndex,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: PropertyCatalog::new(),
            items: Vec::new(),
            layout: LayoutSequence::empty(),
            index: LayoutIndex::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyCatalog {
        &self.properties
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn layout(&self) -> &LayoutSequence {
        &self.layout
    }

    pub fn index(&self) -> &LayoutIndex {
        &self.index
    }

    pub fn define_property(&mut self, name: &str, kind: PropertyType) -> Result<()> {
        self.properties.define(name, kind)?;
        Ok(())
    }

    /// Drops a property and every value items hold for it.
    ///
    /// Properties that are part of the current layout cannot be removed.
    pub fn remove_property(&mut self, name: &str) -> Result<PropertyDefinition> {
        if self.layout.contains(name) {
            return Err(CatalogError::Validation(format!(
                "property {name} is part of the layout {}",
                self.layout
            )));
        }
        let definition = self
            .properties
            .remove(name)
            .ok_or_else(|| CatalogError::Validation(format!("unknown property: {name}")))?;
        for item in &mut self.items {
            item.clear(&definition.name);
        }
        self.rebuild_index();
        Ok(definition)
    }

    /// Replaces the layout with a '/'-delimited list of property names.
    ///
    /// On error the previous layout and index stay untouched.
    pub fn set_layout(&mut self, raw: &str) -> Result<()> {
        let layout = LayoutSequence::parse(raw, &self.properties)?;
        tracing::info!(library = %self.name, layout = %layout, "layout changed");
        self.layout = layout;
        self.rebuild_index();
        Ok(())
    }

    /// Adds an item with raw property values, returning its new id.
    ///
    /// Every value is validated before anything is stored.
    pub fn add_item(&mut self, name: &str, origin: &str, values: &[(&str, &str)]) -> Result<u64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "item name must not be empty".to_string(),
            ));
        }

        let id = self.next_item_id();
        let mut item = Item::new(id, name, origin.trim());
        for (property, raw) in values {
            let (definition, value) = self.parse_property_value(property, raw)?;
            item.set(&definition.name, value);
        }

        self.items.push(item);
        self.rebuild_index();
        Ok(id)
    }

    /// Sets (or, with blank input, clears) one property of an item.
    pub fn update_item(&mut self, id: u64, property: &str, raw: &str) -> Result<()> {
        let (definition, value) = self.parse_property_value(property, raw)?;
        let definition_name = definition.name.clone();
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CatalogError::ItemNotFound(id))?;
        item.set(&definition_name, value);
        self.rebuild_index();
        Ok(())
    }

    pub fn rename_item(&mut self, id: u64, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "item name must not be empty".to_string(),
            ));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CatalogError::ItemNotFound(id))?;
        item.name = name.to_string();
        self.rebuild_index();
        Ok(())
    }

    pub fn remove_item(&mut self, id: u64) -> Result<Item> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CatalogError::ItemNotFound(id))?;
        let item = self.items.remove(position);
        self.rebuild_index();
        Ok(item)
    }

    /// Swaps in a whole new item collection (for example one loaded from disk).
    ///
    /// Ids must be unique and every value must belong to a defined property
    /// and fit its type; otherwise nothing changes.
    pub fn replace_items(&mut self, items: Vec<Item>) -> Result<()> {
        let mut ids = items.iter().map(|item| item.id).collect::<Vec<_>>();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(CatalogError::Duplicate(format!("item id {}", pair[0])));
        }
        for item in &items {
            self.check_item_values(item)?;
        }
        self.items = items;
        self.rebuild_index();
        Ok(())
    }

    /// Filters, name-matches and sorts the items through the cached index.
    pub fn query(&self, filter: &str, sort: &str, name_filter: &str) -> Result<Vec<&Item>> {
        let query = Query::compile(filter, sort, name_filter)?;
        Ok(query.run(&self.items, &self.index, &self.properties))
    }

    fn parse_property_value(
        &self,
        property: &str,
        raw: &str,
    ) -> Result<(&PropertyDefinition, PropertyValue)> {
        let definition = self
            .properties
            .get(property)
            .ok_or_else(|| CatalogError::Validation(format!("unknown property: {property}")))?;
        let value = definition.kind.parse_value(raw).map_err(|error| match error {
            CatalogError::Validation(message) => {
                CatalogError::Validation(format!("{}: {message}", definition.name))
            }
            other => other,
        })?;
        Ok((definition, value))
    }

    fn check_item_values(&self, item: &Item) -> Result<()> {
        for (property, value) in item.properties() {
            let definition = self.properties.get(property).ok_or_else(|| {
                CatalogError::Validation(format!("item {}: unknown property {property}", item.id))
            })?;
            if !definition.kind.accepts(value) {
                return Err(CatalogError::Validation(format!(
                    "item {}: {value:?} is not a valid {} for {}",
                    item.id, definition.kind, definition.name
                )));
            }
        }
        Ok(())
    }

    fn next_item_id(&self) -> u64 {
        self.items.iter().map(|item| item.id).max().map_or(1, |max| max + 1)
    }

    fn rebuild_index(&mut self) {
        self.index = LayoutIndex::build(&self.items, &self.layout);
    }
}
