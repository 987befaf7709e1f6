//! Catalogued items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::property::{fold_name, PropertyValue};

/// A single catalogued item (book, disc, ...).
///
/// Property values are keyed by lowercased property name; a missing key
/// means the value is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    /// Where the item came from (a path, URL or free-form locator).
    pub origin: String,
    #[serde(default)]
    properties: BTreeMap<String, PropertyValue>,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            origin: origin.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly for constructing fixtures.
    pub fn with(mut self, property: &str, value: PropertyValue) -> Self {
        self.set(property, value);
        self
    }

    pub fn value(&self, property: &str) -> &PropertyValue {
        static ABSENT: PropertyValue = PropertyValue::Absent;
        self.properties
            .get(&property_key(property))
            .unwrap_or(&ABSENT)
    }

    /// Sets a value; storing [`PropertyValue::Absent`] clears it.
    pub fn set(&mut self, property: &str, value: PropertyValue) {
        let key = property_key(property);
        if value.is_absent() {
            self.properties.remove(&key);
        } else {
            self.properties.insert(key, value);
        }
    }

    pub fn clear(&mut self, property: &str) -> Option<PropertyValue> {
        self.properties.remove(&property_key(property))
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

fn property_key(name: &str) -> String {
    fold_name(name)
}
