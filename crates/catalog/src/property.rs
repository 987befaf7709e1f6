//! Typed property definitions and values.
//!
//! A collection declares its properties once in a [`PropertyCatalog`]; items
//! then carry [`PropertyValue`]s keyed by property name. Names are compared
//! case-insensitively everywhere.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Separator for list-typed values given as raw text.
pub const LIST_VALUE_SEPARATOR: char = ';';

/// Type tag of a property definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Decimal,
    Float,
    Bool,
    List,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::List => "list",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Float)
    }

    /// Validates raw text against this type and converts it into a value.
    ///
    /// Empty (or whitespace-only) input yields [`PropertyValue::Absent`].
    pub fn parse_value(self, raw: &str) -> Result<PropertyValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(PropertyValue::Absent);
        }

        match self {
            Self::String => Ok(PropertyValue::Scalar(trimmed.to_string())),
            Self::Integer => {
                trimmed.parse::<i64>().map_err(|_| {
                    CatalogError::Validation(format!("{trimmed:?} is not an integer"))
                })?;
                Ok(PropertyValue::Scalar(trimmed.to_string()))
            }
            Self::Decimal | Self::Float => {
                let value = trimmed.parse::<f64>().map_err(|_| {
                    CatalogError::Validation(format!("{trimmed:?} is not a {}", self.as_str()))
                })?;
                if !value.is_finite() {
                    return Err(CatalogError::Validation(format!(
                        "{trimmed:?} is not a finite {}",
                        self.as_str()
                    )));
                }
                Ok(PropertyValue::Scalar(trimmed.to_string()))
            }
            Self::Bool => {
                let value = parse_bool(trimmed).ok_or_else(|| {
                    CatalogError::Validation(format!("{trimmed:?} is not a boolean"))
                })?;
                Ok(PropertyValue::Scalar(value.to_string()))
            }
            Self::List => {
                let values = trimmed
                    .split(LIST_VALUE_SEPARATOR)
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                if values.is_empty() {
                    Ok(PropertyValue::Absent)
                } else {
                    Ok(PropertyValue::List(values))
                }
            }
        }
    }

    /// Whether an already-built value could have come from [`parse_value`].
    ///
    /// [`parse_value`]: Self::parse_value
    pub fn accepts(self, value: &PropertyValue) -> bool {
        match value {
            PropertyValue::Absent => true,
            PropertyValue::List(values) => {
                self == Self::List
                    && !values.is_empty()
                    && values
                        .iter()
                        .all(|value| !value.is_empty() && value.trim() == value)
            }
            PropertyValue::Scalar(text) => {
                self != Self::List
                    && text.trim() == text
                    && self
                        .parse_value(text)
                        .is_ok_and(|parsed| !parsed.is_absent())
            }
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "decimal" => Ok(Self::Decimal),
            "float" | "double" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "list" => Ok(Self::List),
            _ => Err(CatalogError::Validation(format!(
                "unknown property type: {raw}"
            ))),
        }
    }
}

/// Case folding shared by property lookups and item value keys.
pub(crate) fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// A value held by an item for one property.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    Scalar(String),
    List(Vec<String>),
    #[default]
    Absent,
}

impl PropertyValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the individual text values; a scalar yields one, absent none.
    pub fn texts(&self) -> &[String] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::List(values) => values,
            Self::Absent => &[],
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::List(values) => f.write_str(&values.join("; ")),
            Self::Absent => Ok(()),
        }
    }
}

/// Total order over values of one property.
///
/// Absent sorts before anything present. For numeric and bool properties,
/// values that parse come first and compare by number (`false` before
/// `true`). Lists compare element-wise; text order breaks every tie.
pub fn compare_values(kind: PropertyType, left: &PropertyValue, right: &PropertyValue) -> Ordering {
    match (left, right) {
        (PropertyValue::Absent, PropertyValue::Absent) => Ordering::Equal,
        (PropertyValue::Absent, _) => Ordering::Less,
        (_, PropertyValue::Absent) => Ordering::Greater,
        (PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => compare_scalars(kind, a, b),
        _ => {
            let (a, b) = (left.texts(), right.texts());
            for (x, y) in a.iter().zip(b) {
                let ordering = compare_scalars(kind, x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
    }
}

/// Values of a typed property that parse sort before those that do not;
/// parsed values compare by number (or bool), ties and unparsed values by
/// text.
fn compare_scalars(kind: PropertyType, left: &str, right: &str) -> Ordering {
    let typed = match kind {
        PropertyType::Integer => {
            compare_parsed(left.parse::<i64>().ok(), right.parse().ok(), Ord::cmp)
        }
        PropertyType::Decimal | PropertyType::Float => compare_parsed(
            left.parse::<f64>().ok(),
            right.parse().ok(),
            f64::total_cmp,
        ),
        PropertyType::Bool => compare_parsed(parse_bool(left), parse_bool(right), Ord::cmp),
        PropertyType::String | PropertyType::List => Ordering::Equal,
    };
    typed.then_with(|| compare_text(left, right))
}

fn compare_parsed<T>(
    left: Option<T>,
    right: Option<T>,
    compare: impl FnOnce(&T, &T) -> Ordering,
) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => compare(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

/// A named, typed property of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub kind: PropertyType,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, kind: PropertyType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        fold_name(&self.name) == fold_name(name)
    }
}

/// Ordered set of property definitions with case-insensitive unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCatalog {
    definitions: Vec<PropertyDefinition>,
}

impl PropertyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, kind: PropertyType) -> Result<&PropertyDefinition> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "property name must not be empty".to_string(),
            ));
        }
        if name.contains('/') {
            return Err(CatalogError::Validation(format!(
                "property name {name:?} must not contain '/'"
            )));
        }
        if self.contains(name) {
            return Err(CatalogError::Duplicate(format!("property {name}")));
        }
        self.definitions.push(PropertyDefinition::new(name, kind));
        Ok(&self.definitions[self.definitions.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDefinition> {
        self.definitions
            .iter()
            .find(|definition| definition.matches_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyDefinition> {
        let position = self
            .definitions
            .iter()
            .position(|definition| definition.matches_name(name))?;
        Some(self.definitions.remove(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_tags_case_insensitively() {
        assert_eq!("Integer".parse::<PropertyType>().expect("int"), PropertyType::Integer);
        assert_eq!("LIST".parse::<PropertyType>().expect("list"), PropertyType::List);
        assert!("blob".parse::<PropertyType>().is_err());
    }

    #[test]
    fn parse_value_validates_by_type() {
        assert_eq!(
            PropertyType::Integer.parse_value(" 1990 ").expect("int"),
            PropertyValue::Scalar("1990".to_string())
        );
        assert!(PropertyType::Integer.parse_value("19.5").is_err());
        assert!(PropertyType::Float.parse_value("NaN").is_err());
        assert_eq!(
            PropertyType::Bool.parse_value("Yes").expect("bool"),
            PropertyValue::Scalar("true".to_string())
        );
        assert_eq!(
            PropertyType::List.parse_value("b; a ;;c").expect("list"),
            PropertyValue::List(vec!["b".to_string(), "a".to_string(), "c".to_string()])
        );
        assert_eq!(
            PropertyType::String.parse_value("   ").expect("empty"),
            PropertyValue::Absent
        );
    }

    #[test]
    fn absent_sorts_first() {
        let present = PropertyValue::Scalar("a".to_string());
        assert_eq!(
            compare_values(PropertyType::String, &PropertyValue::Absent, &present),
            Ordering::Less
        );
        assert_eq!(
            compare_values(PropertyType::String, &present, &PropertyValue::Absent),
            Ordering::Greater
        );
    }

    #[test]
    fn numeric_properties_compare_by_number() {
        let nine = PropertyValue::Scalar("9".to_string());
        let ten = PropertyValue::Scalar("10".to_string());
        assert_eq!(compare_values(PropertyType::Integer, &nine, &ten), Ordering::Less);
        assert_eq!(compare_values(PropertyType::String, &nine, &ten), Ordering::Greater);
    }

    #[test]
    fn lists_compare_element_wise() {
        let short = PropertyValue::List(vec!["a".to_string()]);
        let long = PropertyValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(compare_values(PropertyType::List, &short, &long), Ordering::Less);
    }

    #[test]
    fn catalog_names_are_case_insensitive() {
        let mut catalog = PropertyCatalog::new();
        catalog.define("Genre", PropertyType::String).expect("define");
        assert!(catalog.contains("genre"));
        assert!(matches!(
            catalog.define("GENRE", PropertyType::List),
            Err(CatalogError::Duplicate(_))
        ));
        assert!(matches!(
            catalog.define("  ", PropertyType::List),
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(catalog.remove("gEnRe").map(|d| d.kind), Some(PropertyType::String));
        assert!(catalog.is_empty());
    }

    #[test]
    fn unparsed_values_sort_after_parsed_ones() {
        let values = ["9", "10", "1a", "x", "-3", "5a", "12", "2"]
            .iter()
            .cycle()
            .take(200)
            .map(|text| PropertyValue::Scalar(text.to_string()))
            .collect::<Vec<_>>();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| compare_values(PropertyType::Integer, a, b));

        let mut distinct = sorted.iter().map(ToString::to_string).collect::<Vec<_>>();
        distinct.dedup();
        assert_eq!(distinct, vec!["-3", "2", "9", "10", "12", "1a", "5a", "x"]);
        for pair in sorted.windows(2) {
            assert_ne!(
                compare_values(PropertyType::Integer, &pair[0], &pair[1]),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn equal_numbers_fall_back_to_text() {
        let plain = PropertyValue::Scalar("1.5".to_string());
        let padded = PropertyValue::Scalar("1.50".to_string());
        assert_eq!(compare_values(PropertyType::Decimal, &plain, &padded), Ordering::Less);
        assert_eq!(compare_values(PropertyType::Decimal, &padded, &plain), Ordering::Greater);
    }

    #[test]
    fn accepts_only_values_parse_value_could_build() {
        let year = |text: &str| PropertyValue::Scalar(text.to_string());
        assert!(PropertyType::Integer.accepts(&year("1990")));
        assert!(PropertyType::Integer.accepts(&PropertyValue::Absent));
        assert!(!PropertyType::Integer.accepts(&year("5a")));
        assert!(!PropertyType::Integer.accepts(&year(" 12")));
        assert!(!PropertyType::Integer.accepts(&PropertyValue::List(vec!["1".to_string()])));
        assert!(PropertyType::List.accepts(&PropertyValue::List(vec!["a".to_string()])));
        assert!(!PropertyType::List.accepts(&PropertyValue::List(Vec::new())));
        assert!(!PropertyType::List.accepts(&year("a")));
    }

    #[test]
    fn non_ascii_names_fold_case() {
        let mut catalog = PropertyCatalog::new();
        catalog.define("année", PropertyType::String).expect("define");
        assert!(matches!(
            catalog.define("ANNÉE", PropertyType::Integer),
            Err(CatalogError::Duplicate(_))
        ));
        assert_eq!(catalog.get("Année").map(|d| d.kind), Some(PropertyType::String));
        assert_eq!(catalog.len(), 1);
    }
}
