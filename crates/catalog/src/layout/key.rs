//! Canonical per-level keys of the layout tree.

use std::fmt;

use crate::property::PropertyValue;

/// Display label of the reserved key for items lacking the property.
pub const ABSENT_KEY_LABEL: &str = "(none)";

/// Key of one node in the layout tree.
///
/// Lists keep their element order, so `[a, b]` and `[b, a]` are distinct
/// groups. The derived ordering places [`LayoutKey::Absent`] first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayoutKey {
    Absent,
    Value(String),
    Values(Vec<String>),
}

impl LayoutKey {
    pub fn from_value(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Scalar(value) => Self::Value(value.clone()),
            PropertyValue::List(values) => Self::Values(values.clone()),
            PropertyValue::Absent => Self::Absent,
        }
    }

    /// Decodes the key back into the values it was built from.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Value(value) => std::slice::from_ref(value),
            Self::Values(values) => values,
            Self::Absent => &[],
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.write_str(value),
            Self::Values(values) => f.write_str(&values.join(", ")),
            Self::Absent => f.write_str(ABSENT_KEY_LABEL),
        }
    }
}
