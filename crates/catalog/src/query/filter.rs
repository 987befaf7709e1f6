//! Per-level filter constraints and the descent through the layout tree.

use std::collections::BTreeMap;

use crate::error::{CatalogError, Result};
use crate::layout::{LayoutIndex, LayoutKey, LayoutNode, SEQUENCE_DELIMITER};

/// Token accepting every value at its level.
pub const WILDCARD: &str = "*";

const VALUE_SEPARATOR: char = ',';
const RANGE_SEPARATOR: char = '-';

/// Constraint applied to the keys of one tree level.
///
/// Values and bounds are stored lowercased; matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterConstraint {
    Any,
    OneOf(Vec<String>),
    /// Inclusive textual range.
    Range { low: String, high: String },
}

impl FilterConstraint {
    /// Parses one filter element.
    ///
    /// A blank element or `*` accepts everything. An element containing `,`
    /// is a value set; otherwise an element with exactly one `-` past its
    /// first character is a range. Anything else, including a negative
    /// number such as `-5`, is a single accepted value.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == WILDCARD {
            return Ok(Self::Any);
        }

        if !trimmed.contains(VALUE_SEPARATOR) && !trimmed.starts_with(RANGE_SEPARATOR) {
            if let Some((low, high)) = trimmed.split_once(RANGE_SEPARATOR) {
                if !high.contains(RANGE_SEPARATOR) {
                    let (low, high) = (low.trim(), high.trim());
                    if low.is_empty() || high.is_empty() {
                        return Err(CatalogError::Validation(format!(
                            "filter range {trimmed:?} needs both a low and a high bound"
                        )));
                    }
                    return Ok(Self::Range {
                        low: low.to_lowercase(),
                        high: high.to_lowercase(),
                    });
                }
            }
        }

        let values = trimmed
            .split(VALUE_SEPARATOR)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        if values.iter().any(|value| value == WILDCARD) {
            return Ok(Self::Any);
        }
        if values.is_empty() {
            return Err(CatalogError::Validation(format!(
                "filter element {trimmed:?} has no values"
            )));
        }
        Ok(Self::OneOf(values))
    }

    /// Whether any decoded value of `key` satisfies the constraint.
    pub fn matches(&self, key: &LayoutKey) -> bool {
        match self {
            Self::Any => true,
            Self::OneOf(accepted) => key
                .values()
                .iter()
                .any(|value| accepted.contains(&value.to_lowercase())),
            Self::Range { low, high } => key.values().iter().any(|value| {
                let value = value.to_lowercase();
                low.as_str() <= value.as_str() && value.as_str() <= high.as_str()
            }),
        }
    }

    /// Whether items that have run out of tree levels pass this constraint.
    fn accepts_unkeyed(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Ordered per-level constraints, outermost level first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSequence {
    constraints: Vec<FilterConstraint>,
}

impl FilterSequence {
    /// Parses a '/'-delimited filter string. An empty string filters nothing.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let constraints = raw
            .split(SEQUENCE_DELIMITER)
            .map(FilterConstraint::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { constraints })
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[FilterConstraint] {
        &self.constraints
    }

    /// Returns the positions of every item selected by the sequence.
    ///
    /// Walks the tree one level per constraint. Subtrees of matching keys are
    /// merged by key into the next frontier; leaf items of matching keys move
    /// into an unkeyed bucket, which only a wildcard lets through. Once the
    /// constraints run out everything left is flattened depth-first, unkeyed
    /// items first.
    pub fn select(&self, index: &LayoutIndex) -> Vec<usize> {
        if self.constraints.is_empty() {
            return index.positions();
        }

        let mut frontier = Frontier::start(index.root());
        for constraint in &self.constraints {
            frontier = frontier.descend(constraint);
            if frontier.is_empty() {
                break;
            }
        }
        frontier.flatten()
    }
}

#[derive(Default)]
struct Frontier<'a> {
    keyed: BTreeMap<&'a LayoutKey, Vec<&'a LayoutNode>>,
    unkeyed: Vec<usize>,
}

impl<'a> Frontier<'a> {
    fn start(root: &'a LayoutNode) -> Self {
        let mut frontier = Self::default();
        frontier.absorb(root);
        frontier
    }

    fn absorb(&mut self, node: &'a LayoutNode) {
        match node {
            LayoutNode::Branch(children) => {
                for (key, child) in children {
                    self.keyed.entry(key).or_default().push(child);
                }
            }
            LayoutNode::Leaf(positions) => self.unkeyed.extend_from_slice(positions),
        }
    }

    fn descend(self, constraint: &FilterConstraint) -> Self {
        let mut next = Self::default();
        if constraint.accepts_unkeyed() {
            next.unkeyed = self.unkeyed;
        }
        for (key, nodes) in self.keyed {
            if !constraint.matches(key) {
                continue;
            }
            for node in nodes {
                next.absorb(node);
            }
        }
        next
    }

    fn is_empty(&self) -> bool {
        self.keyed.is_empty() && self.unkeyed.is_empty()
    }

    fn flatten(self) -> Vec<usize> {
        let mut out = self.unkeyed;
        for node in self.keyed.into_values().flatten() {
            node.collect_into(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::layout::LayoutSequence;
    use crate::property::{PropertyCatalog, PropertyType, PropertyValue};

    fn scalar(value: &str) -> PropertyValue {
        PropertyValue::Scalar(value.to_string())
    }

    fn fixture() -> (Vec<Item>, LayoutIndex) {
        let mut catalog = PropertyCatalog::new();
        catalog.define("genre", PropertyType::String).expect("genre");
        catalog.define("year", PropertyType::Integer).expect("year");
        let items = vec![
            Item::new(1, "a", "").with("genre", scalar("Fiction")).with("year", scalar("1990")),
            Item::new(2, "b", "").with("genre", scalar("fiction")).with("year", scalar("2001")),
            Item::new(3, "c", "").with("genre", scalar("history")).with("year", scalar("1990")),
            Item::new(4, "d", "").with("year", scalar("1995")),
        ];
        let layout = LayoutSequence::parse("genre/year", &catalog).expect("layout");
        let index = LayoutIndex::build(&items, &layout);
        (items, index)
    }

    fn select(raw: &str, index: &LayoutIndex) -> Vec<usize> {
        let mut positions = FilterSequence::parse(raw).expect("filter").select(index);
        positions.sort_unstable();
        positions
    }

    #[test]
    fn parses_constraint_forms() {
        assert_eq!(FilterConstraint::parse(" * ").expect("any"), FilterConstraint::Any);
        assert_eq!(
            FilterConstraint::parse("A, b").expect("set"),
            FilterConstraint::OneOf(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            FilterConstraint::parse("1990-2001").expect("range"),
            FilterConstraint::Range {
                low: "1990".to_string(),
                high: "2001".to_string()
            }
        );
        assert_eq!(
            FilterConstraint::parse("a-b-c").expect("single"),
            FilterConstraint::OneOf(vec!["a-b-c".to_string()])
        );
        assert!(FilterConstraint::parse("1990-").is_err());
    }

    #[test]
    fn leading_dash_is_a_single_value() {
        assert_eq!(
            FilterConstraint::parse("-5").expect("negative"),
            FilterConstraint::OneOf(vec!["-5".to_string()])
        );
        let key = LayoutKey::Value("-5".to_string());
        assert!(FilterConstraint::parse(" -5 ").expect("negative").matches(&key));
    }

    #[test]
    fn empty_filter_selects_everything() {
        let (items, index) = fixture();
        assert_eq!(select("", &index).len(), items.len());
    }

    #[test]
    fn value_sets_match_case_insensitively() {
        let (_, index) = fixture();
        assert_eq!(select("FICTION", &index), vec![0, 1]);
        assert_eq!(select("fiction,history/1990", &index), vec![0, 2]);
    }

    #[test]
    fn ranges_are_inclusive() {
        let (_, index) = fixture();
        assert_eq!(select("fiction/1990-2001", &index), vec![0, 1]);
        assert!(select("fiction/2002-2010", &index).is_empty());
        assert_eq!(select("*/1991-1999", &index), vec![3]);
    }

    #[test]
    fn unknown_value_excludes_subtree() {
        let (_, index) = fixture();
        assert!(select("poetry", &index).is_empty());
        assert!(select("fiction/1800", &index).is_empty());
    }

    #[test]
    fn deeper_than_tree_yields_nothing_unless_wildcard() {
        let (_, index) = fixture();
        assert!(select("fiction/1990/extra", &index).is_empty());
        assert_eq!(select("fiction/1990/*", &index), vec![0]);
    }

    #[test]
    fn flat_index_only_passes_wildcards() {
        let (items, _) = fixture();
        let index = LayoutIndex::build(&items, &LayoutSequence::empty());
        assert!(select("fiction", &index).is_empty());
        assert_eq!(select("*", &index), vec![0, 1, 2, 3]);
    }
}
