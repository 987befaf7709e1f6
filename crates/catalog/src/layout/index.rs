//! The layout tree.
//!
//! Leaves hold positions into the item slice the index was built from,
//! the same way slab indices stand in for nodes elsewhere. The index is only
//! valid for that exact slice and must be rebuilt whenever it changes.

use std::collections::BTreeMap;

use super::key::LayoutKey;
use super::sequence::LayoutSequence;
use crate::item::Item;
use crate::property::PropertyDefinition;

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    /// Intermediate level keyed by the value of that level's property.
    Branch(BTreeMap<LayoutKey, LayoutNode>),
    /// Unordered bag of item positions.
    Leaf(Vec<usize>),
}

impl LayoutNode {
    /// Appends every item position below this node, depth-first.
    pub fn collect_into(&self, out: &mut Vec<usize>) {
        match self {
            Self::Leaf(positions) => out.extend_from_slice(positions),
            Self::Branch(children) => {
                for child in children.values() {
                    child.collect_into(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutIndex {
    root: LayoutNode,
    depth: usize,
    len: usize,
}

impl Default for LayoutIndex {
    fn default() -> Self {
        Self {
            root: LayoutNode::Leaf(Vec::new()),
            depth: 0,
            len: 0,
        }
    }
}

impl LayoutIndex {
    /// Groups `items` by `layout`, one tree level per layout property.
    ///
    /// An empty layout produces a single leaf holding every item in order.
    pub fn build(items: &[Item], layout: &LayoutSequence) -> Self {
        let depth = layout.depth();
        if depth == 0 {
            return Self {
                root: LayoutNode::Leaf((0..items.len()).collect()),
                depth,
                len: items.len(),
            };
        }

        let mut root = BTreeMap::new();
        for (position, item) in items.iter().enumerate() {
            insert_item(&mut root, layout, item, position);
        }

        tracing::debug!(
            items = items.len(),
            depth,
            groups = root.len(),
            layout = %layout,
            "built layout index"
        );

        Self {
            root: LayoutNode::Branch(root),
            depth,
            len: items.len(),
        }
    }

    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of items the index was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every item position, depth-first in key order.
    pub fn positions(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        self.root.collect_into(&mut out);
        out
    }
}

fn insert_item(
    level: &mut BTreeMap<LayoutKey, LayoutNode>,
    properties: &[PropertyDefinition],
    item: &Item,
    position: usize,
) {
    let Some((property, rest)) = properties.split_first() else {
        return;
    };
    let key = LayoutKey::from_value(item.value(&property.name));
    if rest.is_empty() {
        if let LayoutNode::Leaf(positions) = level
            .entry(key)
            .or_insert_with(|| LayoutNode::Leaf(Vec::new()))
        {
            positions.push(position);
        }
    } else if let LayoutNode::Branch(children) = level
        .entry(key)
        .or_insert_with(|| LayoutNode::Branch(BTreeMap::new()))
    {
        insert_item(children, rest, item, position);
    }
}
