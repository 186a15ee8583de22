//! Read-only queries over a layout tree.

use std::collections::BTreeSet;

use crate::node::{LayoutNode, NodeContent, NodeId};

/// Depth-first, pre-order iterator over a subtree.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    stack: Vec<&'a LayoutNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a LayoutNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl LayoutNode {
    /// Visit every node of the subtree, parents before children.
    #[must_use]
    pub fn iter(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }

    /// Visit every leaf of the subtree, in display order.
    pub fn leaves(&self) -> impl Iterator<Item = &LayoutNode> {
        self.iter().filter(|node| node.is_leaf())
    }

    /// Lookup a node by id.
    #[must_use]
    pub fn find(&self, id: &NodeId) -> Option<&LayoutNode> {
        self.iter().find(|node| node.id == *id)
    }

    /// Mutable lookup by id.
    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut LayoutNode> {
        if self.id == *id {
            return Some(self);
        }
        match &mut self.content {
            NodeContent::Leaf(_) => None,
            NodeContent::Container(container) => container
                .children
                .iter_mut()
                .find_map(|child| child.find_mut(id)),
        }
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Container whose direct children include `id`.
    #[must_use]
    pub fn parent_of(&self, id: &NodeId) -> Option<&LayoutNode> {
        self.iter()
            .find(|node| node.children().iter().any(|child| child.id == *id))
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(LayoutNode::depth)
            .max()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Labels of every component currently placed in the subtree.
    #[must_use]
    pub fn used_component_types(&self) -> BTreeSet<String> {
        used_component_types(self)
    }
}

/// Labels of every component placed anywhere in `tree`.
///
/// Each leaf is visited once; empty leaves contribute nothing.
#[must_use]
pub fn used_component_types(tree: &LayoutNode) -> BTreeSet<String> {
    tree.leaves()
        .filter_map(LayoutNode::component_type)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ContainerKind, LeafContent};

    fn leaf(id: &str, weight: f64, label: Option<&str>) -> LayoutNode {
        let content = match label {
            Some(label) => LeafContent::occupied(label, "#e0f2fe"),
            None => LeafContent::empty(),
        };
        LayoutNode::leaf(NodeId::new(id), weight, content)
    }

    // outer(col)[ a, inner(row)[ b, c ] ]
    fn nested() -> LayoutNode {
        LayoutNode::container(
            NodeId::new("outer"),
            100.0,
            ContainerKind::Col,
            vec![
                leaf("a", 50.0, Some("Camera")),
                LayoutNode::container(
                    NodeId::new("inner"),
                    50.0,
                    ContainerKind::Row,
                    vec![leaf("b", 50.0, Some("Traces")), leaf("c", 50.0, None)],
                ),
            ],
        )
    }

    #[test]
    fn iter_is_preorder() {
        let tree = nested();
        let order: Vec<&str> = tree.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(order, vec!["outer", "a", "inner", "b", "c"]);
    }

    #[test]
    fn leaves_in_display_order() {
        let tree = nested();
        let order: Vec<&str> = tree.leaves().map(|node| node.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn find_and_parent_are_derived_from_position() {
        let tree = nested();
        assert_eq!(tree.find(&NodeId::new("c")).map(|n| n.weight), Some(50.0));
        assert!(tree.find(&NodeId::new("missing")).is_none());
        assert_eq!(
            tree.parent_of(&NodeId::new("c")).map(|n| n.id.as_str()),
            Some("inner")
        );
        assert_eq!(
            tree.parent_of(&NodeId::new("inner")).map(|n| n.id.as_str()),
            Some("outer")
        );
        assert!(tree.parent_of(&NodeId::new("outer")).is_none());
    }

    #[test]
    fn find_mut_reaches_nested_nodes() {
        let mut tree = nested();
        if let Some(node) = tree.find_mut(&NodeId::new("b")) {
            node.weight = 70.0;
        }
        assert_eq!(tree.find(&NodeId::new("b")).map(|n| n.weight), Some(70.0));
    }

    #[test]
    fn depth_and_count() {
        let tree = nested();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(LayoutNode::blank_root().depth(), 1);
    }

    #[test]
    fn used_component_types_skips_empty_leaves() {
        let used = nested().used_component_types();
        assert_eq!(
            used.into_iter().collect::<Vec<_>>(),
            vec!["Camera".to_string(), "Traces".to_string()]
        );
        assert!(used_component_types(&LayoutNode::blank_root()).is_empty());
    }
}
