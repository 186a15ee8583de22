//! Fresh identifiers and display colors for new nodes.

use crate::node::{LayoutNode, NodeId};

/// Prefix of every identifier minted by a [`NodeFactory`].
pub const GENERATED_ID_PREFIX: &str = "node-";

/// Pastel tags assigned to newly occupied cells, in rotation order.
pub const COMPONENT_PALETTE: [&str; 8] = [
    "#e0f2fe", "#dbeafe", "#f0f9ff", "#eff6ff", "#eefff5", "#fdf2f8", "#f5f3ff", "#fff7ed",
];

/// Deterministic source of node ids and component colors.
///
/// Ids have the form `node-<n>`. A factory created with
/// [`for_tree`](Self::for_tree) starts past every generated id already in
/// the tree, so ids stay unique after loading a persisted layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFactory {
    next: u64,
    color_cursor: usize,
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self {
            next: 1,
            color_cursor: 0,
        }
    }
}

impl NodeFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose ids cannot collide with any id in `tree`.
    #[must_use]
    pub fn for_tree(tree: &LayoutNode) -> Self {
        let mut factory = Self::default();
        factory.observe(tree);
        factory
    }

    /// Advance past every generated id present in `tree`.
    pub fn observe(&mut self, tree: &LayoutNode) {
        let max_seen = tree
            .iter()
            .filter_map(|node| generated_ordinal(&node.id))
            .max();
        if let Some(max_seen) = max_seen {
            self.next = self.next.max(max_seen.saturating_add(1));
        }
    }

    /// Ordinal the next id will carry.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Mint a fresh id.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(format!("{GENERATED_ID_PREFIX}{}", self.next));
        self.next = self.next.saturating_add(1);
        id
    }

    /// Next color in palette rotation.
    pub fn next_color(&mut self) -> String {
        let color = COMPONENT_PALETTE[self.color_cursor % COMPONENT_PALETTE.len()];
        self.color_cursor = (self.color_cursor + 1) % COMPONENT_PALETTE.len();
        color.to_string()
    }
}

fn generated_ordinal(id: &NodeId) -> Option<u64> {
    id.as_str()
        .strip_prefix(GENERATED_ID_PREFIX)
        .and_then(|digits| digits.parse().ok())
}
