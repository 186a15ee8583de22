//! Layout tree model.
//!
//! A [`LayoutNode`] is either a leaf (optionally occupied by a placed
//! component) or a container stacking two or more children along one axis.
//! Children are exclusively owned by their container, so the parent of a
//! node is always derived from its position and never stored.
//!
//! The persisted shape is the flat [`LayoutNodeRecord`]:
//!
//! ```json
//! {"id": "node-3", "kind": "col", "weight": 100, "children": [
//!     {"id": "root", "kind": "leaf", "weight": 50, "componentType": "Camera"},
//!     {"id": "node-2", "kind": "leaf", "weight": 50}
//! ]}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the canonical blank root leaf.
pub const ROOT_NODE_ID: &str = "root";

/// Opaque, stable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Identifier of the blank root leaf.
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_NODE_ID.to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NodeId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Axis of a split gesture.
///
/// `Horizontal` places the new cell beside the target (side by side);
/// `Vertical` stacks it above or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

impl SplitAxis {
    /// Container kind produced by splitting along this axis.
    #[must_use]
    pub const fn container_kind(self) -> ContainerKind {
        match self {
            Self::Horizontal => ContainerKind::Col,
            Self::Vertical => ContainerKind::Row,
        }
    }
}

/// How a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Children stacked vertically.
    Row,
    /// Children placed side by side.
    Col,
}

impl ContainerKind {
    /// Split axis that produces this container kind.
    #[must_use]
    pub const fn axis(self) -> SplitAxis {
        match self {
            Self::Row => SplitAxis::Vertical,
            Self::Col => SplitAxis::Horizontal,
        }
    }
}

/// Node discriminator used by the persisted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[serde(alias = "component")]
    Leaf,
    Row,
    Col,
}

impl From<ContainerKind> for NodeKind {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Row => Self::Row,
            ContainerKind::Col => Self::Col,
        }
    }
}

/// Payload of a leaf cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafContent {
    /// Placed component label; `None` means the cell is unoccupied.
    pub component_type: Option<String>,
    /// Display tag assigned when the cell was first occupied.
    pub component_color: Option<String>,
}

impl LeafContent {
    /// An unoccupied cell.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            component_type: None,
            component_color: None,
        }
    }

    /// A cell holding `component_type`, tagged with `color`.
    #[must_use]
    pub fn occupied(component_type: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            component_type: Some(component_type.into()),
            component_color: Some(color.into()),
        }
    }

    /// True when no component is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.component_type.is_none()
    }
}

/// Children of a container, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub kind: ContainerKind,
    pub children: Vec<LayoutNode>,
}

/// Node payload variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Leaf(LeafContent),
    Container(Container),
}

/// One node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutNodeRecord", into = "LayoutNodeRecord")]
pub struct LayoutNode {
    pub id: NodeId,
    /// Proportional share among siblings. Ignored for the root.
    pub weight: f64,
    pub content: NodeContent,
}

impl LayoutNode {
    /// The blank canvas: a single unoccupied root leaf.
    #[must_use]
    pub fn blank_root() -> Self {
        Self::leaf(NodeId::root(), 100.0, LeafContent::empty())
    }

    #[must_use]
    pub fn leaf(id: NodeId, weight: f64, content: LeafContent) -> Self {
        Self {
            id,
            weight,
            content: NodeContent::Leaf(content),
        }
    }

    #[must_use]
    pub fn container(
        id: NodeId,
        weight: f64,
        kind: ContainerKind,
        children: Vec<LayoutNode>,
    ) -> Self {
        Self {
            id,
            weight,
            content: NodeContent::Container(Container { kind, children }),
        }
    }

    /// Persisted discriminator for this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match &self.content {
            NodeContent::Leaf(_) => NodeKind::Leaf,
            NodeContent::Container(container) => container.kind.into(),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Leaf(_))
    }

    /// Direct children; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[LayoutNode] {
        match &self.content {
            NodeContent::Leaf(_) => &[],
            NodeContent::Container(container) => &container.children,
        }
    }

    /// Placed component label, if this is an occupied leaf.
    #[must_use]
    pub fn component_type(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Leaf(leaf) => leaf.component_type.as_deref(),
            NodeContent::Container(_) => None,
        }
    }

    #[must_use]
    pub fn component_color(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Leaf(leaf) => leaf.component_color.as_deref(),
            NodeContent::Container(_) => None,
        }
    }

    /// True for a leaf with nothing placed in it.
    #[must_use]
    pub fn is_empty_leaf(&self) -> bool {
        matches!(&self.content, NodeContent::Leaf(leaf) if leaf.is_empty())
    }

    /// Deterministic structural hash of the subtree.
    ///
    /// Used in log fields and history diagnostics; weights are hashed by
    /// their bit patterns.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix(hash: &mut u64, byte: u8) {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(PRIME);
        }

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                mix(hash, *byte);
            }
        }

        fn mix_u64(hash: &mut u64, value: u64) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_str(hash: &mut u64, value: &str) {
            mix_u64(hash, value.len() as u64);
            mix_bytes(hash, value.as_bytes());
        }

        fn mix_opt_str(hash: &mut u64, value: Option<&str>) {
            match value {
                Some(value) => {
                    mix(hash, 1);
                    mix_str(hash, value);
                }
                None => mix(hash, 0),
            }
        }

        fn mix_node(hash: &mut u64, node: &LayoutNode) {
            mix_str(hash, node.id.as_str());
            mix_u64(hash, node.weight.to_bits());
            match &node.content {
                NodeContent::Leaf(leaf) => {
                    mix(hash, 1);
                    mix_opt_str(hash, leaf.component_type.as_deref());
                    mix_opt_str(hash, leaf.component_color.as_deref());
                }
                NodeContent::Container(container) => {
                    let kind_byte = match container.kind {
                        ContainerKind::Row => 2,
                        ContainerKind::Col => 3,
                    };
                    mix(hash, kind_byte);
                    mix_u64(hash, container.children.len() as u64);
                    for child in &container.children {
                        mix_node(hash, child);
                    }
                }
            }
        }

        let mut hash = OFFSET_BASIS;
        mix_node(&mut hash, self);
        hash
    }
}

/// Flat persisted form of a [`LayoutNode`].
///
/// `children` is omitted for leaves and component fields are omitted when
/// absent, so absent-vs-empty survives a round trip. Unknown fields (such as
/// a stored `parentId`) are ignored when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNodeRecord {
    pub id: NodeId,
    #[serde(alias = "type")]
    pub kind: NodeKind,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<LayoutNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_color: Option<String>,
}

impl From<LayoutNode> for LayoutNodeRecord {
    fn from(node: LayoutNode) -> Self {
        match node.content {
            NodeContent::Leaf(leaf) => Self {
                id: node.id,
                kind: NodeKind::Leaf,
                weight: node.weight,
                children: None,
                component_type: leaf.component_type,
                component_color: leaf.component_color,
            },
            NodeContent::Container(container) => Self {
                id: node.id,
                kind: container.kind.into(),
                weight: node.weight,
                children: Some(container.children),
                component_type: None,
                component_color: None,
            },
        }
    }
}

impl TryFrom<LayoutNodeRecord> for LayoutNode {
    type Error = LayoutModelError;

    fn try_from(record: LayoutNodeRecord) -> Result<Self, Self::Error> {
        let kind = match record.kind {
            NodeKind::Leaf => {
                if record.children.is_some() {
                    return Err(LayoutModelError::LeafWithChildren { node_id: record.id });
                }
                return Ok(Self::leaf(
                    record.id,
                    record.weight,
                    LeafContent {
                        component_type: record.component_type,
                        component_color: record.component_color,
                    },
                ));
            }
            NodeKind::Row => ContainerKind::Row,
            NodeKind::Col => ContainerKind::Col,
        };
        if record.component_type.is_some() {
            return Err(LayoutModelError::ContainerWithComponent { node_id: record.id });
        }
        let Some(children) = record.children else {
            return Err(LayoutModelError::ContainerWithoutChildren { node_id: record.id });
        };
        Ok(Self::container(record.id, record.weight, kind, children))
    }
}

/// Structural or invariant violations of a layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutModelError {
    LeafWithChildren {
        node_id: NodeId,
    },
    ContainerWithoutChildren {
        node_id: NodeId,
    },
    ContainerWithComponent {
        node_id: NodeId,
    },
    UnderfilledContainer {
        node_id: NodeId,
        children: usize,
    },
    InvalidWeight {
        node_id: NodeId,
        weight: f64,
    },
    WeightSumMismatch {
        node_id: NodeId,
        sum: f64,
        expected: f64,
    },
    BelowFloor {
        node_id: NodeId,
        weight: f64,
        floor: f64,
    },
    DuplicateNodeId {
        node_id: NodeId,
    },
}

impl LayoutModelError {
    /// Node the violation was found at.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::LeafWithChildren { node_id }
            | Self::ContainerWithoutChildren { node_id }
            | Self::ContainerWithComponent { node_id }
            | Self::UnderfilledContainer { node_id, .. }
            | Self::InvalidWeight { node_id, .. }
            | Self::WeightSumMismatch { node_id, .. }
            | Self::BelowFloor { node_id, .. }
            | Self::DuplicateNodeId { node_id } => node_id,
        }
    }
}

impl fmt::Display for LayoutModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeafWithChildren { node_id } => {
                write!(f, "leaf node {node_id} must not carry a children list")
            }
            Self::ContainerWithoutChildren { node_id } => {
                write!(f, "container node {node_id} has no children list")
            }
            Self::ContainerWithComponent { node_id } => {
                write!(f, "container node {node_id} must not carry a component")
            }
            Self::UnderfilledContainer { node_id, children } => write!(
                f,
                "container node {node_id} has {children} children (expected at least 2)"
            ),
            Self::InvalidWeight { node_id, weight } => {
                write!(f, "node {node_id} has invalid weight {weight}")
            }
            Self::WeightSumMismatch {
                node_id,
                sum,
                expected,
            } => write!(
                f,
                "children of container {node_id} sum to {sum} (expected {expected})"
            ),
            Self::BelowFloor {
                node_id,
                weight,
                floor,
            } => write!(f, "node {node_id} weight {weight} is below floor {floor}"),
            Self::DuplicateNodeId { node_id } => write!(f, "duplicate node id {node_id}"),
        }
    }
}

impl std::error::Error for LayoutModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> LayoutNode {
        LayoutNode::container(
            NodeId::new("split"),
            100.0,
            ContainerKind::Col,
            vec![
                LayoutNode::leaf(
                    NodeId::root(),
                    50.0,
                    LeafContent::occupied("Camera", "#e0f2fe"),
                ),
                LayoutNode::leaf(NodeId::new("node-1"), 50.0, LeafContent::empty()),
            ],
        )
    }

    #[test]
    fn axis_maps_to_container_kind() {
        assert_eq!(SplitAxis::Horizontal.container_kind(), ContainerKind::Col);
        assert_eq!(SplitAxis::Vertical.container_kind(), ContainerKind::Row);
        assert_eq!(ContainerKind::Col.axis(), SplitAxis::Horizontal);
        assert_eq!(ContainerKind::Row.axis(), SplitAxis::Vertical);
    }

    #[test]
    fn blank_root_is_empty_leaf() {
        let root = LayoutNode::blank_root();
        assert_eq!(root.id, NodeId::root());
        assert_eq!(root.weight, 100.0);
        assert!(root.is_empty_leaf());
        assert!(root.children().is_empty());
        assert_eq!(root.kind(), NodeKind::Leaf);
    }

    #[test]
    fn leaf_serializes_without_children_or_absent_fields() {
        let json = serde_json::to_value(LayoutNode::blank_root()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"id": "root", "kind": "leaf", "weight": 100.0})
        );
    }

    #[test]
    fn container_serializes_children_in_order() {
        let json = serde_json::to_value(sample_tree()).expect("serialize");
        assert_eq!(json["kind"], "col");
        assert_eq!(json["children"][0]["componentType"], "Camera");
        assert_eq!(json["children"][0]["componentColor"], "#e0f2fe");
        assert!(json["children"][1].get("componentType").is_none());
        assert!(json["children"][1].get("children").is_none());
        assert!(json.get("componentType").is_none());
    }

    #[test]
    fn persisted_tree_round_trips() {
        let tree = sample_tree();
        let text = serde_json::to_string(&tree).expect("serialize");
        let back: LayoutNode = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, tree);
        assert_eq!(back.state_hash(), tree.state_hash());
    }

    #[test]
    fn legacy_component_kind_and_parent_field_are_accepted() {
        let text = r#"{"id":"root","type":"component","parentId":null,"weight":100}"#;
        let node: LayoutNode = serde_json::from_str(text).expect("legacy shape");
        assert_eq!(node, LayoutNode::blank_root());
    }

    #[test]
    fn leaf_with_children_is_rejected() {
        let text = r#"{"id":"a","kind":"leaf","weight":100,"children":[]}"#;
        let err = serde_json::from_str::<LayoutNode>(text).expect_err("must reject");
        assert!(err.to_string().contains("must not carry a children list"));
    }

    #[test]
    fn container_without_children_is_rejected() {
        let text = r#"{"id":"a","kind":"row","weight":100}"#;
        let err = serde_json::from_str::<LayoutNode>(text).expect_err("must reject");
        assert!(err.to_string().contains("has no children list"));
    }

    #[test]
    fn container_with_component_is_rejected() {
        let text = r#"{"id":"a","kind":"col","weight":100,"componentType":"Camera","children":[]}"#;
        let err = serde_json::from_str::<LayoutNode>(text).expect_err("must reject");
        assert!(err.to_string().contains("must not carry a component"));
    }

    #[test]
    fn state_hash_tracks_weights_and_labels() {
        let tree = sample_tree();
        let mut reweighted = tree.clone();
        if let NodeContent::Container(container) = &mut reweighted.content {
            container.children[0].weight = 40.0;
            container.children[1].weight = 60.0;
        }
        assert_ne!(tree.state_hash(), reweighted.state_hash());
        assert_eq!(tree.state_hash(), sample_tree().state_hash());
    }

    #[test]
    fn accessors_report_leaf_content() {
        let tree = sample_tree();
        let first = &tree.children()[0];
        assert_eq!(first.component_type(), Some("Camera"));
        assert_eq!(first.component_color(), Some("#e0f2fe"));
        assert_eq!(tree.component_type(), None);
        assert!(!tree.is_leaf());
    }
}
