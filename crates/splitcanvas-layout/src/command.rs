//! Structural edit commands and their outcomes.
//!
//! Commands arrive from the gesture layer with geometry already resolved
//! (axis, insertion side, percentage delta). Each command consumes the
//! current tree and yields the next one; nothing is retained between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delete::delete;
use crate::factory::NodeFactory;
use crate::node::{LayoutNode, NodeId, SplitAxis};
use crate::resize::resize;
use crate::split::split;
use crate::weight::LayoutPolicy;

/// Place a component next to (or into) an existing cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    pub target_id: NodeId,
    pub axis: SplitAxis,
    pub new_component_label: String,
    /// Put the new cell first (left/top) instead of after the target.
    #[serde(default)]
    pub insert_before: bool,
}

impl SplitRequest {
    #[must_use]
    pub fn new(target_id: NodeId, axis: SplitAxis, label: impl Into<String>) -> Self {
        Self {
            target_id,
            axis,
            new_component_label: label.into(),
            insert_before: false,
        }
    }

    #[must_use]
    pub fn insert_before(mut self, insert_before: bool) -> Self {
        self.insert_before = insert_before;
        self
    }
}

/// Move weight between `children[pair_index]` and `children[pair_index + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub container_id: NodeId,
    pub pair_index: usize,
    /// Incremental delta since the previous pointer report, in weight units.
    pub delta_percent: f64,
}

impl ResizeRequest {
    #[must_use]
    pub fn new(container_id: NodeId, pair_index: usize, delta_percent: f64) -> Self {
        Self {
            container_id,
            pair_index,
            delta_percent,
        }
    }
}

/// One structural edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayoutCommand {
    Split(SplitRequest),
    Resize(ResizeRequest),
    #[serde(rename_all = "camelCase")]
    Delete {
        target_id: NodeId,
    },
}

impl LayoutCommand {
    /// Command family.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Split(_) => CommandKind::Split,
            Self::Resize(_) => CommandKind::Resize,
            Self::Delete { .. } => CommandKind::Delete,
        }
    }

    /// Node the command addresses.
    #[must_use]
    pub fn target(&self) -> &NodeId {
        match self {
            Self::Split(request) => &request.target_id,
            Self::Resize(request) => &request.container_id,
            Self::Delete { target_id } => target_id,
        }
    }

    /// Apply the command to `tree`.
    pub fn apply(
        &self,
        tree: LayoutNode,
        policy: &LayoutPolicy,
        factory: &mut NodeFactory,
    ) -> EditOutcome {
        match self {
            Self::Split(request) => split(tree, request, policy, factory),
            Self::Resize(request) => resize(tree, request, policy),
            Self::Delete { target_id } => delete(tree, target_id, policy),
        }
    }
}

/// Stable command discriminator used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Split,
    Resize,
    Delete,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Split => "split",
            Self::Resize => "resize",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Why a command left the tree untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// No node carries the addressed id.
    UnknownTarget,
    /// The addressed node is a leaf where a container was expected.
    NotAContainer,
    /// `pair_index + 1` is not a child index of the container.
    PairOutOfRange,
    /// The resize delta is NaN or infinite.
    NonFiniteDelta,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTarget => write!(f, "target id not found"),
            Self::NotAContainer => write!(f, "target is not a container"),
            Self::PairOutOfRange => write!(f, "sibling pair index out of range"),
            Self::NonFiniteDelta => write!(f, "resize delta is not finite"),
        }
    }
}

/// Result of one structural edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The edit produced this tree.
    Applied(LayoutNode),
    /// The edit did not apply; `tree` is the input, untouched.
    Unchanged {
        tree: LayoutNode,
        reason: NoOpReason,
    },
    /// The whole tree was removed. The caller substitutes a blank root.
    Emptied,
}

impl EditOutcome {
    pub(crate) fn unchanged(tree: LayoutNode, reason: NoOpReason) -> Self {
        Self::Unchanged { tree, reason }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    #[must_use]
    pub fn is_emptied(&self) -> bool {
        matches!(self, Self::Emptied)
    }

    /// Resulting tree; `None` only for [`EditOutcome::Emptied`].
    #[must_use]
    pub fn into_tree(self) -> Option<LayoutNode> {
        match self {
            Self::Applied(tree) | Self::Unchanged { tree, .. } => Some(tree),
            Self::Emptied => None,
        }
    }

    /// Resulting tree, substituting [`LayoutNode::blank_root`] when emptied.
    #[must_use]
    pub fn into_tree_or_blank(self) -> LayoutNode {
        self.into_tree().unwrap_or_else(LayoutNode::blank_root)
    }
}
