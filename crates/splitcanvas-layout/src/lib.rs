#![forbid(unsafe_code)]

//! SplitCanvas layout tree manager.
//!
//! The editor canvas is a recursive split-pane tree: every node is either a
//! leaf (optionally holding a placed component) or a row/col container whose
//! children share its space by weight. This crate owns that tree and the
//! three structural edits applied to it:
//!
//! - [`split`] fills an empty leaf or wraps a cell in a new two-child container.
//! - [`resize`] trades weight between two adjacent siblings.
//! - [`delete`] removes a node and collapses or promotes ancestors.
//!
//! Every edit consumes the current tree and returns an [`EditOutcome`]; no
//! state survives between calls apart from the [`NodeFactory`] the caller
//! threads through splits.
//!
//! # Example
//!
//! ```
//! use splitcanvas_layout::{
//!     LayoutCommand, LayoutNode, LayoutPolicy, NodeFactory, NodeId, SplitAxis, SplitRequest,
//! };
//!
//! let policy = LayoutPolicy::default();
//! let mut factory = NodeFactory::new();
//! let tree = LayoutNode::blank_root();
//!
//! let place = LayoutCommand::Split(SplitRequest::new(NodeId::root(), SplitAxis::Horizontal, "Camera"));
//! let tree = place.apply(tree, &policy, &mut factory).into_tree_or_blank();
//! assert_eq!(tree.component_type(), Some("Camera"));
//!
//! let beside = LayoutCommand::Split(SplitRequest::new(NodeId::root(), SplitAxis::Horizontal, "Traces"));
//! let tree = beside.apply(tree, &policy, &mut factory).into_tree_or_blank();
//! assert_eq!(tree.children().len(), 2);
//! assert!(tree.validate(&policy).is_ok());
//! ```

pub mod command;
pub mod delete;
pub mod factory;
pub mod node;
pub mod resize;
pub mod split;
pub mod traverse;
pub mod validate;
pub mod weight;

pub use command::{
    CommandKind, EditOutcome, LayoutCommand, NoOpReason, ResizeRequest, SplitRequest,
};
pub use delete::delete;
pub use factory::{COMPONENT_PALETTE, GENERATED_ID_PREFIX, NodeFactory};
pub use node::{
    Container, ContainerKind, LayoutModelError, LayoutNode, LayoutNodeRecord, LeafContent,
    NodeContent, NodeId, NodeKind, ROOT_NODE_ID, SplitAxis,
};
pub use resize::resize;
pub use split::split;
pub use traverse::{Nodes, used_component_types};
pub use validate::{InvariantCode, InvariantIssue, InvariantReport, InvariantSeverity};
pub use weight::{LayoutPolicy, clamp_pair, redistribute, renormalize};
