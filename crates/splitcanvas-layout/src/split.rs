//! Split: place a component into an empty cell, or divide an occupied one.

use crate::command::{EditOutcome, NoOpReason, SplitRequest};
use crate::factory::NodeFactory;
use crate::node::{LayoutNode, LeafContent, NodeContent};
use crate::weight::LayoutPolicy;

/// Apply a split to `tree`.
///
/// An empty leaf is filled in place. Any other target is replaced by a new
/// container holding the relocated target and a new leaf, each at
/// [`LayoutPolicy::split_share`]; the container inherits the target's weight
/// and slot. An unknown target leaves the tree untouched.
pub fn split(
    tree: LayoutNode,
    request: &SplitRequest,
    policy: &LayoutPolicy,
    factory: &mut NodeFactory,
) -> EditOutcome {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "splitcanvas.layout.split",
        target = %request.target_id,
        axis = ?request.axis,
        insert_before = request.insert_before
    )
    .entered();

    if !tree.contains(&request.target_id) {
        return EditOutcome::unchanged(tree, NoOpReason::UnknownTarget);
    }
    EditOutcome::Applied(split_subtree(tree, request, policy, factory))
}

fn split_subtree(
    mut node: LayoutNode,
    request: &SplitRequest,
    policy: &LayoutPolicy,
    factory: &mut NodeFactory,
) -> LayoutNode {
    if node.id == request.target_id {
        return if node.is_empty_leaf() {
            fill(node, request, factory)
        } else {
            wrap(node, request, policy, factory)
        };
    }
    if let NodeContent::Container(container) = &mut node.content {
        let children = std::mem::take(&mut container.children);
        container.children = children
            .into_iter()
            .map(|child| {
                if child.contains(&request.target_id) {
                    split_subtree(child, request, policy, factory)
                } else {
                    child
                }
            })
            .collect();
    }
    node
}

fn fill(mut leaf: LayoutNode, request: &SplitRequest, factory: &mut NodeFactory) -> LayoutNode {
    leaf.content = NodeContent::Leaf(LeafContent::occupied(
        request.new_component_label.clone(),
        factory.next_color(),
    ));
    leaf
}

fn wrap(
    mut target: LayoutNode,
    request: &SplitRequest,
    policy: &LayoutPolicy,
    factory: &mut NodeFactory,
) -> LayoutNode {
    let slot_weight = target.weight;
    let share = policy.split_share();
    target.weight = share;

    let container_id = factory.next_id();
    let incoming = LayoutNode::leaf(
        factory.next_id(),
        share,
        LeafContent::occupied(request.new_component_label.clone(), factory.next_color()),
    );
    let children = if request.insert_before {
        vec![incoming, target]
    } else {
        vec![target, incoming]
    };
    LayoutNode::container(
        container_id,
        slot_weight,
        request.axis.container_kind(),
        children,
    )
}
