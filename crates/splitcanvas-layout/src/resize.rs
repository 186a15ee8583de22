//! Resize: trade weight between two adjacent siblings.

use crate::command::{EditOutcome, NoOpReason, ResizeRequest};
use crate::node::{LayoutNode, NodeContent};
use crate::weight::{LayoutPolicy, clamp_pair};

/// Apply one incremental resize step.
///
/// Only `children[pair_index]` and `children[pair_index + 1]` change; their
/// sum is preserved and neither drops below [`LayoutPolicy::min_weight`]
/// (or below its current weight, if already under the floor).
/// Unknown containers, leaves, out-of-range pairs, and non-finite deltas are
/// no-ops.
pub fn resize(tree: LayoutNode, request: &ResizeRequest, policy: &LayoutPolicy) -> EditOutcome {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "splitcanvas.layout.resize",
        container = %request.container_id,
        pair_index = request.pair_index,
        delta = request.delta_percent
    )
    .entered();

    if let Err(reason) = check_pair(&tree, request) {
        return EditOutcome::unchanged(tree, reason);
    }

    let mut tree = tree;
    if let Some(NodeContent::Container(container)) = tree
        .find_mut(&request.container_id)
        .map(|node| &mut node.content)
    {
        let index = request.pair_index;
        let (left, right) = clamp_pair(
            container.children[index].weight,
            container.children[index + 1].weight,
            request.delta_percent,
            policy.min_weight,
        );
        container.children[index].weight = left;
        container.children[index + 1].weight = right;
    }
    EditOutcome::Applied(tree)
}

fn check_pair(tree: &LayoutNode, request: &ResizeRequest) -> Result<(), NoOpReason> {
    if !request.delta_percent.is_finite() {
        return Err(NoOpReason::NonFiniteDelta);
    }
    let node = tree
        .find(&request.container_id)
        .ok_or(NoOpReason::UnknownTarget)?;
    if node.is_leaf() {
        return Err(NoOpReason::NotAContainer);
    }
    let in_range = request
        .pair_index
        .checked_add(1)
        .is_some_and(|right| right < node.children().len());
    if !in_range {
        return Err(NoOpReason::PairOutOfRange);
    }
    Ok(())
}
