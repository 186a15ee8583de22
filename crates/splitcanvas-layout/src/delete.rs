//! Delete: remove a node, then collapse and promote ancestors as needed.

use crate::command::{EditOutcome, NoOpReason};
use crate::node::{LayoutNode, NodeContent, NodeId};
use crate::weight::{LayoutPolicy, redistribute, renormalize};

/// What remains of a subtree after pruning.
#[derive(Debug)]
enum Pruned {
    Kept(LayoutNode),
    Vanished,
}

/// Remove `target` from `tree`.
///
/// The removed weight is shared equally among the remaining siblings. A
/// container left with one child is replaced by that child, which takes over
/// the container's weight; a container left with none vanishes in turn.
/// Deleting the root yields [`EditOutcome::Emptied`].
pub fn delete(tree: LayoutNode, target: &NodeId, policy: &LayoutPolicy) -> EditOutcome {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("splitcanvas.layout.delete", target = %target).entered();

    if tree.id == *target {
        return EditOutcome::Emptied;
    }
    if !tree.contains(target) {
        return EditOutcome::unchanged(tree, NoOpReason::UnknownTarget);
    }
    match prune(tree, target, policy) {
        Pruned::Kept(tree) => EditOutcome::Applied(tree),
        Pruned::Vanished => EditOutcome::Emptied,
    }
}

fn prune(node: LayoutNode, target: &NodeId, policy: &LayoutPolicy) -> Pruned {
    let LayoutNode {
        id,
        weight,
        content,
    } = node;
    let mut container = match content {
        NodeContent::Container(container) => container,
        leaf @ NodeContent::Leaf(_) => {
            return Pruned::Kept(LayoutNode {
                id,
                weight,
                content: leaf,
            });
        }
    };

    let mut removed = 0.0;
    let mut survivors = Vec::with_capacity(container.children.len());
    for child in std::mem::take(&mut container.children) {
        if child.id == *target {
            removed += child.weight;
            continue;
        }
        if !child.contains(target) {
            survivors.push(child);
            continue;
        }
        let child_weight = child.weight;
        match prune(child, target, policy) {
            Pruned::Kept(child) => survivors.push(child),
            Pruned::Vanished => removed += child_weight,
        }
    }

    match survivors.len() {
        0 => Pruned::Vanished,
        1 => {
            let mut only = survivors.remove(0);
            only.weight = weight;
            Pruned::Kept(only)
        }
        _ => {
            if removed > 0.0 {
                let mut weights: Vec<f64> = survivors.iter().map(|child| child.weight).collect();
                redistribute(&mut weights, removed);
                renormalize(
                    &mut weights,
                    policy.total_weight,
                    policy.renormalize_tolerance,
                );
                for (child, weight) in survivors.iter_mut().zip(weights) {
                    child.weight = weight;
                }
            }
            container.children = survivors;
            Pruned::Kept(LayoutNode {
                id,
                weight,
                content: NodeContent::Container(container),
            })
        }
    }
}
