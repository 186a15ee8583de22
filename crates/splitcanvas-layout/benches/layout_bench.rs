//! Benchmarks for layout tree edits.
//!
//! Run with: cargo bench -p splitcanvas-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use splitcanvas_layout::{
    LayoutCommand, LayoutNode, LayoutPolicy, NodeFactory, NodeId, ResizeRequest, SplitAxis,
    SplitRequest,
};
use std::hint::black_box;

/// Grow a tree with `leaves` occupied cells by repeatedly splitting the last leaf.
fn build_tree(leaves: usize) -> (LayoutNode, NodeFactory) {
    let policy = LayoutPolicy::default();
    let mut factory = NodeFactory::new();
    let mut tree = LayoutNode::blank_root();
    for idx in 0..leaves {
        let target = tree
            .leaves()
            .last()
            .map_or_else(NodeId::root, |leaf| leaf.id.clone());
        let axis = if idx % 2 == 0 {
            SplitAxis::Horizontal
        } else {
            SplitAxis::Vertical
        };
        tree = LayoutCommand::Split(SplitRequest::new(target, axis, format!("C{idx}")))
            .apply(tree, &policy, &mut factory)
            .into_tree_or_blank();
    }
    (tree, factory)
}

fn bench_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/split");
    let policy = LayoutPolicy::default();

    for n in [4, 16, 64, 256] {
        let (tree, factory) = build_tree(n);
        let target = tree.leaves().last().map(|leaf| leaf.id.clone());
        let Some(target) = target else { continue };
        group.bench_with_input(BenchmarkId::new("deepest_leaf", n), &tree, |b, tree| {
            b.iter_batched(
                || (tree.clone(), factory.clone()),
                |(tree, mut factory)| {
                    let command = LayoutCommand::Split(SplitRequest::new(
                        target.clone(),
                        SplitAxis::Vertical,
                        "Bench",
                    ));
                    black_box(command.apply(tree, &policy, &mut factory))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/resize");
    let policy = LayoutPolicy::default();

    for n in [4, 16, 64, 256] {
        let (tree, mut factory) = build_tree(n);
        let container = tree
            .iter()
            .filter(|node| !node.is_leaf())
            .last()
            .map(|node| node.id.clone());
        let Some(container) = container else { continue };
        group.bench_with_input(BenchmarkId::new("innermost_pair", n), &tree, |b, tree| {
            b.iter_batched(
                || tree.clone(),
                |tree| {
                    let command = LayoutCommand::Resize(ResizeRequest::new(
                        container.clone(),
                        0,
                        2.5,
                    ));
                    black_box(command.apply(tree, &policy, &mut factory))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/delete");
    let policy = LayoutPolicy::default();

    for n in [4, 16, 64, 256] {
        let (tree, mut factory) = build_tree(n);
        let target = tree.leaves().last().map(|leaf| leaf.id.clone());
        let Some(target) = target else { continue };
        group.bench_with_input(BenchmarkId::new("deepest_leaf", n), &tree, |b, tree| {
            b.iter_batched(
                || tree.clone(),
                |tree| {
                    let command = LayoutCommand::Delete {
                        target_id: target.clone(),
                    };
                    black_box(command.apply(tree, &policy, &mut factory))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/queries");
    let policy = LayoutPolicy::default();

    for n in [16, 256] {
        let (tree, _) = build_tree(n);
        group.bench_with_input(BenchmarkId::new("used_component_types", n), &tree, |b, tree| {
            b.iter(|| black_box(tree.used_component_types()))
        });
        group.bench_with_input(BenchmarkId::new("validate", n), &tree, |b, tree| {
            b.iter(|| black_box(tree.validate(&policy)))
        });
        group.bench_with_input(BenchmarkId::new("state_hash", n), &tree, |b, tree| {
            b.iter(|| black_box(tree.state_hash()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_split,
    bench_resize,
    bench_delete,
    bench_queries
);
criterion_main!(benches);
