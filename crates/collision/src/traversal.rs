//! Dual-tree traversals that enumerate pairs of leaves with overlapping bounding spheres.
//!
//! Traversals report *leaf node indices*. Use [`Hierarchy::entities`] to resolve a leaf to the
//! original indices of the entities it holds.
//!
//! Neither traversal modifies the trees, and the same trees always produce the same sequence of
//! callbacks.

use either::Either;

use crate::hierarchy::{Hierarchy, HullSource, NodeIndex, ROOT};

/// Enumerate pairs of distinct leaves of a single tree whose spheres overlap, for self-collision.
///
/// Every unordered pair of leaves is reported at most once, and a leaf is never paired with
/// itself.
pub fn traverse_single<S: HullSource>(
    tree: &Hierarchy<S>,
    mut f: impl FnMut(NodeIndex, NodeIndex),
) {
    if tree.is_empty() {
        return;
    }

    let mut pairs = 0;
    single(tree, ROOT, ROOT, &mut |a, b| {
        pairs += 1;
        f(a, b);
    });
    log::trace!("self traversal found {pairs} candidate leaf pairs");
}

fn single<S: HullSource, F: FnMut(NodeIndex, NodeIndex)>(
    tree: &Hierarchy<S>,
    node_index1: NodeIndex,
    node_index2: NodeIndex,
    f: &mut F,
) {
    let node1 = tree.node(node_index1);

    // A subtree against itself is its two children against themselves, plus the two children
    // against each other, which visits every pair of distinct leaves in one order only.
    if node_index1 == node_index2 {
        if let Some([left, right]) = node1.children() {
            single(tree, left, left, f);
            single(tree, left, right, f);
            single(tree, right, right, f);
        }
        return;
    }

    if let Some([left, right]) = node1.children() {
        single(tree, left, node_index2, f);
        single(tree, right, node_index2, f);
        return;
    }

    if !tree.hull(node_index1).overlaps(tree.hull(node_index2)) {
        return;
    }

    match tree.node(node_index2).children() {
        None => f(node_index1, node_index2),
        Some([left, right]) => {
            single(tree, node_index1, left, f);
            single(tree, node_index1, right, f);
        }
    }
}

/// Enumerate pairs `(leaf of a, leaf of b)` whose spheres overlap, for collisions between two
/// bodies.
///
/// At every step the node with the larger sphere is split, ties splitting the node of `a`. If
/// that node is a leaf, the other one is split instead.
pub fn traverse<A, B>(a: &Hierarchy<A>, b: &Hierarchy<B>, mut f: impl FnMut(NodeIndex, NodeIndex))
where
    A: HullSource,
    B: HullSource<Scalar = A::Scalar>,
{
    if a.is_empty() || b.is_empty() {
        return;
    }

    let mut pairs = 0;
    cross(a, ROOT, b, ROOT, &mut |n1, n2| {
        pairs += 1;
        f(n1, n2);
    });
    log::trace!("cross traversal found {pairs} candidate leaf pairs");
}

fn cross<A, B, F>(
    a: &Hierarchy<A>,
    node_index1: NodeIndex,
    b: &Hierarchy<B>,
    node_index2: NodeIndex,
    f: &mut F,
) where
    A: HullSource,
    B: HullSource<Scalar = A::Scalar>,
    F: FnMut(NodeIndex, NodeIndex),
{
    let bs1 = a.hull(node_index1);
    let bs2 = b.hull(node_index2);
    if !bs1.overlaps(bs2) {
        return;
    }

    let split = match (a.node(node_index1).children(), b.node(node_index2).children()) {
        (None, None) => {
            f(node_index1, node_index2);
            return;
        }
        (Some(children), None) => Either::Left(children),
        (None, Some(children)) => Either::Right(children),
        (Some(children1), Some(children2)) => {
            if bs1.radius >= bs2.radius {
                Either::Left(children1)
            } else {
                Either::Right(children2)
            }
        }
    };

    match split {
        Either::Left([left, right]) => {
            cross(a, left, b, node_index2, f);
            cross(a, right, b, node_index2, f);
        }
        Either::Right([left, right]) => {
            cross(a, node_index1, b, left, f);
            cross(a, node_index1, b, right, f);
        }
    }
}

/// Collect the pairs reported by [`traverse_single`].
pub fn collect_single<S: HullSource>(tree: &Hierarchy<S>) -> Vec<(NodeIndex, NodeIndex)> {
    let mut pairs = Vec::new();
    traverse_single(tree, |a, b| pairs.push((a, b)));
    pairs
}

/// Collect the pairs reported by [`traverse`].
pub fn collect<A, B>(a: &Hierarchy<A>, b: &Hierarchy<B>) -> Vec<(NodeIndex, NodeIndex)>
where
    A: HullSource,
    B: HullSource<Scalar = A::Scalar>,
{
    let mut pairs = Vec::new();
    traverse(a, b, |n1, n2| pairs.push((n1, n2)));
    pairs
}
