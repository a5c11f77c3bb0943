use std::ops::Range;

use rand::{SeedableRng as _, rngs::StdRng};
use serde::Deserialize;
use spheretree_math::{Box3, Sphere, Vec3, cast::cast};

pub type NodeIndex = usize;

/// The index of the root node of every non-empty [`Hierarchy`].
pub const ROOT: NodeIndex = 0;

const INVALID_NODE: NodeIndex = NodeIndex::MAX;

// Quickselect pivots are random, but hierarchies built from the same input should always come out
// the same.
const SPLIT_SEED: u64 = 0x5eed_5eed;

/// The entities a [`Hierarchy`] is built over, and how to bound them.
///
/// Entities are named by their index in the original entity list, in `0..entity_count()`. Hull
/// functions receive a non-empty slice of the hierarchy's permutation list, naming the entities
/// assigned to a single node.
pub trait HullSource {
    type Scalar: num::Float;

    fn entity_count(&self) -> usize;

    /// The representative point of an entity, used to decide how to split nodes.
    fn entity_position(&self, entity: u32) -> Vec3<Self::Scalar>;

    /// A tight bound for the given entities, used when a hierarchy is constructed.
    fn compute_hull(&self, entities: &[u32]) -> Sphere<Self::Scalar>;

    /// A cheaper, possibly looser bound for the given entities, used when refitting a hierarchy.
    fn compute_hull_approx(&self, entities: &[u32]) -> Sphere<Self::Scalar>;

    fn default_settings(&self) -> Settings {
        Settings::default()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nodes holding at most this many entities are not split further.
    pub max_primitives_per_leaf: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_primitives_per_leaf: 1,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Node {
    pub begin: u32,
    pub count: u32,
    children: [NodeIndex; 2],
}

impl Node {
    fn leaf(begin: u32, count: u32) -> Self {
        Self {
            begin,
            count,
            children: [INVALID_NODE; 2],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children[0] == INVALID_NODE
    }

    pub fn children(&self) -> Option<[NodeIndex; 2]> {
        if self.is_leaf() {
            None
        } else {
            Some(self.children)
        }
    }

    /// The range of the permutation list holding this node's entities.
    pub fn range(&self) -> Range<usize> {
        self.begin as usize..self.begin as usize + self.count as usize
    }
}

/// A binary tree of bounding spheres over the entities of a [`HullSource`].
///
/// Entities are never moved, only the permutation list `lst` is reordered so that every node owns
/// a contiguous range of it. Every node caches one bounding sphere, and every node's sphere
/// encloses the spheres of both of its children.
///
/// Node indices are stable until the next call to `construct`. Children always have larger indices
/// than their parent.
#[derive(Debug, Clone)]
pub struct Hierarchy<S: HullSource> {
    source: S,
    settings: Settings,
    lst: Vec<u32>,
    nodes: Vec<Node>,
    hulls: Vec<Sphere<S::Scalar>>,
}

impl<S: HullSource + Default> Default for Hierarchy<S> {
    fn default() -> Self {
        Self::from_source(S::default())
    }
}

impl<S: HullSource> Hierarchy<S> {
    /// Create an unbuilt hierarchy, call `construct` to build it.
    pub fn from_source(source: S) -> Self {
        let settings = source.default_settings();
        Self::with_settings(source, settings)
    }

    pub fn with_settings(source: S, settings: Settings) -> Self {
        let mut this = Self {
            source,
            settings,
            lst: Vec::new(),
            nodes: Vec::new(),
            hulls: Vec::new(),
        };
        this.reset();
        this
    }

    /// Replace the entity source, discarding the tree.
    pub fn rebind(&mut self, source: S) {
        self.source = source;
        self.reset();
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Takes effect on the next call to `construct`.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Partition the entities into a tree and compute every node's hull with
    /// [`HullSource::compute_hull`].
    ///
    /// Each node is split at the median entity position along the longest axis of the node's
    /// bounds, until it holds at most `max_primitives_per_leaf` entities.
    pub fn construct(&mut self) {
        self.reset();
        if self.lst.is_empty() {
            log::debug!("constructed empty sphere hierarchy");
            return;
        }

        let count = self.lst.len() as u32;
        let bounds = Box3::from_points(self.lst.iter().map(|&e| self.source.entity_position(e)));
        self.nodes.push(Node::leaf(0, count));

        build_sub(
            &mut StdRng::seed_from_u64(SPLIT_SEED),
            &self.source,
            &mut self.lst,
            &mut self.nodes,
            self.settings.max_primitives_per_leaf.max(1),
            ROOT,
            bounds,
        );

        self.refit(S::compute_hull);

        log::debug!(
            "constructed sphere hierarchy over {} entities: {} nodes, {} leaves, depth {}",
            count,
            self.nodes.len(),
            self.leaf_count(),
            self.depth(),
        );
    }

    /// Recompute every node's hull with [`HullSource::compute_hull_approx`], keeping the tree shape
    /// and permutation from the last `construct`.
    pub fn update(&mut self) {
        self.refit(S::compute_hull_approx);
        log::trace!("refit {} sphere hierarchy nodes", self.nodes.len());
    }

    /// Returns true if the tree has no nodes, either because it has not been constructed or because
    /// there are no entities.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node: NodeIndex) -> &Node {
        &self.nodes[node]
    }

    pub fn hull(&self, node: NodeIndex) -> &Sphere<S::Scalar> {
        &self.hulls[node]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn hulls(&self) -> &[Sphere<S::Scalar>] {
        &self.hulls
    }

    /// The permutation list, every entity index exactly once.
    pub fn lst(&self) -> &[u32] {
        &self.lst
    }

    /// The original indices of the entities assigned to the given node.
    pub fn entities(&self, node: NodeIndex) -> &[u32] {
        &self.lst[self.nodes[node].range()]
    }

    /// Hull of the entities `lst[begin..begin + count]`.
    pub fn compute_hull(&self, begin: usize, count: usize) -> Sphere<S::Scalar> {
        self.source.compute_hull(&self.lst[begin..begin + count])
    }

    pub fn compute_hull_approx(&self, begin: usize, count: usize) -> Sphere<S::Scalar> {
        self.source.compute_hull_approx(&self.lst[begin..begin + count])
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// The number of nodes on the longest path from the root to a leaf, zero for an empty tree.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = Vec::new();
        if !self.is_empty() {
            stack.push((ROOT, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some([left, right]) = self.nodes[node].children() {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }

    fn reset(&mut self) {
        let count = self.source.entity_count();
        assert!(
            count <= u32::MAX as usize,
            "too many entities for a sphere hierarchy"
        );
        self.lst.clear();
        self.lst.extend(0..count as u32);
        self.nodes.clear();
        self.hulls.clear();
    }

    // Children are always stored after their parent, so visiting nodes in reverse order computes
    // every child before its parent.
    fn refit(&mut self, compute: impl Fn(&S, &[u32]) -> Sphere<S::Scalar>) {
        self.hulls.clear();
        self.hulls.resize(self.nodes.len(), Sphere::zero());

        for i in (0..self.nodes.len()).rev() {
            let node = self.nodes[i];
            debug_assert!(node.count > 0, "empty hierarchy node");

            let mut hull = compute(&self.source, &self.lst[node.range()]);
            if let Some(children) = node.children() {
                for child in children {
                    hull.enclose(&self.hulls[child]);
                }
            }
            self.hulls[i] = hull;
        }
    }
}

fn build_sub<S: HullSource>(
    rng: &mut impl rand::Rng,
    source: &S,
    lst: &mut [u32],
    nodes: &mut Vec<Node>,
    max_primitives_per_leaf: u32,
    node: NodeIndex,
    bounds: Box3<S::Scalar>,
) {
    let Node { begin, count, .. } = nodes[node];
    if count <= max_primitives_per_leaf {
        return;
    }

    let axis = bounds.longest_axis();
    let key = |e: &u32| source.entity_position(*e)[axis];

    let half = count / 2;
    let range = &mut lst[nodes[node].range()];
    // Partition around the median along the split axis. Entities on each side are not sorted.
    quickselect(rng, range, half as usize, |a, b| key(a) < key(b));

    // Split the bounds halfway between the two sides.
    let left_max = range[..half as usize]
        .iter()
        .map(|e| key(e))
        .fold(<S::Scalar as num::Float>::neg_infinity(), num::Float::max);
    let right_min = key(&range[half as usize]);
    let split = (left_max + right_min) * cast(0.5);

    let mut left_bounds = bounds;
    left_bounds.max[axis] = split;
    let mut right_bounds = bounds;
    right_bounds.min[axis] = split;

    let left = nodes.len();
    nodes.push(Node::leaf(begin, half));
    let right = nodes.len();
    nodes.push(Node::leaf(begin + half, count - half));
    nodes[node].children = [left, right];

    build_sub(
        rng,
        source,
        lst,
        nodes,
        max_primitives_per_leaf,
        left,
        left_bounds,
    );
    build_sub(
        rng,
        source,
        lst,
        nodes,
        max_primitives_per_leaf,
        right,
        right_bounds,
    );
}

// Partially sort the given slice, making sure that the kth element is in the correct position and
// that no element before it is greater than it.
//
// https://en.wikipedia.org/wiki/Quickselect
fn quickselect<T>(
    rng: &mut impl rand::Rng,
    list: &mut [T],
    k: usize,
    less_than: impl Fn(&T, &T) -> bool,
) {
    assert!(k < list.len());

    let mut left = 0;
    let mut right = list.len() - 1;

    let mut partition = |left, right, pivot| -> usize {
        list.swap(pivot, right);

        let mut store_index = left;
        for i in left..right {
            if less_than(&list[i], &list[right]) {
                list.swap(store_index, i);
                store_index += 1;
            }
        }

        list.swap(right, store_index);
        store_index
    };

    loop {
        let pivot = partition(left, right, rng.random_range(left..=right));

        if k == pivot {
            return;
        } else if k < pivot {
            right = pivot - 1;
        } else {
            left = pivot + 1;
        }
    }
}
