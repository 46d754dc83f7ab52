use crate::math::Real;
use crate::utils::WeightedValue;
use std::collections::BinaryHeap;

/// Node of a [`MergeTree`].
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MergeTreeNode {
    faces: Vec<usize>,
    concavity: Real,
    children: Option<[usize; 2]>,
}

impl MergeTreeNode {
    /// The mesh faces of the cluster represented by this node.
    #[inline]
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// The concavity of this cluster.
    #[inline]
    pub fn concavity(&self) -> Real {
        self.concavity
    }

    /// The two clusters this cluster was merged from, unless it is a leaf.
    #[inline]
    pub fn children(&self) -> Option<[usize; 2]> {
        self.children
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// The history of the cluster merges of a decomposition.
///
/// Every node is a cluster of mesh faces together with the concavity of that cluster.
/// A node is either a leaf or the union of its two children. The tree can then be cut
/// to a set of disjoint clusters covering the faces of its root.
///
/// Merges that do not reveal anything about the shape are not recorded: if one of the
/// two merged clusters is a single face, or if both are about as concave as their
/// union, the children are absorbed and the union becomes a leaf.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MergeTree {
    nodes: Vec<MergeTreeNode>,
    absorb_epsilon: Real,
}

impl MergeTree {
    /// Creates an empty tree.
    ///
    /// Two children are absorbed by their parent if both their concavities are at least
    /// the parent concavity minus `absorb_epsilon`.
    pub fn new(absorb_epsilon: Real) -> Self {
        Self {
            nodes: Vec::new(),
            absorb_epsilon,
        }
    }

    /// The number of nodes of this tree, absorbed nodes included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Does this tree have no nodes?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node with the given index.
    #[inline]
    pub fn node(&self, id: usize) -> &MergeTreeNode {
        &self.nodes[id]
    }

    /// Adds a single-face leaf with zero concavity.
    pub fn add_leaf(&mut self, face: usize) -> usize {
        self.nodes.push(MergeTreeNode {
            faces: vec![face],
            concavity: 0.0,
            children: None,
        });
        self.nodes.len() - 1
    }

    /// Adds the union of the clusters `left` and `right`.
    ///
    /// The new node concavity is `concavity`, raised to its children's if needed so
    /// that concavities never decrease towards the root.
    pub fn join(&mut self, left: usize, right: usize, concavity: Real) -> usize {
        let (l, r) = (&self.nodes[left], &self.nodes[right]);
        let threshold = concavity - self.absorb_epsilon;
        let absorb = l.faces.len() == 1
            || r.faces.len() == 1
            || (threshold <= l.concavity && threshold <= r.concavity);
        let concavity = concavity.max(l.concavity).max(r.concavity);

        let node = if absorb {
            let mut faces = std::mem::take(&mut self.nodes[left].faces);
            faces.append(&mut self.nodes[right].faces);
            MergeTreeNode {
                faces,
                concavity,
                children: None,
            }
        } else {
            let mut faces = Vec::with_capacity(l.faces.len() + r.faces.len());
            faces.extend_from_slice(&l.faces);
            faces.extend_from_slice(&r.faces);
            MergeTreeNode {
                faces,
                concavity,
                children: Some([left, right]),
            }
        };

        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Cuts the subtree of `root` into at most `count` clusters.
    ///
    /// The most concave cluster of the cut is replaced by its children until the
    /// cut reaches `count` clusters or only leaves remain.
    pub fn reduce_by_count(&self, root: usize, count: usize) -> Vec<usize> {
        let count = count.max(1);
        self.reduce_while(root, |len, _| len < count)
    }

    /// Cuts the subtree of `root` until every cluster has a concavity of at most
    /// `concavity` or is a leaf.
    pub fn reduce_by_concavity(&self, root: usize, concavity: Real) -> Vec<usize> {
        self.reduce_while(root, |_, worst| worst > concavity)
    }

    /// Cuts the subtree of `root` until every cluster has a concavity of at most
    /// `concavity`, or until the cut reaches `max_count` clusters.
    pub fn reduce(&self, root: usize, max_count: usize, concavity: Real) -> Vec<usize> {
        let max_count = max_count.max(1);
        self.reduce_while(root, |len, worst| len < max_count && worst > concavity)
    }

    /// Splits the worst cluster of the cut while `split(cut size, worst concavity)` holds.
    ///
    /// Leaves cannot be split: they are pinned at the bottom of the frontier with a
    /// negative concavity. Returns the cut, most concave first.
    fn reduce_while(&self, root: usize, mut split: impl FnMut(usize, Real) -> bool) -> Vec<usize> {
        let mut frontier = BinaryHeap::new();
        frontier.push(WeightedValue::new(root, self.nodes[root].concavity));

        while let Some(worst) = frontier.peek().copied() {
            if worst.cost < 0.0 || !split(frontier.len(), worst.cost) {
                break;
            }

            let _ = frontier.pop();

            match self.nodes[worst.value].children {
                Some([left, right]) => {
                    frontier.push(WeightedValue::new(left, self.nodes[left].concavity));
                    frontier.push(WeightedValue::new(right, self.nodes[right].concavity));
                }
                None => frontier.push(WeightedValue::new(worst.value, -1.0)),
            }
        }

        let mut cut = Vec::with_capacity(frontier.len());
        while let Some(entry) = frontier.pop() {
            cut.push(entry.value);
        }
        cut
    }
}

#[cfg(test)]
mod test {
    use super::MergeTree;
    use crate::math::Real;

    fn sorted_faces(tree: &MergeTree, cut: &[usize]) -> Vec<usize> {
        let mut faces: Vec<_> = cut
            .iter()
            .flat_map(|n| tree.node(*n).faces().iter().copied())
            .collect();
        faces.sort_unstable();
        faces
    }

    fn check_monotonicity(tree: &MergeTree, node: usize) {
        if let Some(children) = tree.node(node).children() {
            for child in children {
                assert!(tree.node(child).concavity() <= tree.node(node).concavity());
                check_monotonicity(tree, child);
            }
        }
    }

    #[test]
    fn single_faces_are_absorbed() {
        let mut tree = MergeTree::new(1.0e-5);
        let a = tree.add_leaf(0);
        let b = tree.add_leaf(1);
        let ab = tree.join(a, b, 0.5);

        assert!(tree.node(ab).is_leaf());
        assert_eq!(tree.node(ab).faces(), &[0, 1]);
        assert_eq!(tree.reduce_by_count(ab, 10), vec![ab]);
    }

    #[test]
    fn similar_children_are_absorbed() {
        let mut tree = MergeTree::new(1.0e-5);
        let leaves: Vec<_> = (0..4).map(|i| tree.add_leaf(i)).collect();
        let ab = tree.join(leaves[0], leaves[1], 0.3);
        let cd = tree.join(leaves[2], leaves[3], 0.3);

        let root = tree.join(ab, cd, 0.3 + 1.0e-6);
        assert!(tree.node(root).is_leaf());

        let mut tree = MergeTree::new(1.0e-5);
        let leaves: Vec<_> = (0..4).map(|i| tree.add_leaf(i)).collect();
        let ab = tree.join(leaves[0], leaves[1], 0.3);
        let cd = tree.join(leaves[2], leaves[3], 0.1);
        let root = tree.join(ab, cd, 0.5);
        assert_eq!(tree.node(root).children(), Some([ab, cd]));
        assert_eq!(tree.node(root).faces(), &[0, 1, 2, 3]);
    }

    #[test]
    fn cuts_cover_the_root() {
        let mut tree = MergeTree::new(1.0e-5);
        let mut rng = oorandom::Rand64::new(12);
        let mut roots: Vec<usize> = (0..64).map(|i| tree.add_leaf(i)).collect();

        // Random pairings with random concavities.
        while roots.len() > 1 {
            let i = rng.rand_range(0..roots.len() as u64) as usize;
            let a = roots.swap_remove(i);
            let j = rng.rand_range(0..roots.len() as u64) as usize;
            let b = roots.swap_remove(j);
            let concavity = rng.rand_float() as Real;
            roots.push(tree.join(a, b, concavity));
        }

        let root = roots[0];
        let all: Vec<usize> = (0..64).collect();
        check_monotonicity(&tree, root);

        for count in [1, 2, 5, 16, 100] {
            let cut = tree.reduce_by_count(root, count);
            assert!(cut.len() <= count.max(1));
            assert_eq!(sorted_faces(&tree, &cut), all);
        }

        let cut = tree.reduce_by_concavity(root, 0.5);
        assert_eq!(sorted_faces(&tree, &cut), all);
        for node in &cut {
            let node = tree.node(*node);
            assert!(node.is_leaf() || node.concavity() <= 0.5);
        }

        let cut = tree.reduce(root, 3, 0.5);
        assert!(cut.len() <= 3);
        assert_eq!(sorted_faces(&tree, &cut), all);
    }
}
