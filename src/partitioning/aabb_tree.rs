use crate::bounding_volume::Aabb;
use crate::math::{Real, DIM};
use crate::query::Ray;
use ordered_float::OrderedFloat;

/// A node of an [`AabbTree`].
#[derive(Copy, Clone, Debug)]
pub enum AabbTreeNode {
    /// An internal node with exactly two children.
    Internal {
        /// The AABB enclosing both children.
        aabb: Aabb,
        /// Index of the first child in the node list.
        left: u32,
        /// Index of the second child in the node list.
        right: u32,
    },
    /// A leaf referencing one user primitive.
    Leaf {
        /// The AABB of the primitive.
        aabb: Aabb,
        /// The user-defined index of the primitive.
        data: u32,
    },
}

impl AabbTreeNode {
    /// The bounding box of this node.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        match self {
            AabbTreeNode::Internal { aabb, .. } | AabbTreeNode::Leaf { aabb, .. } => aabb,
        }
    }
}

/// A static binary bounding volume hierarchy.
///
/// The tree is built top-down once, by splitting the primitives at the median of their
/// centers along the largest axis of the node. It is used to find the geometry hit first
/// by a ray, for example when looking for the mesh face lying behind another one.
#[derive(Clone, Debug, Default)]
pub struct AabbTree {
    nodes: Vec<AabbTreeNode>,
    root: Option<u32>,
}

impl AabbTree {
    /// Builds a tree from a set of `(primitive index, primitive AABB)` pairs.
    pub fn new(mut leaves: Vec<(u32, Aabb)>) -> Self {
        let mut tree = AabbTree {
            nodes: Vec::with_capacity(leaves.len() * 2),
            root: None,
        };

        if !leaves.is_empty() {
            tree.root = Some(tree.build_recursive(&mut leaves));
        }

        tree
    }

    fn build_recursive(&mut self, leaves: &mut [(u32, Aabb)]) -> u32 {
        if let [(data, aabb)] = leaves {
            self.nodes.push(AabbTreeNode::Leaf {
                aabb: *aabb,
                data: *data,
            });
            return self.nodes.len() as u32 - 1;
        }

        let mut aabb = Aabb::new_invalid();
        let mut centers = Aabb::new_invalid();
        for (_, leaf_aabb) in leaves.iter() {
            aabb.merge(leaf_aabb);
            centers.take_point(leaf_aabb.center());
        }

        let extents = centers.extents();
        let axis = (0..DIM)
            .max_by_key(|i| OrderedFloat(extents[*i]))
            .unwrap_or(0);
        let mid = leaves.len() / 2;
        let _ = leaves.select_nth_unstable_by_key(mid, |(_, leaf_aabb)| {
            OrderedFloat(leaf_aabb.center()[axis])
        });

        let (left_leaves, right_leaves) = leaves.split_at_mut(mid);
        let left = self.build_recursive(left_leaves);
        let right = self.build_recursive(right_leaves);
        self.nodes.push(AabbTreeNode::Internal { aabb, left, right });
        self.nodes.len() as u32 - 1
    }

    /// The number of nodes (internal and leaves) of this tree.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The AABB of the whole tree, if it isn't empty.
    pub fn root_aabb(&self) -> Option<&Aabb> {
        self.root.map(|root| self.nodes[root as usize].aabb())
    }

    /// Finds the primitive hit first by a ray.
    ///
    /// The `primitive_check` closure casts the ray on the primitive with the given index
    /// and returns its time of impact, if any. Its `Real` argument is the time of impact of
    /// the closest hit found so far (or `max_time_of_impact`), returning a larger value is
    /// allowed but has no effect.
    pub fn cast_ray(
        &self,
        ray: &Ray,
        max_time_of_impact: Real,
        mut primitive_check: impl FnMut(u32, Real) -> Option<Real>,
    ) -> Option<(u32, Real)> {
        let mut best = None;
        let mut best_toi = max_time_of_impact;
        let mut stack = Vec::new();
        stack.extend(self.root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            let Some((tmin, _)) = node.aabb().clip_ray(ray, best_toi) else {
                continue;
            };

            if tmin > best_toi {
                continue;
            }

            match node {
                AabbTreeNode::Leaf { data, .. } => {
                    if let Some(toi) = primitive_check(*data, best_toi) {
                        if toi <= best_toi {
                            best_toi = toi;
                            best = Some((*data, toi));
                        }
                    }
                }
                AabbTreeNode::Internal { left, right, .. } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }

        best
    }

    /// Collects the primitives whose AABB intersects `aabb`.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Vec<u32> {
        let mut result = Vec::new();
        let mut stack = Vec::new();
        stack.extend(self.root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            if !node.aabb().intersects(aabb) {
                continue;
            }

            match node {
                AabbTreeNode::Leaf { data, .. } => result.push(*data),
                AabbTreeNode::Internal { left, right, .. } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }

        result
    }
}
