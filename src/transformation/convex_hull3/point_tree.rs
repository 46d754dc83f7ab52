use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use arrayvec::ArrayVec;

/// Maximum number of points stored by a leaf.
const CLUMP_SIZE: usize = 8;
/// Absolute margin added around every node's box.
const BOX_PADDING: Real = 1.0e-3;

#[derive(Clone, Debug)]
enum PointTreeNodeKind {
    Internal { left: usize, right: usize },
    Clump(ArrayVec<u32, CLUMP_SIZE>),
}

#[derive(Clone, Debug)]
struct PointTreeNode {
    aabb: Aabb,
    parent: Option<usize>,
    kind: PointTreeNodeKind,
}

/// A bounding volume hierarchy over a point cloud answering support-point queries.
///
/// Points can be consumed: they are skipped by subsequent queries and lazily removed
/// from their leaf. Leaves that become empty are unlinked from the tree.
#[derive(Clone, Debug)]
pub(super) struct PointTree {
    nodes: Vec<PointTreeNode>,
    root: Option<usize>,
    consumed: Vec<bool>,
    aabb: Aabb,
}

impl PointTree {
    pub fn new(points: &[Point<Real>]) -> Self {
        let mut order: Vec<u32> = (0..points.len() as u32).collect();
        let mut tree = PointTree {
            nodes: Vec::with_capacity(points.len() / 2 + 1),
            root: None,
            consumed: vec![false; points.len()],
            aabb: Aabb::new_invalid(),
        };

        if !points.is_empty() {
            let root = tree.build_recursive(points, &mut order, None);
            tree.aabb = tree.nodes[root].aabb;
            tree.root = Some(root);
        }

        tree
    }

    /// The padded bounding box of the whole point cloud.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn consume(&mut self, point: u32) {
        self.consumed[point as usize] = true;
    }

    pub fn is_consumed(&self, point: u32) -> bool {
        self.consumed[point as usize]
    }

    /// Consumes every point accepted by `is_interior` among the points that lie on the
    /// negative side of all the `planes`, each given by a point and a normal.
    ///
    /// Subtrees whose box is entirely on the positive side of a plane are skipped.
    /// Returns the number of points consumed.
    pub fn consume_interior(
        &mut self,
        points: &[Point<Real>],
        planes: &[(Point<Real>, Vector<Real>)],
        is_interior: impl Fn(&Point<Real>) -> bool,
    ) -> usize {
        let mut count = 0;
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let aabb = &self.nodes[id].aabb;
            let outside = planes.iter().any(|(origin, normal)| {
                -aabb.support_projection(&-normal) > normal.dot(&origin.coords)
            });

            if outside {
                continue;
            }

            match &self.nodes[id].kind {
                PointTreeNodeKind::Internal { left, right } => stack.extend([*left, *right]),
                PointTreeNodeKind::Clump(clump) => {
                    for i in clump.clone() {
                        if !self.is_consumed(i) && is_interior(&points[i as usize]) {
                            self.consume(i);
                            count += 1;
                        }
                    }
                }
            }
        }

        count
    }

    fn build_recursive(
        &mut self,
        points: &[Point<Real>],
        order: &mut [u32],
        parent: Option<usize>,
    ) -> usize {
        let aabb = Aabb::from_points_ref(order.iter().map(|i| &points[*i as usize]))
            .loosened(BOX_PADDING);
        let id = self.nodes.len();

        if order.len() <= CLUMP_SIZE {
            self.nodes.push(PointTreeNode {
                aabb,
                parent,
                kind: PointTreeNodeKind::Clump(order.iter().copied().collect()),
            });
            return id;
        }

        self.nodes.push(PointTreeNode {
            aabb,
            parent,
            kind: PointTreeNodeKind::Internal { left: 0, right: 0 },
        });

        let split = Self::partition(points, order);
        let (lo, hi) = order.split_at_mut(split);
        let left = self.build_recursive(points, lo, Some(id));
        let right = self.build_recursive(points, hi, Some(id));
        self.nodes[id].kind = PointTreeNodeKind::Internal { left, right };

        id
    }

    /// Splits `order` around the mean of the points along their axis of largest variance.
    ///
    /// Returns the size of the first half, which is never empty.
    fn partition(points: &[Point<Real>], order: &mut [u32]) -> usize {
        let count = order.len();
        let mut mean = Vector::zeros();
        let mut squares = Vector::zeros();

        for i in order.iter() {
            let p = &points[*i as usize].coords;
            mean += p;
            squares += p.component_mul(p);
        }

        mean /= count as Real;
        let variance = squares / count as Real - mean.component_mul(&mean);
        let axis = variance.imax();
        let test = mean[axis];
        let coord = |i: u32| points[i as usize][axis];

        let mut i0 = 0isize;
        let mut i1 = count as isize - 1;

        while i0 <= i1 {
            while i0 <= i1 && coord(order[i0 as usize]) <= test {
                i0 += 1;
            }
            while i0 <= i1 && coord(order[i1 as usize]) > test {
                i1 -= 1;
            }

            if i0 < i1 {
                order.swap(i0 as usize, i1 as usize);
                i0 += 1;
                i1 -= 1;
            }
        }

        let split = i0 as usize;
        if split == 0 || split >= count - 1 {
            count / 2
        } else {
            split
        }
    }

    /// Finds the non-consumed point with the largest projection on `dir`.
    pub fn support_vertex(&mut self, points: &[Point<Real>], dir: &Vector<Real>) -> Option<u32> {
        let mut best = None;
        let mut max_proj = -Real::MAX;
        let mut stack = Vec::new();

        if let Some(root) = self.root {
            stack.push((root, self.nodes[root].aabb.support_projection(dir)));
        }

        while let Some((id, proj)) = stack.pop() {
            if proj <= max_proj {
                continue;
            }

            if let PointTreeNodeKind::Internal { left, right } = self.nodes[id].kind {
                let left_proj = self.nodes[left].aabb.support_projection(dir);
                let right_proj = self.nodes[right].aabb.support_projection(dir);

                // The most promising child is visited first.
                if right_proj >= left_proj {
                    stack.push((left, left_proj));
                    stack.push((right, right_proj));
                } else {
                    stack.push((right, right_proj));
                    stack.push((left, left_proj));
                }

                continue;
            }

            let PointTree {
                nodes, consumed, ..
            } = &mut *self;
            let mut emptied = false;

            if let PointTreeNodeKind::Clump(clump) = &mut nodes[id].kind {
                clump.retain(|i| !consumed[*i as usize]);

                for i in clump.iter() {
                    let dist = points[*i as usize].coords.dot(dir);
                    if dist > max_proj {
                        max_proj = dist;
                        best = Some(*i);
                    }
                }

                emptied = clump.is_empty();
            }

            if emptied {
                self.unlink(id);
            }
        }

        best
    }

    /// Removes the empty leaf `id` by putting its sibling in place of its parent.
    fn unlink(&mut self, id: usize) {
        let Some(parent) = self.nodes[id].parent else {
            return;
        };
        let PointTreeNodeKind::Internal { left, right } = self.nodes[parent].kind else {
            return;
        };
        let sibling = if left == id { right } else { left };
        let grand_parent = self.nodes[parent].parent;
        self.nodes[sibling].parent = grand_parent;

        match grand_parent {
            Some(grand_parent) => {
                if let PointTreeNodeKind::Internal { left, right } =
                    &mut self.nodes[grand_parent].kind
                {
                    if *left == parent {
                        *left = sibling;
                    } else {
                        *right = sibling;
                    }
                }
            }
            None => self.root = Some(sibling),
        }
    }
}
