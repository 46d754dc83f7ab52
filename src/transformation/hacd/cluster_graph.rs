use super::back_face::back_face_pairs;
use super::concavity::faces_concavity;
use super::mesh_face::MeshFace;
use super::merge_tree::MergeTree;
use super::progress::{report, ProgressCallback};
use super::HacdParameters;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::transformation::convex_hull3::ConvexHull;
use crate::utils::WeightedValue;
use na::RealField;
use slab::Slab;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Concavities below this value are treated as zero.
pub(crate) const CONCAVITY_SNAP: Real = 1.0e-3;
/// Tolerance of the coplanarity test, relative to the mesh diagonal.
const FLAT_TOLERANCE: Real = 1.0e-5;
const CONCAVITY_WEIGHT: Real = 100.0;
const SIZE_WEIGHT: Real = 10.0;
/// Perimeter multiplier of the links found by ray-casting.
const BACK_FACE_HANDICAP: Real = 0.5;
/// Concavity of the first join of disconnected components.
const COMPONENT_JOIN_CONCAVITY: Real = 10_000.0;

#[derive(Copy, Clone, Debug, PartialEq)]
struct Link {
    neighbor: usize,
    handicap: Real,
    /// The pending merge of the two linked clusters, if any.
    proxy: Option<usize>,
}

#[derive(Clone, Debug)]
struct Cluster {
    faces: Vec<usize>,
    area: Real,
    tree_node: usize,
    links: Vec<Link>,
}

impl Cluster {
    fn link(&self, neighbor: usize) -> Option<&Link> {
        self.links.iter().find(|l| l.neighbor == neighbor)
    }

    fn link_mut(&mut self, neighbor: usize) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.neighbor == neighbor)
    }
}

/// A candidate merge waiting in the priority queue.
///
/// Proxies are never removed from the queue when one of their clusters changes.
/// They are flagged as invalid instead and dropped once popped.
#[derive(Copy, Clone, Debug)]
struct PairProxy {
    a: usize,
    b: usize,
    area: Real,
    concavity: Real,
    valid: bool,
}

#[derive(Copy, Clone, Debug)]
struct Evaluation {
    area: Real,
    concavity: Real,
    cost: Real,
}

/// The dual graph of a mesh, where clusters of faces are merged greedily.
///
/// Every cluster starts as a single face linked to its neighbors, plus to the faces
/// facing it from close enough across the inside of the mesh. The cheapest pair of
/// linked clusters is merged until no link is left, each merge being recorded in
/// a [`MergeTree`].
pub(crate) struct ClusterGraph<'a> {
    faces: &'a [MeshFace],
    points: &'a [Point<Real>],
    clusters: Vec<Option<Cluster>>,
    face_cluster: Vec<usize>,
    proxies: Slab<PairProxy>,
    queue: BinaryHeap<Reverse<WeightedValue<usize>>>,
    tree: MergeTree,
    flat_tolerance: Real,
    merges: usize,
}

impl<'a> ClusterGraph<'a> {
    /// Creates one cluster per face and links the clusters.
    pub fn new(faces: &'a [MeshFace], points: &'a [Point<Real>], params: &HacdParameters) -> Self {
        let diagonal = Aabb::from_points_ref(points).diagonal();
        let mut tree = MergeTree::new(params.absorb_epsilon);
        let mut clusters: Vec<_> = faces
            .iter()
            .enumerate()
            .map(|(i, face)| {
                let mut links: Vec<Link> = Vec::with_capacity(face.neighbors.len());

                for (neighbor, _) in face.neighbors.iter().flatten() {
                    if *neighbor != i && !links.iter().any(|l| l.neighbor == *neighbor) {
                        links.push(Link {
                            neighbor: *neighbor,
                            handicap: 1.0,
                            proxy: None,
                        });
                    }
                }

                Some(Cluster {
                    faces: vec![i],
                    area: face.area,
                    tree_node: tree.add_leaf(i),
                    links,
                })
            })
            .collect();

        let threshold = params.back_face_distance_factor * diagonal;
        let mut virtual_links = 0;

        for (a, b) in back_face_pairs(faces, points, threshold) {
            let linked = clusters[a]
                .as_ref()
                .map(|c| c.link(b).is_some())
                .unwrap_or(true);

            if !linked {
                for (from, to) in [(a, b), (b, a)] {
                    if let Some(cluster) = clusters[from].as_mut() {
                        cluster.links.push(Link {
                            neighbor: to,
                            handicap: BACK_FACE_HANDICAP,
                            proxy: None,
                        });
                    }
                }
                virtual_links += 1;
            }
        }

        log::debug!(
            "Connectivity graph: {} clusters, {} back-face links.",
            clusters.len(),
            virtual_links
        );

        Self {
            faces,
            points,
            clusters,
            face_cluster: (0..faces.len()).collect(),
            proxies: Slab::new(),
            queue: BinaryHeap::new(),
            tree,
            flat_tolerance: FLAT_TOLERANCE * diagonal,
            merges: 0,
        }
    }

    /// The number of clusters not merged into another one yet.
    pub fn cluster_count(&self) -> usize {
        self.clusters.iter().flatten().count()
    }

    /// Evaluates every pair of linked clusters.
    pub fn submit_initial_costs(&mut self) {
        for a in 0..self.clusters.len() {
            let neighbors = self.neighbors_of(a);

            for (b, handicap) in neighbors {
                if b > a {
                    let evaluation = self.evaluate(a, b, handicap);
                    self.submit(a, b, evaluation);
                }
            }
        }

        log::debug!("Submitted {} initial merge candidates.", self.queue.len());
    }

    /// Merges the cheapest pairs of clusters until no candidate is left.
    pub fn collapse_all(&mut self, progress: &mut dyn ProgressCallback) {
        while self.collapse_cheapest(progress) {}

        log::debug!(
            "Performed {} merges, {} clusters left.",
            self.merges,
            self.cluster_count()
        );
    }

    /// Pops the cheapest candidate and merges its clusters if it is still valid.
    ///
    /// Returns `false` if the queue was empty.
    fn collapse_cheapest(&mut self, progress: &mut dyn ProgressCallback) -> bool {
        let Some(Reverse(entry)) = self.queue.pop() else {
            return false;
        };
        let key = entry.value;

        if let Some(proxy) = self.proxies.get(key).copied() {
            if proxy.valid {
                self.merges += 1;
                report(
                    progress,
                    "Performing HACD",
                    self.merges as Real / self.faces.len() as Real,
                );
                log::trace!(
                    "Merging clusters {} and {} (cost: {}, concavity: {}).",
                    proxy.a,
                    proxy.b,
                    entry.cost,
                    proxy.concavity
                );
                self.collapse(proxy);
            }

            let _ = self.proxies.remove(key);
        }

        true
    }

    /// Merges the cluster `proxy.b` into `proxy.a`.
    fn collapse(&mut self, proxy: PairProxy) {
        let (a, b) = (proxy.a, proxy.b);
        let Some(node_a) = self.clusters[a].as_ref().map(|c| c.tree_node) else {
            return;
        };

        self.invalidate_proxies(a);
        self.invalidate_proxies(b);

        let Some(removed) = self.clusters[b].take() else {
            return;
        };
        let node = self.tree.join(node_a, removed.tree_node, proxy.concavity);

        for face in &removed.faces {
            self.face_cluster[*face] = a;
        }

        let mut new_links = Vec::new();

        for link in &removed.links {
            let n = link.neighbor;
            if n == a {
                continue;
            }

            if let Some(neighbor) = self.clusters[n].as_mut() {
                neighbor.links.retain(|l| l.neighbor != b);

                if neighbor.link(a).is_none() {
                    neighbor.links.push(Link {
                        neighbor: a,
                        handicap: 1.0,
                        proxy: None,
                    });
                    new_links.push(Link {
                        neighbor: n,
                        handicap: 1.0,
                        proxy: None,
                    });
                }
            }
        }

        if let Some(cluster) = self.clusters[a].as_mut() {
            cluster.links.retain(|l| l.neighbor != b);
            cluster.links.extend(new_links);
            cluster.faces.extend_from_slice(&removed.faces);
            cluster.area = proxy.area;
            cluster.tree_node = node;
        }

        self.resubmit(a);
    }

    /// Evaluates the merge of `a` with each of its neighbors.
    fn resubmit(&mut self, a: usize) {
        let neighbors = self.neighbors_of(a);

        #[cfg(feature = "parallel")]
        let evaluations: Vec<_> = {
            use rayon::prelude::*;
            let graph = &*self;
            neighbors
                .par_iter()
                .map(|(b, handicap)| graph.evaluate(a, *b, *handicap))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let evaluations: Vec<_> = neighbors
            .iter()
            .map(|(b, handicap)| self.evaluate(a, *b, *handicap))
            .collect();

        for ((b, _), evaluation) in neighbors.into_iter().zip(evaluations) {
            self.submit(a, b, evaluation);
        }
    }

    fn neighbors_of(&self, cluster: usize) -> Vec<(usize, Real)> {
        self.clusters[cluster]
            .as_ref()
            .map(|c| c.links.iter().map(|l| (l.neighbor, l.handicap)).collect())
            .unwrap_or_default()
    }

    /// Flags every candidate merge involving `cluster` as invalid.
    fn invalidate_proxies(&mut self, cluster: usize) {
        let Some(c) = self.clusters[cluster].as_mut() else {
            return;
        };
        let stale: Vec<_> = c
            .links
            .iter_mut()
            .filter_map(|l| Some((l.neighbor, l.proxy.take()?)))
            .collect();

        for (neighbor, key) in stale {
            if let Some(proxy) = self.proxies.get_mut(key) {
                proxy.valid = false;
            }

            if let Some(link) = self.clusters[neighbor]
                .as_mut()
                .and_then(|n| n.link_mut(cluster))
            {
                link.proxy = None;
            }
        }
    }

    fn submit(&mut self, a: usize, b: usize, evaluation: Option<Evaluation>) {
        let Some(evaluation) = evaluation else {
            return;
        };
        let key = self.proxies.insert(PairProxy {
            a,
            b,
            area: evaluation.area,
            concavity: evaluation.concavity,
            valid: true,
        });

        for (from, to) in [(a, b), (b, a)] {
            if let Some(link) = self.clusters[from].as_mut().and_then(|c| c.link_mut(to)) {
                link.proxy = Some(key);
            }
        }

        self.queue
            .push(Reverse(WeightedValue::new(key, evaluation.cost)));
    }

    /// Computes the cost of merging the clusters `a` and `b`.
    ///
    /// Returns `None` if their union has no convex hull.
    fn evaluate(&self, a: usize, b: usize, handicap: Real) -> Option<Evaluation> {
        let ca = self.clusters[a].as_ref()?;
        let cb = self.clusters[b].as_ref()?;
        let area = ca.area + cb.area;

        let concavity = if self.is_flat_pair(ca, cb) {
            0.0
        } else {
            let mut ids: Vec<u32> = ca
                .faces
                .iter()
                .chain(cb.faces.iter())
                .flat_map(|f| self.faces[*f].vertices.iter().copied())
                .collect();
            ids.sort_unstable();
            ids.dedup();
            let points: Vec<_> = ids.iter().map(|i| self.points[*i as usize]).collect();
            let hull = ConvexHull::new(&points, 0.0, None);

            if hull.is_empty() {
                return None;
            }

            let concavity = faces_concavity(&hull, self.faces, &ca.faces, self.points)
                .max(faces_concavity(&hull, self.faces, &cb.faces, self.points));

            if concavity < CONCAVITY_SNAP {
                0.0
            } else {
                concavity
            }
        };

        let perimeter = self.outer_perimeter(ca, a, b) + self.outer_perimeter(cb, a, b);
        let cost = merge_cost(
            concavity,
            area,
            perimeter * handicap * handicap,
            ca.faces.len() + cb.faces.len(),
            self.faces.len(),
        );

        Some(Evaluation {
            area,
            concavity,
            cost,
        })
    }

    /// Are `ca` and `cb` both on the plane of the first face of `ca`?
    fn is_flat_pair(&self, ca: &Cluster, cb: &Cluster) -> bool {
        let first = &self.faces[ca.faces[0]];
        let normal = first.normal;

        if normal.norm_squared() == 0.0 {
            return false;
        }

        let origin = self.points[first.vertices[0] as usize];
        let on_plane = |cluster: &Cluster| {
            cluster
                .faces
                .iter()
                .flat_map(|f| self.faces[*f].vertices.iter())
                .all(|v| (self.points[*v as usize] - origin).dot(&normal).abs() <= self.flat_tolerance)
        };

        (ca.faces.len() == 1 || on_plane(ca)) && on_plane(cb)
    }

    /// The length of the edges of `cluster` bordering neither `a` nor `b`.
    fn outer_perimeter(&self, cluster: &Cluster, a: usize, b: usize) -> Real {
        let mut perimeter = 0.0;

        for face in cluster.faces.iter().map(|f| &self.faces[*f]) {
            for (slot, neighbor) in face.neighbors.iter().enumerate() {
                let inner = neighbor
                    .map(|(f, _)| {
                        let c = self.face_cluster[f];
                        c == a || c == b
                    })
                    .unwrap_or(false);

                if !inner {
                    let (i, j) = face.edge(slot);
                    perimeter += na::distance(&self.points[i as usize], &self.points[j as usize]);
                }
            }
        }

        perimeter
    }

    /// Joins the trees of the remaining clusters and returns the complete tree and
    /// its root.
    ///
    /// Single-face components are discarded unless nothing else is left.
    pub fn into_merge_tree(mut self) -> (MergeTree, Option<usize>) {
        let mut roots: Vec<usize> = self
            .clusters
            .iter()
            .flatten()
            .map(|c| c.tree_node)
            .collect();
        roots.sort_unstable();

        let tree = &mut self.tree;

        if roots.len() > 1 && roots.iter().any(|r| tree.node(*r).faces().len() > 1) {
            roots.retain(|r| tree.node(*r).faces().len() > 1);
        }

        let mut concavity = COMPONENT_JOIN_CONCAVITY;

        while roots.len() > 1 {
            let (Some(left), Some(right)) = (roots.pop(), roots.pop()) else {
                break;
            };
            roots.push(tree.join(left, right, concavity));
            concavity *= 2.0;
        }

        (self.tree, roots.pop())
    }
}

/// The cost of merging two clusters into a cluster of area `area`.
///
/// The concavity dominates. The isoperimetric ratio favors compact clusters and the
/// last term favors small ones.
fn merge_cost(
    concavity: Real,
    area: Real,
    perimeter: Real,
    face_count: usize,
    total_face_count: usize,
) -> Real {
    let compactness = if area > 0.0 {
        perimeter * perimeter / (4.0 * Real::pi() * area)
    } else {
        0.0
    };

    CONCAVITY_WEIGHT * concavity
        + compactness
        + SIZE_WEIGHT * face_count as Real / total_face_count.max(1) as Real
}
