use super::cluster_graph::CONCAVITY_SNAP;
use super::concavity::faces_concavity;
use super::mesh_face::MeshFace;
use super::progress::{report, ProgressCallback};
use super::HacdParameters;
use crate::math::{Point, Real};
use crate::polyhedron::is_convex_corner;
use crate::transformation::convex_hull3::ConvexHull;
use crate::utils::hashmap::HashSet;
use crate::utils::WeightedValue;
use na::RealField;
use slab::Slab;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Absolute tolerance of the coplanarity test.
const FLAT_TOLERANCE: Real = 1.0e-5;
/// Penalty of the merges of coplanar clusters that would make a concave polygon.
const CONCAVE_SEAM_PENALTY: Real = 1000.0;

#[derive(Clone, Debug, Default)]
struct FastCluster {
    faces: Vec<usize>,
    area: Real,
    perimeter: Real,
}

/// A candidate merge of the two clusters on each side of a mesh edge.
#[derive(Copy, Clone, Debug)]
struct EdgeProxy {
    a: usize,
    b: usize,
    /// The edge, from the side of `a` then from the side of `b`.
    slots: [(usize, usize); 2],
    area: Real,
    perimeter: Real,
    valid: bool,
}

struct FastClustering<'a> {
    faces: &'a [MeshFace],
    points: &'a [Point<Real>],
    clusters: Vec<FastCluster>,
    face_cluster: Vec<usize>,
    edge_proxies: Vec<SmallVec<[Option<usize>; 8]>>,
    proxies: Slab<EdgeProxy>,
    queue: BinaryHeap<Reverse<WeightedValue<usize>>>,
    budget: Real,
}

/// Clusters the faces of a mesh without building any merge tree.
///
/// Every candidate merge is attached to one edge between the two clusters. Clusters
/// are merged, the cheapest first, while the cost stays below `params.concavity` or
/// while there are more than `params.max_hulls` clusters. Returns the faces of
/// every resulting cluster.
pub(crate) fn fast_clusters(
    faces: &[MeshFace],
    points: &[Point<Real>],
    params: &HacdParameters,
    progress: &mut dyn ProgressCallback,
) -> Vec<Vec<usize>> {
    let mut clustering = FastClustering {
        faces,
        points,
        clusters: faces
            .iter()
            .enumerate()
            .map(|(i, face)| FastCluster {
                faces: vec![i],
                area: face.area,
                perimeter: face.perimeter,
            })
            .collect(),
        face_cluster: (0..faces.len()).collect(),
        edge_proxies: faces
            .iter()
            .map(|f| SmallVec::from_elem(None, f.vertices.len()))
            .collect(),
        proxies: Slab::new(),
        queue: BinaryHeap::new(),
        budget: params.concavity,
    };

    for cluster in 0..faces.len() {
        clustering.submit_costs(cluster, |neighbor| neighbor > cluster);
    }

    let mut cluster_count = faces.len();
    let mut merges = 0;

    while let Some(Reverse(top)) = clustering.queue.peek().copied() {
        if top.cost >= clustering.budget && cluster_count <= params.max_hulls {
            break;
        }

        let _ = clustering.queue.pop();
        let key = top.value;

        if let Some(proxy) = clustering.proxies.get(key).copied() {
            if proxy.valid {
                merges += 1;
                cluster_count -= 1;
                report(
                    progress,
                    "Performing HACD",
                    merges as Real / faces.len() as Real,
                );
                let kept = clustering.merge(proxy);
                clustering.submit_costs(kept, |neighbor| neighbor != kept);
            }

            let _ = clustering.proxies.remove(key);
        }
    }

    log::debug!(
        "Fast clustering: {} merges, {} clusters left.",
        merges,
        cluster_count
    );

    clustering
        .clusters
        .into_iter()
        .filter(|c| !c.faces.is_empty())
        .map(|c| c.faces)
        .collect()
}

impl FastClustering<'_> {
    /// Evaluates the merge of `cluster` with each of its neighbors accepted by `filter`,
    /// using the first edge found between them.
    fn submit_costs(&mut self, cluster: usize, filter: impl Fn(usize) -> bool) {
        let mut seen = HashSet::default();
        let mut candidates = Vec::new();

        for face_id in &self.clusters[cluster].faces {
            let face = &self.faces[*face_id];

            for (slot, neighbor) in face.neighbors.iter().enumerate() {
                let Some((twin_face, twin_slot)) = *neighbor else {
                    continue;
                };
                let other = self.face_cluster[twin_face];

                if other != cluster && filter(other) && seen.insert(other) {
                    candidates.push((other, [(*face_id, slot), (twin_face, twin_slot)]));
                }
            }
        }

        for (other, slots) in candidates {
            let (area, perimeter, cost) = self.evaluate(cluster, other, slots);
            let key = self.proxies.insert(EdgeProxy {
                a: cluster,
                b: other,
                slots,
                area,
                perimeter,
                valid: true,
            });

            for (face, slot) in slots {
                self.edge_proxies[face][slot] = Some(key);
            }

            self.queue.push(Reverse(WeightedValue::new(key, cost)));
        }
    }

    /// The area, perimeter and cost of the merge of `a` and `b` through the edge `slots`.
    fn evaluate(&self, a: usize, b: usize, slots: [(usize, usize); 2]) -> (Real, Real, Real) {
        let ca = &self.clusters[a];
        let cb = &self.clusters[b];
        let (face, slot) = slots[0];
        let (i, j) = self.faces[face].edge(slot);
        let edge_length = 2.0 * na::distance(&self.points[i as usize], &self.points[j as usize]);
        let area = ca.area + cb.area;
        let perimeter = ca.perimeter + cb.perimeter - edge_length;

        let mut ids: Vec<u32> = ca
            .faces
            .iter()
            .chain(cb.faces.iter())
            .flat_map(|f| self.faces[*f].vertices.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let cloud: Vec<_> = ids.iter().map(|i| self.points[*i as usize]).collect();
        let hull = ConvexHull::new(&cloud, 0.0, None);

        let mut concavity = if hull.is_empty() {
            0.0
        } else {
            faces_concavity(&hull, self.faces, &ca.faces, self.points)
                .max(faces_concavity(&hull, self.faces, &cb.faces, self.points))
        };

        if concavity < CONCAVITY_SNAP {
            concavity = 0.0;

            if self.is_flat_pair(ca, cb) && !self.is_convex_seam(slots) {
                concavity += CONCAVE_SEAM_PENALTY;
            }
        }

        let compactness = if area > 0.0 {
            perimeter * perimeter / (4.0 * Real::pi() * area)
        } else {
            0.0
        };

        (area, perimeter, concavity + compactness * self.budget / 10.0)
    }

    /// Are `ca` and `cb` both on the plane of the first face of `ca`?
    fn is_flat_pair(&self, ca: &FastCluster, cb: &FastCluster) -> bool {
        let first = &self.faces[ca.faces[0]];
        let normal = first.normal;

        if normal.norm_squared() == 0.0 {
            return false;
        }

        let origin = self.points[first.vertices[0] as usize];
        let on_plane = |cluster: &FastCluster| {
            cluster
                .faces
                .iter()
                .flat_map(|f| self.faces[*f].vertices.iter())
                .all(|v| (self.points[*v as usize] - origin).dot(&normal).abs() <= FLAT_TOLERANCE)
        };

        (ca.faces.len() == 1 || on_plane(ca)) && on_plane(cb)
    }

    /// Would the two faces on each side of the edge form a convex polygon if merged?
    fn is_convex_seam(&self, [(f, s), (g, t)]: [(usize, usize); 2]) -> bool {
        let face = &self.faces[f];
        let twin = &self.faces[g];
        let n = face.vertices.len();
        let m = twin.vertices.len();
        let pt = |i: u32| &self.points[i as usize];

        // face: x → a → b → w, twin: z → b → a → y
        let (a, b) = face.edge(s);
        let x = face.vertices[(s + n - 1) % n];
        let w = face.vertices[(s + 2) % n];
        let y = twin.vertices[(t + 2) % m];
        let z = twin.vertices[(t + m - 1) % m];

        is_convex_corner(&face.normal, pt(x), pt(a), pt(y))
            && is_convex_corner(&face.normal, pt(z), pt(b), pt(w))
    }

    /// Merges the clusters of `proxy` into the one with the smallest index.
    fn merge(&mut self, proxy: EdgeProxy) -> usize {
        let (kept, removed) = (proxy.a.min(proxy.b), proxy.a.max(proxy.b));
        let faces = std::mem::take(&mut self.clusters[removed].faces);

        for face in &faces {
            self.face_cluster[*face] = kept;
        }

        let cluster = &mut self.clusters[kept];
        cluster.faces.extend(faces);
        cluster.area = proxy.area;
        cluster.perimeter = proxy.perimeter;
        self.clusters[removed] = FastCluster::default();

        for face in self.clusters[kept].faces.clone() {
            for slot in 0..self.edge_proxies[face].len() {
                if let Some(key) = self.edge_proxies[face][slot].take() {
                    if let Some(stale) = self.proxies.get_mut(key) {
                        stale.valid = false;

                        for (f, s) in stale.slots {
                            self.edge_proxies[f][s] = None;
                        }
                    }
                }
            }
        }

        kept
    }
}

#[cfg(test)]
mod test {
    use super::fast_clusters;
    use crate::math::{Real, Vector};
    use crate::transformation::hacd::mesh_face::extract_faces;
    use crate::transformation::hacd::{HacdMesh, HacdParameters};

    fn clusters(mesh: &HacdMesh, params: &HacdParameters) -> Vec<Vec<usize>> {
        let polyhedron = mesh.to_polyhedron();
        let faces = extract_faces(&polyhedron, mesh.points());
        fast_clusters(&faces, mesh.points(), params, &mut |_: &str, _: Real| {})
    }

    #[test]
    fn convex_mesh_is_one_cluster() {
        let mesh = HacdMesh::cuboid(Vector::new(1.0, 2.0, 3.0));
        let clusters = clusters(&mesh, &HacdParameters::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 6);
    }

    #[test]
    fn cluster_count_is_bounded() {
        let mesh = HacdMesh::cuboid(Vector::new(1.0, 2.0, 3.0));
        // Nothing is cheap enough, but at most two clusters are allowed.
        let params = HacdParameters {
            concavity: 0.0,
            max_hulls: 2,
            ..HacdParameters::default()
        };
        let clusters = clusters(&mesh, &params);
        assert_eq!(clusters.len(), 2);

        let mut faces: Vec<_> = clusters.concat();
        faces.sort_unstable();
        assert_eq!(faces, vec![0, 1, 2, 3, 4, 5]);
    }
}
