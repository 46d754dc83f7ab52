//! Merging of coplanar faces into convex polygons.

use super::{EdgeHandle, Polyhedron};
use crate::math::{Point, Real, Vector};

/// Two faces are coplanar if the dot product of their unit normals exceeds this.
const COPLANARITY_THRESHOLD: Real = 1.0 - 1.0e-6;
/// Sine under which a corner is considered flat rather than reflex.
const FLAT_CORNER_SINE: Real = -1.0e-9;

/// Tests if the corner `prev → corner → next` turns counterclockwise around `normal`.
///
/// Flat corners are convex, degenerate (zero-length) sides are not.
pub(crate) fn is_convex_corner(
    normal: &Vector<Real>,
    prev: &Point<Real>,
    corner: &Point<Real>,
    next: &Point<Real>,
) -> bool {
    let d0 = corner - prev;
    let d1 = next - corner;
    let scale = d0.norm() * d1.norm();

    scale > 0.0 && normal.dot(&d0.cross(&d1)) / scale >= FLAT_CORNER_SINE
}

impl Polyhedron {
    /// Merges the two faces on each side of `handle` by deleting the edge.
    ///
    /// The merged face takes the id of the face of `handle`. Returns `false` without
    /// modifying `self` if both sides do not belong to two distinct interior faces.
    pub fn merge_faces(&mut self, handle: EdgeHandle) -> bool {
        let Some(edge) = self.get_edge(handle).copied() else {
            return false;
        };
        let Some(twin) = edge.twin else {
            return false;
        };
        let twin_face = self.edge(twin).face;

        if edge.face <= 0 || twin_face <= 0 || edge.face == twin_face {
            return false;
        }

        let anchor = edge.prev;
        self.delete_edge(handle);

        let merged: Vec<EdgeHandle> = self.face_loop(anchor).collect();
        for h in merged {
            self.edge_mut(h).face = edge.face;
        }

        true
    }

    /// Tests whether deleting `handle` would merge two coplanar faces into a convex one.
    fn can_merge_convex(&self, handle: EdgeHandle, points: &[Point<Real>]) -> bool {
        let edge = self.edge(handle);
        let Some(twin_handle) = edge.twin else {
            return false;
        };
        let twin = self.edge(twin_handle);

        if edge.face <= 0 || twin.face <= 0 || edge.face == twin.face {
            return false;
        }

        let (Some(n1), Some(n2)) = (
            self.face_normal(handle, points).try_normalize(1.0e-12),
            self.face_normal(twin_handle, points).try_normalize(1.0e-12),
        ) else {
            return false;
        };

        if n1.dot(&n2) < COPLANARITY_THRESHOLD {
            return false;
        }

        let a = edge.origin;
        let b = twin.origin;
        let x = self.edge(edge.prev).origin;
        let y = self.destination(twin.next);
        let z = self.edge(twin.prev).origin;
        let w = self.destination(edge.next);

        // The faces share more than this edge around one of its endpoints.
        if x == y || z == w {
            return false;
        }

        let normal = (n1 + n2).normalize();
        let p = |i: u32| &points[i as usize];

        is_convex_corner(&normal, p(x), p(a), p(y)) && is_convex_corner(&normal, p(z), p(b), p(w))
    }

    /// Partitions every planar region of this polyhedron into convex polygons.
    ///
    /// Faces are triangulated first. Every edge shared by two coplanar faces is
    /// then deleted, in increasing handle order, whenever the merged face stays
    /// convex. Returns the number of deleted edges.
    pub fn convex_partition(&mut self, points: &[Point<Real>]) -> usize {
        self.triangulate(points);

        let candidates: Vec<EdgeHandle> = self
            .edges()
            .filter(|(h, e)| e.twin.map(|t| *h < t).unwrap_or(false))
            .map(|(h, _)| h)
            .collect();
        let mut merged = 0;

        for handle in candidates {
            if self.get_edge(handle).is_none() {
                continue;
            }

            if self.can_merge_convex(handle, points) && self.merge_faces(handle) {
                merged += 1;
            }
        }

        log::debug!(
            "Convex partition merged {} face pairs, {} faces left.",
            merged,
            self.face_count()
        );

        merged
    }
}

#[cfg(test)]
mod test {
    use crate::math::{Point, Real};
    use crate::polyhedron::Polyhedron;

    fn is_convex(mesh: &Polyhedron, points: &[Point<Real>]) -> bool {
        mesh.faces().into_iter().all(|face| {
            let normal = mesh.face_normal(face, points);
            let vertices = mesh.face_vertices(face);
            let n = vertices.len();
            (0..n).all(|i| {
                let a = points[vertices[i] as usize];
                let b = points[vertices[(i + 1) % n] as usize];
                let c = points[vertices[(i + 2) % n] as usize];
                normal.dot(&(b - a).cross(&(c - b))) >= -1.0e-12
            })
        })
    }

    #[test]
    fn cube_triangles_merge_into_quads() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ];
        let triangles = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        let mut mesh = Polyhedron::new();
        for t in &triangles {
            assert!(mesh.add_face(t, None).is_some());
        }
        mesh.end_face();
        assert!(mesh.check_topology().is_ok());

        assert_eq!(mesh.convex_partition(&points), 6);
        assert!(mesh.check_topology().is_ok());
        assert_eq!(mesh.face_count(), 6);
        for face in mesh.faces() {
            assert_eq!(mesh.face_len(face), 4);
        }
        assert!(is_convex(&mesh, &points));
    }

    #[test]
    fn concave_polygon_partition() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(4.0, 0.0, 0.0),
            Point::new(4.0, 2.0, 0.0),
            Point::new(2.0, 2.0, 0.0),
            Point::new(2.0, 4.0, 0.0),
            Point::new(0.0, 4.0, 0.0),
        ];
        let mut mesh = Polyhedron::new();
        assert!(mesh.add_face(&[0, 1, 2, 3, 4, 5], None).is_some());
        mesh.end_face();

        let _ = mesh.convex_partition(&points);
        assert!(mesh.check_topology().is_ok());
        assert!(is_convex(&mesh, &points));
        assert!(mesh.face_count() >= 2 && mesh.face_count() <= 3);

        let area: Real = mesh
            .faces()
            .into_iter()
            .map(|f| mesh.face_normal(f, &points).z / 2.0)
            .sum();
        assert_relative_eq!(area, 12.0, epsilon = 1.0e-12);
    }

    #[test]
    fn merge_rejects_same_face() {
        let mut mesh = Polyhedron::new();
        assert!(mesh.add_face(&[0, 1, 2], None).is_some());
        mesh.end_face();
        let boundary = mesh.find_edge(1, 0).unwrap();
        assert!(!mesh.merge_faces(boundary));
        assert_eq!(mesh.face_count(), 1);
    }
}
