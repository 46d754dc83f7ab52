use super::{EdgeHandle, Polyhedron};
use crate::math::{Point, Point2, Real, Vector};
use crate::utils::hashmap::HashSet;
use crate::utils::{predicates, WeightedValue};
use std::collections::{BinaryHeap, VecDeque};

/// Builds an orthonormal basis `(u, v)` of the plane orthogonal to the unit vector `n`,
/// such that `u × v = n`.
pub(crate) fn plane_basis(n: &Vector<Real>) -> (Vector<Real>, Vector<Real>) {
    let seed = if n.x.abs() > 0.5 {
        Vector::y()
    } else {
        Vector::x()
    };
    let u = seed.cross(n).normalize();
    let v = n.cross(&u);
    (u, v)
}

impl Polyhedron {
    /// Signed distance-like measure of `q` to the left of the directed line `a → b`,
    /// as seen from the side `normal` points to.
    fn side(normal: &Vector<Real>, a: &Point<Real>, b: &Point<Real>, q: &Point<Real>) -> Real {
        normal.dot(&(b - a).cross(&(q - a)))
    }

    /// Finds the best ear of the polygon containing `face`.
    ///
    /// Returns the half-edge leaving the ear tip. Convex corners are tried from the
    /// one closest to a right angle; an ear is accepted if its closing diagonal does
    /// not exist yet and no other vertex of the polygon lies inside it.
    fn find_ear(
        &self,
        face: EdgeHandle,
        normal: &Vector<Real>,
        points: &[Point<Real>],
    ) -> Option<EdgeHandle> {
        let mut heap = BinaryHeap::new();
        let loop_edges: Vec<EdgeHandle> = self.face_loop(face).collect();
        let vertices: Vec<u32> = loop_edges.iter().map(|h| self.edge(*h).origin).collect();

        for handle in &loop_edges {
            let u = self.edge(self.edge(*handle).prev).origin;
            let v = self.edge(*handle).origin;
            let w = self.destination(*handle);
            let d0 = points[v as usize] - points[u as usize];
            let d1 = points[w as usize] - points[v as usize];
            let scale = d0.norm() * d1.norm();

            if scale == 0.0 {
                continue;
            }

            let sine = normal.dot(&d0.cross(&d1)) / scale;

            if sine > 0.0 {
                heap.push(WeightedValue::new(*handle, sine));
            }
        }

        while let Some(candidate) = heap.pop() {
            let handle = candidate.value;
            let u = self.edge(self.edge(handle).prev).origin;
            let v = self.edge(handle).origin;
            let w = self.destination(handle);

            if u == w || self.find_edge(w, u).is_some() || self.find_edge(u, w).is_some() {
                continue;
            }

            let (pu, pv, pw) = (
                &points[u as usize],
                &points[v as usize],
                &points[w as usize],
            );
            let tolerance = -Real::EPSILON * (pw - pu).norm_squared();

            let blocked = vertices.iter().any(|q| {
                if *q == u || *q == v || *q == w {
                    return false;
                }

                let pq = &points[*q as usize];
                Self::side(normal, pu, pv, pq) >= tolerance
                    && Self::side(normal, pv, pw, pq) >= tolerance
                    && Self::side(normal, pw, pu, pq) >= tolerance
            });

            if !blocked {
                return Some(handle);
            }
        }

        None
    }

    /// Triangulates the face containing `face` by ear clipping.
    ///
    /// Each clipped ear becomes a new face; the remaining polygon keeps the original
    /// face id. Returns the diagonals created, given as the half-edges facing the
    /// remaining polygon. Faces with a vanishing normal are left untouched, and the
    /// clipping stops early if no valid ear remains.
    pub fn triangulate_face(&mut self, face: EdgeHandle, points: &[Point<Real>]) -> Vec<EdgeHandle> {
        let mut diagonals = Vec::new();
        let Some(normal) = self.face_normal(face, points).try_normalize(1.0e-12) else {
            return diagonals;
        };

        let mut current = face;

        while self.face_len(current) > 3 {
            let Some(ear) = self.find_ear(current, &normal, points) else {
                log::warn!(
                    "No valid ear found, {} vertices left untriangulated.",
                    self.face_len(current)
                );
                break;
            };

            let prev = self.edge(ear).prev;
            let next = self.edge(ear).next;
            let prev_prev = self.edge(prev).prev;
            let u = self.edge(prev).origin;
            let w = self.edge(next).origin;
            let old_face = self.edge(ear).face;
            let (data_u, data_w) = (self.edge(prev).user_data, self.edge(next).user_data);

            let ear_face = self.next_face_id();
            let closing = self.insert_edge(w, u, ear_face, data_w);
            let diagonal = self.insert_edge(u, w, old_face, data_u);
            self.link_twins(closing, diagonal);

            self.link(ear, closing);
            self.link(closing, prev);
            self.link(prev_prev, diagonal);
            self.link(diagonal, next);
            self.edge_mut(prev).face = ear_face;
            self.edge_mut(ear).face = ear_face;

            diagonals.push(diagonal);
            current = diagonal;
        }

        diagonals
    }

    /// Flips the given diagonals until the triangles around them are locally Delaunay.
    ///
    /// The in-circle tests are done in the plane orthogonal to `normal`. Only the edges
    /// of `diagonals` are ever flipped; the number of flips is bounded by the square of
    /// their count.
    pub fn refine_triangulation(
        &mut self,
        points: &[Point<Real>],
        normal: &Vector<Real>,
        diagonals: &[EdgeHandle],
    ) {
        let Some(normal) = normal.try_normalize(1.0e-12) else {
            return;
        };
        let (u_axis, v_axis) = plane_basis(&normal);
        let project = |p: &Point<Real>| Point2::new(p.coords.dot(&u_axis), p.coords.dot(&v_axis));

        let mut flippable = HashSet::default();
        for diagonal in diagonals {
            let _ = flippable.insert(*diagonal);
            if let Some(twin) = self.get_edge(*diagonal).and_then(|e| e.twin) {
                let _ = flippable.insert(twin);
            }
        }

        let mut queue: VecDeque<EdgeHandle> = diagonals.iter().copied().collect();
        let mut budget = diagonals.len() * diagonals.len() + diagonals.len();

        while let Some(handle) = queue.pop_front() {
            if budget == 0 {
                break;
            }

            let Some(edge) = self.get_edge(handle).copied() else {
                continue;
            };
            let Some(twin) = edge.twin else {
                continue;
            };

            if self.face_len(handle) != 3 || self.face_len(twin) != 3 {
                continue;
            }

            let a = project(&points[edge.origin as usize]);
            let b = project(&points[self.edge(twin).origin as usize]);
            let c = project(&points[self.edge(edge.prev).origin as usize]);
            let d = project(&points[self.edge(self.edge(twin).prev).origin as usize]);

            if predicates::incircle(&a, &b, &c, &d) > 0.0 && self.flip_edge(handle) {
                budget -= 1;

                for neighbor in [
                    self.edge(handle).next,
                    self.edge(handle).prev,
                    self.edge(twin).next,
                    self.edge(twin).prev,
                ] {
                    if flippable.contains(&neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Triangulates every face with more than three vertices.
    ///
    /// Each face is ear-clipped, then its diagonals are flipped towards a
    /// Delaunay triangulation.
    pub fn triangulate(&mut self, points: &[Point<Real>]) {
        for face in self.faces() {
            if self.face_len(face) <= 3 {
                continue;
            }

            let normal = self.face_normal(face, points);
            let diagonals = self.triangulate_face(face, points);
            self.refine_triangulation(points, &normal, &diagonals);
        }
    }
}
