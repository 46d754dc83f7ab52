use super::TopologyError;
use crate::math::{Point, Real, Vector};
use crate::utils::hashmap::{HashMap, HashSet};
use ena::unify::{InPlaceUnificationTable, UnifyKey};
use slab::Slab;
use smallvec::SmallVec;
use std::iter;

/// The handle of a half-edge stored in a [`Polyhedron`].
///
/// Handles of deleted half-edges are recycled by later insertions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct EdgeHandle(pub(crate) u32);

impl EdgeHandle {
    /// The index of this handle in the half-edge arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of the face a half-edge is incident to.
///
/// Interior faces have strictly positive ids. Half-edges lying on a hole or on the
/// outer boundary of an open mesh have a negative id.
pub type FaceId = i32;

/// The face id of boundary half-edges.
pub const BOUNDARY_FACE: FaceId = -1;

/// A directed edge of a [`Polyhedron`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HalfEdge {
    /// Index of the vertex this half-edge starts from.
    pub origin: u32,
    /// The face on the left of this half-edge.
    pub face: FaceId,
    /// User payload attached to the corner of `face` at `origin`.
    pub user_data: u64,
    /// The next half-edge around `face`.
    pub next: EdgeHandle,
    /// The previous half-edge around `face`.
    pub prev: EdgeHandle,
    /// The half-edge joining the same vertices in the opposite direction.
    ///
    /// Only `None` for faces added since the last call to [`Polyhedron::end_face`].
    pub twin: Option<EdgeHandle>,
}

/// A polygonal mesh stored as half-edges.
///
/// Half-edges live in an arena and are addressed by [`EdgeHandle`]s; every
/// directed vertex pair maps to at most one half-edge. A face is the loop of
/// half-edges sharing a face id.
///
/// Faces are inserted with [`Polyhedron::add_face`]. Once every face is inserted,
/// [`Polyhedron::end_face`] pairs the twins and closes the mesh boundaries with
/// half-edges of face id [`BOUNDARY_FACE`].
///
/// # Example
///
/// ```
/// use hacd3d::polyhedron::Polyhedron;
///
/// let mut mesh = Polyhedron::new();
/// assert!(mesh.add_face(&[0, 1, 2], None).is_some());
/// assert!(mesh.add_face(&[0, 2, 3], None).is_some());
/// // The same directed edges cannot be used twice.
/// assert!(mesh.add_face(&[0, 1, 2], None).is_none());
/// mesh.end_face();
///
/// assert_eq!(mesh.face_count(), 2);
/// assert!(mesh.check_topology().is_ok());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Polyhedron {
    edges: Slab<HalfEdge>,
    edge_map: HashMap<(u32, u32), EdgeHandle>,
    face_sequence: FaceId,
}

impl Polyhedron {
    /// Creates an empty polyhedron.
    pub fn new() -> Self {
        Self::default()
    }

    /// The half-edge with the given handle.
    ///
    /// Panics if the handle does not refer to a live half-edge.
    #[inline]
    pub fn edge(&self, handle: EdgeHandle) -> &HalfEdge {
        &self.edges[handle.index()]
    }

    #[inline]
    pub(super) fn edge_mut(&mut self, handle: EdgeHandle) -> &mut HalfEdge {
        &mut self.edges[handle.index()]
    }

    /// The half-edge with the given handle, if it is alive.
    #[inline]
    pub fn get_edge(&self, handle: EdgeHandle) -> Option<&HalfEdge> {
        self.edges.get(handle.index())
    }

    /// The number of half-edges, boundary half-edges included.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates through all the half-edges, in increasing handle order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeHandle, &HalfEdge)> {
        self.edges.iter().map(|(i, e)| (EdgeHandle(i as u32), e))
    }

    /// The half-edge going from `v0` to `v1`, if any.
    #[inline]
    pub fn find_edge(&self, v0: u32, v1: u32) -> Option<EdgeHandle> {
        self.edge_map.get(&(v0, v1)).copied()
    }

    /// The vertex a half-edge points to.
    #[inline]
    pub fn destination(&self, handle: EdgeHandle) -> u32 {
        self.edge(self.edge(handle).next).origin
    }

    /// The twin of a half-edge, once resolved by [`Polyhedron::end_face`].
    #[inline]
    pub fn twin(&self, handle: EdgeHandle) -> Option<EdgeHandle> {
        self.edge(handle).twin
    }

    pub(super) fn next_face_id(&mut self) -> FaceId {
        self.face_sequence += 1;
        self.face_sequence
    }

    pub(super) fn insert_edge(&mut self, origin: u32, dest: u32, face: FaceId, user_data: u64) -> EdgeHandle {
        let entry = self.edges.vacant_entry();
        let handle = EdgeHandle(entry.key() as u32);
        let _ = entry.insert(HalfEdge {
            origin,
            face,
            user_data,
            next: handle,
            prev: handle,
            twin: None,
        });
        let _ = self.edge_map.insert((origin, dest), handle);
        handle
    }

    #[inline]
    pub(super) fn link(&mut self, from: EdgeHandle, to: EdgeHandle) {
        self.edge_mut(from).next = to;
        self.edge_mut(to).prev = from;
    }

    #[inline]
    pub(super) fn link_twins(&mut self, a: EdgeHandle, b: EdgeHandle) {
        self.edge_mut(a).twin = Some(b);
        self.edge_mut(b).twin = Some(a);
    }

    /// Adds a face given by its vertex indices, in counter-clockwise order.
    ///
    /// The optional `user_data` holds one payload per vertex. Returns the half-edge
    /// leaving the first vertex, or `None` if the face is rejected: see
    /// [`Polyhedron::try_add_face`] for the rejection causes.
    pub fn add_face(&mut self, indices: &[u32], user_data: Option<&[u64]>) -> Option<EdgeHandle> {
        self.try_add_face(indices, user_data).ok()
    }

    /// Adds a face given by its vertex indices, in counter-clockwise order.
    ///
    /// Fails without modifying `self` if the face has less than three vertices, if
    /// two consecutive vertices are identical, if it goes through the same vertex
    /// pair twice, or if one of its directed edges already belongs to another face.
    pub fn try_add_face(
        &mut self,
        indices: &[u32],
        user_data: Option<&[u64]>,
    ) -> Result<EdgeHandle, TopologyError> {
        let n = indices.len();

        if n < 3 {
            return Err(TopologyError::DegenerateFace(n));
        }

        if let Some(data) = user_data {
            if data.len() != n {
                return Err(TopologyError::UserDataLength {
                    expected: n,
                    found: data.len(),
                });
            }
        }

        let mut pairs = HashSet::default();

        for i in 0..n {
            let i0 = indices[i];
            let i1 = indices[(i + 1) % n];

            if i0 == i1 {
                return Err(TopologyError::RepeatedVertex(i0));
            }

            if !pairs.insert((i0, i1)) || pairs.contains(&(i1, i0)) {
                return Err(TopologyError::SelfIntersectingFace(i0, i1));
            }

            if self.find_edge(i0, i1).is_some() {
                return Err(TopologyError::DuplicateEdge(i0, i1));
            }
        }

        let face = self.next_face_id();
        let handles: SmallVec<[EdgeHandle; 8]> = (0..n)
            .map(|i| {
                let data = user_data.map(|d| d[i]).unwrap_or(0);
                self.insert_edge(indices[i], indices[(i + 1) % n], face, data)
            })
            .collect();

        for i in 0..n {
            self.link(handles[i], handles[(i + 1) % n]);

            if let Some(twin) = self.find_edge(indices[(i + 1) % n], indices[i]) {
                if self.edge(twin).twin.is_none() {
                    self.link_twins(handles[i], twin);
                }
            }
        }

        Ok(handles[0])
    }

    /// Resolves the twins of every half-edge added since the last call.
    ///
    /// Half-edges without a reverse half-edge are paired with new boundary half-edges
    /// (face id [`BOUNDARY_FACE`]) which are linked into loops along each mesh boundary.
    pub fn end_face(&mut self) {
        let unpaired: Vec<EdgeHandle> = self
            .edges()
            .filter(|(_, e)| e.twin.is_none())
            .map(|(h, _)| h)
            .collect();

        let mut boundary = Vec::new();

        for handle in unpaired {
            if self.edge(handle).twin.is_some() {
                continue;
            }

            let origin = self.edge(handle).origin;
            let dest = self.destination(handle);

            if let Some(twin) = self.find_edge(dest, origin) {
                if self.edge(twin).twin.is_none() {
                    self.link_twins(handle, twin);
                    continue;
                }
            }

            let user_data = self.edge(self.edge(handle).next).user_data;
            let border = self.insert_edge(dest, origin, BOUNDARY_FACE, user_data);
            self.link_twins(handle, border);
            boundary.push((border, handle));
        }

        // The boundary half-edge ending at `v` continues with the first boundary
        // half-edge found when turning around `v`.
        let max_turns = self.edges.len();
        for (border, inner) in boundary {
            let mut candidate = inner;

            for _ in 0..max_turns {
                let Some(rotated) = self.twin(self.edge(candidate).prev) else {
                    break;
                };
                if self.edge(rotated).face < 0 {
                    self.link(border, rotated);
                    break;
                }
                candidate = rotated;
            }
        }
    }

    /// Iterates through the half-edges of the loop containing `start`.
    pub fn face_loop(&self, start: EdgeHandle) -> impl Iterator<Item = EdgeHandle> + '_ {
        let mut curr = Some(start);
        let mut budget = self.edges.len();

        iter::from_fn(move || {
            let handle = curr?;
            budget = budget.checked_sub(1)?;
            let next = self.edge(handle).next;
            curr = (next != start).then_some(next);
            Some(handle)
        })
    }

    /// The vertex indices of the loop containing `start`, starting with its origin.
    pub fn face_vertices(&self, start: EdgeHandle) -> SmallVec<[u32; 8]> {
        self.face_loop(start).map(|h| self.edge(h).origin).collect()
    }

    /// The number of half-edges of the loop containing `start`.
    pub fn face_len(&self, start: EdgeHandle) -> usize {
        self.face_loop(start).count()
    }

    /// One half-edge of each interior face, in increasing handle order.
    pub fn faces(&self) -> Vec<EdgeHandle> {
        let mut seen = HashSet::default();
        self.edges()
            .filter(|(_, e)| e.face > 0 && seen.insert(e.face))
            .map(|(h, _)| h)
            .collect()
    }

    /// The number of interior faces.
    pub fn face_count(&self) -> usize {
        self.faces().len()
    }

    /// The area-weighted normal of the face containing `start`.
    ///
    /// This is the sum of the cross products of the triangle fan rooted at the first
    /// vertex of the face: its norm is twice the area of a planar face.
    pub fn face_normal(&self, start: EdgeHandle, points: &[Point<Real>]) -> Vector<Real> {
        let vertices = self.face_vertices(start);
        let p0 = points[vertices[0] as usize];
        let mut normal = Vector::zeros();

        for w in vertices[1..].windows(2) {
            let e1 = points[w[0] as usize] - p0;
            let e2 = points[w[1] as usize] - p0;
            normal += e1.cross(&e2);
        }

        normal
    }

    /// Sets the user payload of every half-edge to the index of its origin vertex.
    pub fn clear_user_data(&mut self) {
        for (_, edge) in self.edges.iter_mut() {
            edge.user_data = edge.origin as u64;
        }
    }

    /// Deletes a face.
    ///
    /// The half-edges of the face become boundary half-edges. Those whose twin is a
    /// boundary half-edge too are removed along with their twin.
    pub fn delete_face(&mut self, start: EdgeHandle) {
        if self.get_edge(start).map(|e| e.face <= 0).unwrap_or(true) {
            return;
        }

        let loop_edges: SmallVec<[EdgeHandle; 8]> = self.face_loop(start).collect();

        for handle in &loop_edges {
            self.edge_mut(*handle).face = BOUNDARY_FACE;
        }

        for handle in loop_edges {
            if !self.edges.contains(handle.index()) {
                continue;
            }

            if let Some(twin) = self.edge(handle).twin {
                if self.edge(twin).face < 0 {
                    self.delete_edge(handle);
                }
            }
        }
    }

    /// Removes a half-edge and its twin, splicing the loops on both sides together.
    ///
    /// The face ids of the merged loop are left untouched.
    pub fn delete_edge(&mut self, handle: EdgeHandle) {
        let Some(twin) = self.edge(handle).twin else {
            return;
        };

        let e = *self.edge(handle);
        let t = *self.edge(twin);

        if e.next == twin && t.next == handle {
            // Isolated edge.
        } else if e.next == twin {
            self.link(e.prev, t.next);
        } else if t.next == handle {
            self.link(t.prev, e.next);
        } else {
            self.link(e.prev, t.next);
            self.link(t.prev, e.next);
        }

        // Remove the map entries before the `next` links become meaningless.
        let _ = self.edge_map.remove(&(e.origin, t.origin));
        let _ = self.edge_map.remove(&(t.origin, e.origin));
        let _ = self.edges.remove(handle.index());
        let _ = self.edges.remove(twin.index());
    }

    /// Flips the diagonal shared by two triangles.
    ///
    /// The half-edge `a → b` shared by the triangles `(a, b, c)` and `(b, a, d)` becomes
    /// `d → c`, leaving the triangles `(d, c, a)` and `(c, d, b)`. Returns `false` without
    /// modifying `self` if either side is not an interior triangle or if the edge `c → d`
    /// already exists.
    pub fn flip_edge(&mut self, handle: EdgeHandle) -> bool {
        let Some(e) = self.get_edge(handle).copied() else {
            return false;
        };
        let Some(twin) = e.twin else {
            return false;
        };
        let t = *self.edge(twin);

        if e.face <= 0 || t.face <= 0 || self.face_len(handle) != 3 || self.face_len(twin) != 3
        {
            return false;
        }

        let (en, ep) = (e.next, e.prev);
        let (tn, tp) = (t.next, t.prev);
        let c = self.edge(ep).origin;
        let d = self.edge(tp).origin;

        if c == d || self.find_edge(c, d).is_some() || self.find_edge(d, c).is_some() {
            return false;
        }

        let _ = self.edge_map.remove(&(e.origin, t.origin));
        let _ = self.edge_map.remove(&(t.origin, e.origin));

        let (face_a, face_b) = (e.face, t.face);
        let (data_c, data_d) = (self.edge(ep).user_data, self.edge(tp).user_data);

        {
            let edge = self.edge_mut(handle);
            edge.origin = d;
            edge.user_data = data_d;
        }
        {
            let edge = self.edge_mut(twin);
            edge.origin = c;
            edge.user_data = data_c;
        }

        self.link(handle, ep);
        self.link(ep, tn);
        self.link(tn, handle);
        self.link(twin, tp);
        self.link(tp, en);
        self.link(en, twin);

        for h in [handle, ep, tn] {
            self.edge_mut(h).face = face_a;
        }
        for h in [twin, tp, en] {
            self.edge_mut(h).face = face_b;
        }

        let _ = self.edge_map.insert((d, c), handle);
        let _ = self.edge_map.insert((c, d), twin);
        true
    }

    /// Inserts the vertex `new_vertex` in the middle of the edge `handle`.
    ///
    /// The edge `a → b` and its twin are replaced by `a → m`, `m → b` and their twins,
    /// keeping the face ids on both sides. The corners at `m` receive `new_user_data`.
    /// Returns the new half-edge `a → m`, or `None` if the edge has no twin, if `m`
    /// already has an edge with `a` or `b`, or if the edge is dangling.
    pub fn split_edge(
        &mut self,
        new_vertex: u32,
        handle: EdgeHandle,
        new_user_data: u64,
    ) -> Option<EdgeHandle> {
        let e = *self.get_edge(handle)?;
        let twin = e.twin?;
        let t = *self.edge(twin);
        let (a, b) = (e.origin, t.origin);

        if e.next == twin || t.next == handle {
            return None;
        }

        if [a, b].iter().any(|v| {
            self.find_edge(*v, new_vertex).is_some() || self.find_edge(new_vertex, *v).is_some()
        }) {
            return None;
        }

        let (e_prev, e_next) = (e.prev, e.next);
        let (t_prev, t_next) = (t.prev, t.next);

        let _ = self.edge_map.remove(&(a, b));
        let _ = self.edge_map.remove(&(b, a));
        let _ = self.edges.remove(handle.index());
        let _ = self.edges.remove(twin.index());

        let edge0 = self.insert_edge(a, new_vertex, e.face, e.user_data);
        let edge1 = self.insert_edge(new_vertex, b, e.face, new_user_data);
        let twin0 = self.insert_edge(new_vertex, a, t.face, new_user_data);
        let twin1 = self.insert_edge(b, new_vertex, t.face, t.user_data);

        self.link_twins(edge0, twin0);
        self.link_twins(edge1, twin1);

        self.link(e_prev, edge0);
        self.link(edge0, edge1);
        self.link(edge1, e_next);
        self.link(t_prev, twin1);
        self.link(twin1, twin0);
        self.link(twin0, t_next);

        Some(edge0)
    }

    /// Deletes every face whose normal has a norm (twice its area) below `tolerance`.
    ///
    /// Returns the number of deleted faces.
    pub fn delete_degenerate_faces(&mut self, points: &[Point<Real>], tolerance: Real) -> usize {
        let mut deleted = 0;

        for face in self.faces() {
            if self.face_normal(face, points).norm_squared() < tolerance * tolerance {
                self.delete_face(face);
                deleted += 1;
            }
        }

        if deleted != 0 {
            log::debug!("Deleted {} degenerate faces.", deleted);
        }

        deleted
    }

    /// Groups the faces into surfaces connected through shared edges.
    ///
    /// Each surface is given as one half-edge per face. Surfaces are ordered by their
    /// first face in [`Polyhedron::faces`] order.
    pub fn connected_surfaces(&self) -> Vec<Vec<EdgeHandle>> {
        #[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
        struct FaceKey(u32);

        impl UnifyKey for FaceKey {
            type Value = ();
            fn index(&self) -> u32 {
                self.0
            }
            fn from_index(u: u32) -> FaceKey {
                FaceKey(u)
            }
            fn tag() -> &'static str {
                "FaceKey"
            }
        }

        let faces = self.faces();
        let mut ufind: InPlaceUnificationTable<FaceKey> = InPlaceUnificationTable::new();
        let mut keys = HashMap::default();

        for face in &faces {
            let key = ufind.new_key(());
            let _ = keys.insert(self.edge(*face).face, key);
        }

        for (_, edge) in self.edges() {
            let Some(twin) = edge.twin else {
                continue;
            };
            let twin_face = self.edge(twin).face;

            if edge.face > 0 && twin_face > 0 {
                if let (Some(k1), Some(k2)) = (keys.get(&edge.face), keys.get(&twin_face)) {
                    ufind.union(*k1, *k2);
                }
            }
        }

        let mut surfaces: Vec<Vec<EdgeHandle>> = Vec::new();
        let mut surface_ids = HashMap::default();

        for face in faces {
            let Some(key) = keys.get(&self.edge(face).face) else {
                continue;
            };
            let root = ufind.find(*key);
            let id = *surface_ids.entry(root).or_insert_with(|| {
                surfaces.push(Vec::new());
                surfaces.len() - 1
            });
            surfaces[id].push(face);
        }

        surfaces
    }

    /// The triangle fans of every interior face.
    pub fn triangulated_faces(&self) -> Vec<[u32; 3]> {
        let mut result = Vec::new();

        for face in self.faces() {
            let vertices = self.face_vertices(face);
            for w in vertices[1..].windows(2) {
                result.push([vertices[0], w[0], w[1]]);
            }
        }

        result
    }

    /// Checks the consistency of every link of this polyhedron.
    ///
    /// Every half-edge must have a twin pointing back to it and joining the same
    /// vertices, its `next`/`prev` links must be reciprocal within a loop of constant
    /// face id, and it must be registered under its vertex pair.
    pub fn check_topology(&self) -> Result<(), TopologyError> {
        for (handle, edge) in self.edges() {
            let next = self
                .get_edge(edge.next)
                .ok_or(TopologyError::BrokenLoop(handle))?;
            let prev = self
                .get_edge(edge.prev)
                .ok_or(TopologyError::BrokenLoop(handle))?;

            if next.prev != handle || prev.next != handle {
                return Err(TopologyError::BrokenLoop(handle));
            }

            if next.face != edge.face || prev.face != edge.face {
                return Err(TopologyError::BrokenLoop(handle));
            }

            let twin_handle = edge.twin.ok_or(TopologyError::MissingTwin(handle))?;
            let twin = self
                .get_edge(twin_handle)
                .ok_or(TopologyError::TwinMismatch(handle))?;

            if twin.twin != Some(handle) || twin.origin != next.origin || twin_handle == handle {
                return Err(TopologyError::TwinMismatch(handle));
            }

            if self.find_edge(edge.origin, next.origin) != Some(handle) {
                return Err(TopologyError::UnknownEdge(handle));
            }
        }

        if self.edge_map.len() != self.edges.len() {
            return Err(TopologyError::UnknownEdge(EdgeHandle(u32::MAX)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quad() -> Polyhedron {
        // 3---2
        // | / |
        // 0---1
        let mut mesh = Polyhedron::new();
        assert!(mesh.add_face(&[0, 1, 2], None).is_some());
        assert!(mesh.add_face(&[0, 2, 3], None).is_some());
        mesh.end_face();
        mesh
    }

    fn quad_points() -> Vec<Point<Real>> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.5, 0.5, 0.0),
        ]
    }

    #[test]
    fn add_face_rejections() {
        let mut mesh = Polyhedron::new();
        assert_eq!(
            mesh.try_add_face(&[0, 1], None),
            Err(TopologyError::DegenerateFace(2))
        );
        assert_eq!(
            mesh.try_add_face(&[0, 1, 1], None),
            Err(TopologyError::RepeatedVertex(1))
        );
        assert_eq!(
            mesh.try_add_face(&[0, 1, 0, 2], None),
            Err(TopologyError::SelfIntersectingFace(1, 0))
        );
        assert_eq!(
            mesh.try_add_face(&[0, 1, 2], Some(&[1, 2])),
            Err(TopologyError::UserDataLength {
                expected: 3,
                found: 2
            })
        );
        assert!(mesh.add_face(&[0, 1, 2], None).is_some());
        let edges_before = mesh.edge_count();
        assert_eq!(
            mesh.try_add_face(&[0, 1, 2], None),
            Err(TopologyError::DuplicateEdge(0, 1))
        );
        assert_eq!(mesh.edge_count(), edges_before);
    }

    #[test]
    fn twins_are_resolved_by_end_face() {
        let mut mesh = Polyhedron::new();
        let first = mesh.add_face(&[0, 1, 2], None).unwrap();
        assert_eq!(mesh.twin(first), None);

        mesh.end_face();
        let twin = mesh.twin(first).unwrap();
        assert_eq!(mesh.twin(twin), Some(first));
        assert_eq!(mesh.edge(twin).face, BOUNDARY_FACE);
    }

    #[test]
    fn boundary_loop_is_closed() {
        let mesh = quad();
        assert!(mesh.check_topology().is_ok());
        // 6 interior half-edges plus 4 boundary ones.
        assert_eq!(mesh.edge_count(), 10);

        let border = mesh.find_edge(1, 0).unwrap();
        assert_eq!(mesh.edge(border).face, BOUNDARY_FACE);
        let vertices = mesh.face_vertices(border);
        assert_eq!(vertices.as_slice(), &[1, 0, 3, 2]);
    }

    #[test]
    fn flip_and_split() {
        let points = quad_points();
        let mut mesh = quad();
        let diagonal = mesh.find_edge(0, 2).unwrap();
        assert!(mesh.flip_edge(diagonal));
        assert!(mesh.check_topology().is_ok());
        assert!(mesh.find_edge(0, 2).is_none());
        assert_eq!(mesh.find_edge(1, 3), Some(diagonal));
        for face in mesh.faces() {
            assert_eq!(mesh.face_len(face), 3);
            assert_relative_eq!(mesh.face_normal(face, &points).z, 1.0);
        }

        // A triangle side is not a diagonal.
        let side = mesh.find_edge(0, 1).unwrap();
        assert!(!mesh.flip_edge(side));

        let split = mesh.split_edge(4, diagonal, 42).unwrap();
        assert!(mesh.check_topology().is_ok());
        assert_eq!(mesh.edge(split).origin, 1);
        assert_eq!(mesh.destination(split), 4);
        assert!(mesh.find_edge(1, 3).is_none());
        assert_eq!(mesh.face_count(), 2);
        for face in mesh.faces() {
            assert_eq!(mesh.face_len(face), 4);
        }
        let corner = mesh.find_edge(4, 1).unwrap();
        assert_eq!(mesh.edge(corner).user_data, 42);
    }

    #[test]
    fn delete_faces_and_degenerates() {
        let mut points = quad_points();
        let mut mesh = quad();
        let face = mesh.find_edge(0, 1).unwrap();
        mesh.delete_face(face);
        assert!(mesh.check_topology().is_ok());
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 6);

        // Collapse vertex 3 onto the diagonal.
        points[3] = Point::new(0.5, 0.5, 0.0);
        assert_eq!(mesh.delete_degenerate_faces(&points, 1.0e-8), 1);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.edge_count(), 0);
    }

    #[test]
    fn connected_surfaces_split_components() {
        let mut mesh = Polyhedron::new();
        assert!(mesh.add_face(&[0, 1, 2], None).is_some());
        assert!(mesh.add_face(&[2, 1, 3], None).is_some());
        assert!(mesh.add_face(&[10, 11, 12], None).is_some());
        mesh.end_face();

        let surfaces = mesh.connected_surfaces();
        assert_eq!(surfaces.len(), 2);
        assert_eq!(surfaces[0].len(), 2);
        assert_eq!(surfaces[1].len(), 1);
    }
}
