use super::hull_face::{HullFace, NO_TWIN};
use super::initial_mesh::initial_tetrahedron;
use super::point_tree::PointTree;
use super::ConvexHullError;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::utils::hashmap::HashMap;
use crate::utils::remove_unused_points;
use std::collections::VecDeque;

/// A closed triangulated convex polyhedron.
///
/// Every face knows its three neighbors, so the hull can be walked from face to face,
/// which is what the best-first [ray-cast](ConvexHull::ray_cast) relies on.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConvexHull {
    pub(super) vertices: Vec<Point<Real>>,
    pub(super) faces: Vec<HullFace>,
    pub(super) diagonal: Real,
    pub(super) aabb: Aabb,
}

impl Default for ConvexHull {
    fn default() -> Self {
        ConvexHull {
            vertices: Vec::new(),
            faces: Vec::new(),
            diagonal: 0.0,
            aabb: Aabb::new_invalid(),
        }
    }
}

impl ConvexHull {
    /// Computes the convex hull of a set of points.
    ///
    /// A point is only added to the hull if it lies at a distance larger than
    /// `distance_tolerance` times the diagonal of the point cloud from the current hull.
    /// At most `max_vertices` vertices are added if it is set; the faces are refined in
    /// first-in first-out order so a truncated hull stays evenly refined.
    ///
    /// Returns an empty hull (with a vertex count of zero) if less than four distinct
    /// points are given or if they are coplanar.
    pub fn new(
        points: &[Point<Real>],
        distance_tolerance: Real,
        max_vertices: Option<usize>,
    ) -> Self {
        Self::try_new(points, distance_tolerance, max_vertices).unwrap_or_default()
    }

    /// Computes the convex hull of a set of points, reporting degenerate inputs as errors.
    ///
    /// See [`ConvexHull::new`] for the meaning of the arguments.
    pub fn try_new(
        points: &[Point<Real>],
        distance_tolerance: Real,
        max_vertices: Option<usize>,
    ) -> Result<Self, ConvexHullError> {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| {
            a.x.total_cmp(&b.x)
                .then(a.y.total_cmp(&b.y))
                .then(a.z.total_cmp(&b.z))
        });
        sorted.dedup();

        if sorted.len() < 4 {
            return Err(ConvexHullError::IncompleteInput);
        }

        let mut builder = HullBuilder::new(&sorted)?;
        builder.grow(distance_tolerance, max_vertices.unwrap_or(usize::MAX));
        Ok(builder.finish())
    }

    /// The vertices of this hull.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The faces of this hull.
    #[inline]
    pub fn faces(&self) -> &[HullFace] {
        &self.faces
    }

    /// The number of vertices of this hull.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The number of faces of this hull.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Is this hull empty because its input was degenerate?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The diagonal length of the bounding box of the input points.
    #[inline]
    pub fn diagonal(&self) -> Real {
        self.diagonal
    }

    /// The slightly enlarged bounding box of the input points.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Computes the volume and the surface area of this hull.
    pub fn volume_and_surface_area(&self) -> (Real, Real) {
        let mut volume = 0.0;
        let mut area = 0.0;

        for face in &self.faces {
            let [p0, p1, p2] = face.vertices(&self.vertices);
            volume += p0.coords.cross(&p1.coords).dot(&p2.coords);
            area += face.normal(&self.vertices).norm();
        }

        (volume / 6.0, area / 2.0)
    }

    /// The vertex buffer and index buffer of this hull.
    pub fn to_trimesh(&self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let indices = self.faces.iter().map(|f| f.indices).collect();
        (self.vertices.clone(), indices)
    }
}

/// The state of an incremental hull computation.
struct HullBuilder<'a> {
    points: &'a [Point<Real>],
    tree: PointTree,
    vertices: Vec<Point<Real>>,
    faces: Vec<HullFace>,
    boundary: VecDeque<usize>,
    diagonal: Real,
    /// Number of points consumed without becoming hull vertices.
    interior: usize,
}

impl<'a> HullBuilder<'a> {
    fn new(points: &'a [Point<Real>]) -> Result<Self, ConvexHullError> {
        let mut tree = PointTree::new(points);
        let diagonal = tree.aabb().diagonal();
        let tetrahedron =
            initial_tetrahedron(points, &mut tree).ok_or(ConvexHullError::Degenerate)?;

        let mut builder = HullBuilder {
            points,
            tree,
            vertices: tetrahedron.iter().map(|i| points[*i as usize]).collect(),
            faces: Vec::new(),
            boundary: VecDeque::new(),
            diagonal,
            interior: 0,
        };

        let f0 = builder.add_face(0, 1, 2);
        let f1 = builder.add_face(0, 2, 3);
        let f2 = builder.add_face(2, 1, 3);
        let f3 = builder.add_face(1, 0, 3);
        builder.faces[f0].twins = [f3, f2, f1];
        builder.faces[f1].twins = [f0, f2, f3];
        builder.faces[f2].twins = [f0, f3, f1];
        builder.faces[f3].twins = [f0, f1, f2];

        // Points strictly inside the tetrahedron can never be hull vertices.
        let planes: Vec<_> = builder
            .faces
            .iter()
            .map(|f| (builder.vertices[f.indices[0] as usize], f.normal(&builder.vertices)))
            .collect();
        let faces = &builder.faces;
        let vertices = &builder.vertices;
        let interior = builder.tree.consume_interior(points, &planes, |p| {
            faces.iter().all(|f| f.orientation(vertices, p) < 0.0)
        });
        builder.interior = interior;

        Ok(builder)
    }

    fn add_face(&mut self, i0: u32, i1: u32, i2: u32) -> usize {
        let id = self.faces.len();
        self.faces.push(HullFace::new(i0, i1, i2));
        self.boundary.push_back(id);
        id
    }

    fn grow(&mut self, distance_tolerance: Real, max_vertices: usize) {
        let tolerance = distance_tolerance.abs() * self.diagonal;
        let mut remaining = self.points.len() - 4 - self.interior;
        let mut budget = max_vertices.saturating_sub(4);

        while remaining > 0 && budget > 0 {
            let Some(face_id) = self.boundary.pop_front() else {
                break;
            };
            let face = self.faces[face_id];

            if !face.valid {
                continue;
            }

            let Some(dir) = face.normal(&self.vertices).try_normalize(0.0) else {
                continue;
            };
            let Some(candidate) = self.tree.support_vertex(self.points, &dir) else {
                break;
            };
            let point = self.points[candidate as usize];
            let dist = dir.dot(&(point - self.vertices[face.indices[0] as usize]));

            if dist >= tolerance && face.orientation(&self.vertices, &point) > 0.0 {
                self.tree.consume(candidate);
                self.add_vertex(face_id, point);
                remaining -= 1;
                budget -= 1;
            }
        }

        log::trace!(
            "Convex hull of {} points: {} vertices, {} live faces.",
            self.points.len(),
            self.vertices.len(),
            self.faces.iter().filter(|f| f.valid).count()
        );
    }

    /// Replaces the faces visible from `point` by a cone of faces joining it to the horizon.
    fn add_vertex(&mut self, seed: usize, point: Point<Real>) {
        let new_id = self.vertices.len() as u32;
        self.vertices.push(point);

        let mut removed = Vec::new();
        let mut stack = vec![seed];

        while let Some(id) = stack.pop() {
            let face = self.faces[id];
            if face.valid && face.orientation(&self.vertices, &point) > 0.0 {
                self.faces[id].valid = false;
                removed.push(id);
                stack.extend_from_slice(&face.twins);
            }
        }

        let mut cone = Vec::new();

        for id in removed {
            let face = self.faces[id];

            for j in 0..3 {
                let twin = face.twins[j];

                if self.faces[twin].valid {
                    let (a, b) = face.edge(j);
                    let new_face = self.add_face(new_id, a, b);
                    self.faces[new_face].twins[1] = twin;

                    if let Some(slot) = self.faces[twin].twin_slot(id) {
                        self.faces[twin].twins[slot] = new_face;
                    }

                    cone.push(new_face);
                }
            }
        }

        // Consecutive faces of the cone share the edge going from the apex to a horizon vertex.
        let by_first_horizon_vertex: HashMap<u32, usize> = cone
            .iter()
            .map(|id| (self.faces[*id].indices[1], *id))
            .collect();

        for id in cone {
            let last = self.faces[id].indices[2];
            if let Some(next) = by_first_horizon_vertex.get(&last) {
                self.faces[id].twins[2] = *next;
                self.faces[*next].twins[0] = id;
            }
        }
    }

    fn finish(self) -> ConvexHull {
        let mut new_ids = vec![NO_TWIN; self.faces.len()];
        let mut faces: Vec<HullFace> = Vec::with_capacity(self.faces.len());

        for (id, face) in self.faces.iter().enumerate() {
            if face.valid {
                new_ids[id] = faces.len();
                faces.push(*face);
            }
        }

        for face in &mut faces {
            for twin in &mut face.twins {
                *twin = new_ids[*twin];
            }
        }

        let mut vertices = self.vertices;
        let mut indices: Vec<[u32; 3]> = faces.iter().map(|f| f.indices).collect();
        let _ = remove_unused_points(&mut vertices, &mut indices);

        for (face, idx) in faces.iter_mut().zip(indices) {
            face.indices = idx;
        }

        ConvexHull {
            vertices,
            faces,
            diagonal: self.diagonal,
            aabb: *self.tree.aabb(),
        }
    }
}
