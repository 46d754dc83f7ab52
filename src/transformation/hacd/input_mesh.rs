use super::HacdError;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::polyhedron::Polyhedron;
use crate::utils::hashmap::HashMap;
use crate::utils::points_from_strided;
use num::cast::AsPrimitive;

/// Distance under which two vertices are welded by [`HacdMesh::weld_vertices`].
pub const WELD_DISTANCE: Real = 1.0e-3;

/// An indexed triangle mesh to decompose.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HacdMesh {
    points: Vec<Point<Real>>,
    triangles: Vec<[u32; 3]>,
}

/// The affine map applied by [`HacdMesh::normalize`].
///
/// A normalized point `p` comes from the original point `center + p * extents`
/// (component-wise).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Normalization {
    /// The center of the original bounding box.
    pub center: Point<Real>,
    /// The extents of the original bounding box, with zero extents replaced by one.
    pub extents: Vector<Real>,
}

impl Normalization {
    /// Maps a normalized point back to the original frame.
    #[inline]
    pub fn denormalize(&self, point: &Point<Real>) -> Point<Real> {
        self.center + point.coords.component_mul(&self.extents)
    }
}

impl HacdMesh {
    /// Creates a mesh, checking that it is not empty and that every index is valid.
    pub fn new(points: Vec<Point<Real>>, triangles: Vec<[u32; 3]>) -> Result<Self, HacdError> {
        if points.is_empty() || triangles.is_empty() {
            return Err(HacdError::EmptyMesh);
        }

        for (face, triangle) in triangles.iter().enumerate() {
            if let Some(index) = triangle.iter().find(|i| **i as usize >= points.len()) {
                return Err(HacdError::InvalidIndex {
                    face,
                    index: *index,
                });
            }
        }

        Ok(Self { points, triangles })
    }

    /// Creates a mesh from flat coordinate and index buffers.
    ///
    /// Point `i` is read from `vertices[i * stride..i * stride + 3]`. Every three
    /// consecutive `indices` form a triangle; trailing indices are ignored.
    pub fn from_strided<N: AsPrimitive<Real>>(
        vertices: &[N],
        stride: usize,
        indices: &[u32],
    ) -> Result<Self, HacdError> {
        let points = points_from_strided(vertices, stride);
        let triangles = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        Self::new(points, triangles)
    }

    /// The vertices of this mesh.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The triangles of this mesh.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// The bounding box of the vertices of this mesh.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points_ref(&self.points)
    }

    /// Merges every vertex into the last kept vertex closer than `distance`.
    ///
    /// Triangles are reindexed and the ones that became degenerate are removed.
    /// Returns, for each original vertex, its index after welding. Welding twice
    /// with the same distance leaves the mesh unchanged the second time.
    pub fn weld_vertices(&mut self, distance: Real) -> Vec<u32> {
        let cell_size = distance.max(Real::EPSILON);
        let cell = |p: &Point<Real>| {
            let c = p.coords / cell_size;
            [c.x.floor() as i64, c.y.floor() as i64, c.z.floor() as i64]
        };
        let mut grid: HashMap<[i64; 3], Vec<u32>> = HashMap::default();
        let mut kept = Vec::with_capacity(self.points.len());
        let mut remap = Vec::with_capacity(self.points.len());

        for pt in &self.points {
            let [x, y, z] = cell(pt);
            let mut target = None;

            for i in x - 1..=x + 1 {
                for j in y - 1..=y + 1 {
                    for k in z - 1..=z + 1 {
                        let Some(bucket) = grid.get(&[i, j, k]) else {
                            continue;
                        };

                        for id in bucket {
                            let later = target.map(|t| *id > t).unwrap_or(true);
                            if later
                                && na::distance_squared(&kept[*id as usize], pt) < distance * distance
                            {
                                target = Some(*id);
                            }
                        }
                    }
                }
            }

            let id = target.unwrap_or_else(|| {
                let id = kept.len() as u32;
                kept.push(*pt);
                grid.entry([x, y, z]).or_default().push(id);
                id
            });
            remap.push(id);
        }

        let removed = self.points.len() - kept.len();
        self.points = kept;

        for t in &mut self.triangles {
            *t = t.map(|i| remap[i as usize]);
        }

        let triangle_count = self.triangles.len();
        self.triangles
            .retain(|t| t[0] != t[1] && t[1] != t[2] && t[2] != t[0]);

        if removed != 0 {
            log::debug!(
                "Welded {} vertices, {} triangles collapsed.",
                removed,
                triangle_count - self.triangles.len()
            );
        }

        remap
    }

    /// Centers this mesh at the origin and scales each axis to a unit extent.
    ///
    /// Returns the transformation needed to map the result back.
    pub fn normalize(&mut self) -> Normalization {
        let aabb = self.aabb();
        let extents = aabb.extents().map(|e| if e > 0.0 { e } else { 1.0 });
        let center = aabb.center();

        for pt in &mut self.points {
            *pt = Point::from((*pt - center).component_div(&extents));
        }

        Normalization { center, extents }
    }

    /// Builds the half-edge representation of this mesh.
    ///
    /// Triangles rejected by [`Polyhedron::try_add_face`] are skipped with a warning.
    /// Degenerate faces are then removed and coplanar triangles are grouped into
    /// convex polygons. Each corner carries the index of its vertex as user data.
    pub fn to_polyhedron(&self) -> Polyhedron {
        let mut mesh = Polyhedron::new();

        for (face, t) in self.triangles.iter().enumerate() {
            let user_data = t.map(u64::from);
            if let Err(err) = mesh.try_add_face(t, Some(&user_data[..])) {
                log::warn!("Skipping triangle {}: {}", face, err);
            }
        }

        self.finish_polyhedron(mesh)
    }

    /// Builds the half-edge representation of this mesh, failing on the first
    /// triangle that cannot be inserted.
    pub fn try_to_polyhedron(&self) -> Result<Polyhedron, HacdError> {
        let mut mesh = Polyhedron::new();

        for t in &self.triangles {
            let user_data = t.map(u64::from);
            let _ = mesh.try_add_face(t, Some(&user_data[..]))?;
        }

        Ok(self.finish_polyhedron(mesh))
    }

    fn finish_polyhedron(&self, mut mesh: Polyhedron) -> Polyhedron {
        mesh.end_face();

        let diagonal = self.aabb().diagonal();
        let _ = mesh.delete_degenerate_faces(&self.points, 1.0e-8 * diagonal * diagonal);
        let _ = mesh.convex_partition(&self.points);

        log::debug!(
            "Input mesh: {} vertices, {} triangles, {} convex faces.",
            self.points.len(),
            self.triangles.len(),
            mesh.face_count()
        );

        mesh
    }
}

#[cfg(test)]
impl HacdMesh {
    /// A triangulated axis-aligned box with a corner at the origin.
    pub(crate) fn cuboid(extents: Vector<Real>) -> Self {
        let points = (0..8)
            .map(|i| {
                Point::new(
                    (i & 1) as Real * extents.x,
                    ((i >> 1) & 1) as Real * extents.y,
                    ((i >> 2) & 1) as Real * extents.z,
                )
            })
            .collect();
        let quads = [
            [0, 2, 3, 1],
            [4, 5, 7, 6],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [1, 3, 7, 5],
        ];
        let triangles = quads
            .iter()
            .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
            .collect();

        Self { points, triangles }
    }
}

#[cfg(test)]
mod test {
    use super::{HacdMesh, WELD_DISTANCE};
    use crate::math::Point;
    use crate::transformation::hacd::HacdError;

    fn quad() -> HacdMesh {
        HacdMesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(1.0, 1.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn input_validation() {
        assert_eq!(HacdMesh::new(vec![], vec![[0, 1, 2]]), Err(HacdError::EmptyMesh));
        assert_eq!(
            HacdMesh::new(vec![Point::origin(); 3], vec![[0, 1, 2], [0, 3, 1]]),
            Err(HacdError::InvalidIndex { face: 1, index: 3 })
        );

        let data = [0.0f32, 0.0, 0.0, 9.0, 1.0, 0.0, 0.0, 9.0, 0.0, 1.0, 0.0, 9.0];
        let mesh = HacdMesh::from_strided(&data, 4, &[0, 1, 2, 0]).unwrap();
        assert_eq!(mesh.points().len(), 3);
        assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
        assert_eq!(mesh.points()[2], Point::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn welding_is_idempotent() {
        let mut mesh = quad();
        let mut points = mesh.points.clone();
        // Duplicate the diagonal with a slight offset.
        points.push(Point::new(1.0, 1.0, 1.0e-4));
        points.push(Point::new(1.0e-4, 0.0, 0.0));
        mesh.points = points;
        mesh.triangles[1] = [5, 4, 3];

        let remap = mesh.weld_vertices(WELD_DISTANCE);
        assert_eq!(remap, vec![0, 1, 2, 3, 2, 0]);
        assert_eq!(mesh.points().len(), 4);
        assert_eq!(mesh.triangles(), &[[0, 1, 2], [0, 2, 3]]);

        let welded = mesh.clone();
        let remap = mesh.weld_vertices(WELD_DISTANCE);
        assert_eq!(remap, vec![0, 1, 2, 3]);
        assert_eq!(mesh, welded);
    }

    #[test]
    fn welding_prefers_the_last_match() {
        // The third vertex is close to both of the first two, which are kept apart.
        let mut mesh = HacdMesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.5e-3, 0.0, 0.0),
                Point::new(0.75e-3, 0.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 3], [2, 1, 3]],
        )
        .unwrap();

        let remap = mesh.weld_vertices(WELD_DISTANCE);
        assert_eq!(remap, vec![0, 1, 1, 2]);
        assert_eq!(mesh.points().len(), 3);
        assert_eq!(mesh.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn collapsed_triangles_are_removed() {
        let mut mesh = HacdMesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 1.0e-5),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let _ = mesh.weld_vertices(WELD_DISTANCE);
        assert!(mesh.triangles().is_empty());
    }

    #[test]
    fn normalization_round_trip() {
        let mut mesh = HacdMesh::new(
            vec![
                Point::new(1.0, 2.0, 5.0),
                Point::new(5.0, 2.0, 5.0),
                Point::new(1.0, 4.0, 5.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let original = mesh.points().to_vec();
        let normalization = mesh.normalize();

        let aabb = mesh.aabb();
        assert_relative_eq!(aabb.mins, Point::new(-0.5, -0.5, 0.0));
        assert_relative_eq!(aabb.maxs, Point::new(0.5, 0.5, 0.0));

        for (p, q) in mesh.points().iter().zip(original.iter()) {
            assert_relative_eq!(normalization.denormalize(p), *q, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn coplanar_triangles_are_merged() {
        let polyhedron = quad().to_polyhedron();
        assert_eq!(polyhedron.face_count(), 1);

        let face = polyhedron.faces()[0];
        assert_eq!(polyhedron.face_len(face), 4);
        assert!(polyhedron
            .face_loop(face)
            .all(|h| polyhedron.edge(h).user_data == polyhedron.edge(h).origin as u64));
    }

    #[test]
    fn invalid_triangles_are_skipped() {
        let mut mesh = quad();
        mesh.triangles.push([0, 1, 2]);
        mesh.triangles.push([1, 1, 3]);

        assert_eq!(mesh.to_polyhedron().face_count(), 1);
        assert!(matches!(
            mesh.try_to_polyhedron(),
            Err(HacdError::Topology(_))
        ));
    }
}
