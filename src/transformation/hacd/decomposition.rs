use super::cluster_graph::ClusterGraph;
use super::fast::fast_clusters;
use super::input_mesh::{HacdMesh, WELD_DISTANCE};
use super::merge_hulls::merge_hulls;
use super::mesh_face::{extract_faces, MeshFace};
use super::plane_split::split_decomposition;
use super::progress::{report, ProgressCallback};
use super::HacdParameters;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::transformation::convex_hull3::ConvexHull;

/// A convex hull produced by a decomposition.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DecomposedHull {
    /// The vertices of the hull.
    pub vertices: Vec<Point<Real>>,
    /// The counterclockwise triangles of the hull.
    pub indices: Vec<[u32; 3]>,
    /// The volume enclosed by the hull.
    pub volume: Real,
}

impl DecomposedHull {
    /// Creates a hull from a vertex and an index buffer, computing its volume.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Self {
        let mut result = Self {
            vertices,
            indices,
            volume: 0.0,
        };
        result.volume = result.compute_volume();
        result
    }

    /// Converts a convex hull.
    pub fn from_convex_hull(hull: &ConvexHull) -> Self {
        let (vertices, indices) = hull.to_trimesh();
        Self::new(vertices, indices)
    }

    /// The absolute volume enclosed by the triangles of this hull.
    pub fn compute_volume(&self) -> Real {
        let volume: Real = self
            .indices
            .iter()
            .map(|[i0, i1, i2]| {
                let p0 = self.vertices[*i0 as usize].coords;
                let p1 = self.vertices[*i1 as usize].coords;
                let p2 = self.vertices[*i2 as usize].coords;
                p0.dot(&p1.cross(&p2))
            })
            .sum();
        volume.abs() / 6.0
    }

    /// The bounding box of the vertices of this hull.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points_ref(&self.vertices)
    }
}

/// Hierarchical approximate convex decomposition.
///
/// The faces of the mesh are clustered greedily, the cheapest merge first, and the
/// history of the merges is recorded in a merge tree. The tree is then cut into the
/// fewest clusters that are convex enough, and each cluster is replaced by the
/// convex hull of its vertices.
///
/// # Example
///
/// ```
/// use hacd3d::math::Point;
/// use hacd3d::transformation::hacd::{Hacd, HacdMesh, HacdParameters};
///
/// let points = vec![
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
///     Point::new(0.0, 0.0, 1.0),
/// ];
/// let triangles = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
/// let mesh = HacdMesh::new(points, triangles).unwrap();
///
/// let hulls = Hacd::new(HacdParameters::default()).decompose(&mesh);
/// assert_eq!(hulls.len(), 1);
/// assert_eq!(hulls[0].vertices.len(), 4);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Hacd {
    params: HacdParameters,
}

impl Hacd {
    /// Creates a decomposition with the given parameters, clamped to their valid range.
    pub fn new(params: HacdParameters) -> Self {
        Self {
            params: params.clamped(),
        }
    }

    /// The (clamped) parameters of this decomposition.
    pub fn parameters(&self) -> &HacdParameters {
        &self.params
    }

    /// Decomposes `mesh` into convex hulls.
    pub fn decompose(&self, mesh: &HacdMesh) -> Vec<DecomposedHull> {
        self.decompose_with_progress(mesh, &mut |_: &str, _: Real| {})
    }

    /// Decomposes `mesh` into convex hulls, reporting the progress to `progress`.
    pub fn decompose_with_progress(
        &self,
        mesh: &HacdMesh,
        progress: &mut dyn ProgressCallback,
    ) -> Vec<DecomposedHull> {
        let params = &self.params;
        report(progress, "Starting HACD", 0.0);

        let mut mesh = mesh.clone();

        if params.remove_duplicate_vertices {
            report(progress, "Removing duplicate vertices", 0.0);
            let _ = mesh.weld_vertices(WELD_DISTANCE);
        }

        let normalization = if params.normalize_input_mesh {
            report(progress, "Normalizing Input Mesh", 0.0);
            Some(mesh.normalize())
        } else {
            None
        };

        let mut hulls = if params.decomposition_depth > 0 {
            split_decomposition(&mesh, params, progress)
        } else {
            self.cluster_hulls(&mesh, progress)
        };

        if hulls.len() > params.max_merge_hulls || params.small_cluster_threshold > 0.0 {
            hulls = merge_hulls(hulls, params, progress);
        }

        if let Some(normalization) = normalization {
            for hull in &mut hulls {
                for pt in &mut hull.vertices {
                    *pt = normalization.denormalize(pt);
                }
                hull.volume = hull.compute_volume();
            }
        }

        log::debug!("Decomposition complete: {} convex hulls.", hulls.len());
        hulls
    }

    /// The hulls of the clusters of faces of `mesh`, hierarchical or fast.
    fn cluster_hulls(
        &self,
        mesh: &HacdMesh,
        progress: &mut dyn ProgressCallback,
    ) -> Vec<DecomposedHull> {
        let params = &self.params;
        report(progress, "Building Mesh from Vertex Index List", 0.0);
        let polyhedron = mesh.to_polyhedron();

        report(progress, "Begin HACD", 0.0);
        let points = mesh.points();

        if params.use_fast_version {
            let faces = extract_faces(&polyhedron, points);
            fast_clusters(&faces, points, params, progress)
                .iter()
                .filter_map(|cluster| cluster_hull(&faces, cluster, points, params))
                .collect()
        } else {
            report(progress, "Making a copy of the input mesh", 0.0);
            let mut working = polyhedron.clone();
            working.clear_user_data();
            let faces = extract_faces(&working, points);

            report(progress, "Creating Connectivity Graph", 0.0);
            let mut graph = ClusterGraph::new(&faces, points, params);

            report(progress, "Submit Initial Edge Costs", 0.0);
            graph.submit_initial_costs();

            report(progress, "Collapse Clusters", 0.0);
            graph.collapse_all(progress);

            report(progress, "Creating Partition Mesh", 0.0);
            let (tree, root) = graph.into_merge_tree();
            let diagonal = mesh.aabb().diagonal();
            let cut = root
                .map(|root| tree.reduce(root, params.max_hulls, params.concavity * diagonal))
                .unwrap_or_default();
            log::debug!("The merge tree was cut into {} clusters.", cut.len());

            let hulls = cut
                .iter()
                .filter_map(|node| cluster_hull(&faces, tree.node(*node).faces(), points, params))
                .collect();
            report(progress, "Performing HACD", 1.0);
            hulls
        }
    }
}

/// Decomposes `mesh` into at most `max_hulls` convex hulls of at most
/// `max_vertices_per_hull` vertices, with the default values of the other
/// parameters.
pub fn decompose(
    mesh: &HacdMesh,
    concavity: Real,
    max_hulls: usize,
    max_vertices_per_hull: usize,
) -> Vec<DecomposedHull> {
    let params = HacdParameters {
        concavity,
        max_hulls,
        max_vertices_per_hull,
        ..HacdParameters::default()
    };
    Hacd::new(params).decompose(mesh)
}

/// The convex hull of the vertices of a cluster of faces, unless they are coplanar.
pub(crate) fn cluster_hull(
    faces: &[MeshFace],
    cluster: &[usize],
    points: &[Point<Real>],
    params: &HacdParameters,
) -> Option<DecomposedHull> {
    let mut ids: Vec<u32> = cluster
        .iter()
        .flat_map(|f| faces[*f].vertices.iter().copied())
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let cloud: Vec<_> = ids.iter().map(|i| points[*i as usize]).collect();
    let hull = ConvexHull::new(
        &cloud,
        params.hull_distance_tolerance,
        Some(params.max_vertices_per_hull),
    );

    if hull.is_empty() {
        None
    } else {
        Some(DecomposedHull::from_convex_hull(&hull))
    }
}

#[cfg(test)]
mod test {
    use super::{DecomposedHull, Hacd};
    use crate::math::{Point, Real, Vector};
    use crate::transformation::convex_hull3::ConvexHull;
    use crate::transformation::hacd::{HacdMesh, HacdParameters};

    #[test]
    fn hull_volume() {
        let hull = DecomposedHull::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(2.0, 0.0, 0.0),
                Point::new(0.0, 2.0, 0.0),
                Point::new(0.0, 0.0, 2.0),
            ],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]],
        );
        assert_relative_eq!(hull.volume, 8.0 / 6.0, epsilon = 1.0e-12);

        // The orientation does not matter.
        let flipped = DecomposedHull::new(
            hull.vertices.clone(),
            hull.indices.iter().map(|[a, b, c]| [*a, *c, *b]).collect(),
        );
        assert_relative_eq!(flipped.volume, hull.volume, epsilon = 1.0e-12);
    }

    #[test]
    fn negligible_bumps_are_not_hull_vertices() {
        let mut points: Vec<_> = (0..8)
            .map(|i| Point::new((i & 1) as Real, ((i >> 1) & 1) as Real, ((i >> 2) & 1) as Real))
            .collect();
        points.push(Point::new(0.5, 0.5, 1.0 + 1.0e-7));

        let tolerance = HacdParameters::default().hull_distance_tolerance;
        assert_eq!(ConvexHull::new(&points, tolerance, None).vertex_count(), 8);
        assert_eq!(ConvexHull::new(&points, 0.0, None).vertex_count(), 9);
    }

    #[test]
    fn box_is_its_own_hull() {
        let mesh = HacdMesh::cuboid(Vector::new(1.0, 2.0, 3.0));

        for use_fast_version in [false, true] {
            let params = HacdParameters {
                use_fast_version,
                ..HacdParameters::default()
            };
            let hulls = Hacd::new(params).decompose(&mesh);
            assert_eq!(hulls.len(), 1);
            assert_eq!(hulls[0].vertices.len(), 8);
            assert_eq!(hulls[0].indices.len(), 12);
            assert_relative_eq!(hulls[0].volume, 6.0, epsilon = 1.0e-9);
        }
    }

    #[test]
    fn normalized_output_is_mapped_back() {
        let mut mesh = HacdMesh::cuboid(Vector::new(1.0, 2.0, 3.0));
        let shift = Vector::new(10.0, -5.0, 1.0);
        let points: Vec<_> = mesh.points().iter().map(|p| p + shift).collect();
        mesh = HacdMesh::new(points, mesh.triangles().to_vec()).unwrap();

        let params = HacdParameters {
            normalize_input_mesh: true,
            ..HacdParameters::default()
        };
        let hulls = Hacd::new(params).decompose(&mesh);
        assert_eq!(hulls.len(), 1);
        assert_relative_eq!(hulls[0].volume, 6.0, epsilon = 1.0e-9);

        let aabb = hulls[0].aabb();
        assert_relative_eq!(aabb.mins, Point::from(shift), epsilon = 1.0e-9);
        assert_relative_eq!(
            aabb.maxs,
            Point::from(shift + Vector::new(1.0, 2.0, 3.0)),
            epsilon = 1.0e-9
        );
    }

    #[test]
    fn progress_phases() {
        let mesh = HacdMesh::cuboid(Vector::new(1.0, 1.0, 1.0));
        let mut phases = Vec::new();
        let mut progress = |phase: &str, fraction: Real| {
            assert!((0.0..=1.0).contains(&fraction));
            if phases.last().map(|p| p != phase).unwrap_or(true) {
                phases.push(phase.to_string());
            }
        };

        let _ = Hacd::new(HacdParameters::default()).decompose_with_progress(&mesh, &mut progress);
        assert_eq!(
            phases,
            [
                "Starting HACD",
                "Removing duplicate vertices",
                "Building Mesh from Vertex Index List",
                "Begin HACD",
                "Making a copy of the input mesh",
                "Creating Connectivity Graph",
                "Submit Initial Edge Costs",
                "Collapse Clusters",
                "Performing HACD",
                "Creating Partition Mesh",
                "Performing HACD",
            ]
        );
    }
}
