use super::decomposition::DecomposedHull;
use super::input_mesh::HacdMesh;
use super::progress::{report, ProgressCallback};
use super::HacdParameters;
use crate::math::{Point, Real, Vector};
use crate::transformation::convex_hull3::ConvexHull;
use crate::utils;
use arrayvec::ArrayVec;

/// Deepest level of recursive splits.
pub const MAX_DECOMPOSITION_DEPTH: usize = 10;

/// Distance under which a point lies on a split plane.
const PLANE_EPSILON: Real = 1.0e-5;
/// Distance under which the vertices of a piece are merged.
const PIECE_WELD_DISTANCE: Real = 1.0e-5;
/// Largest deviation `1 - |n0.n1|` between the normals of the triangles of a flat piece.
const COPLANAR_NORMAL_EPSILON: Real = 0.01;
/// Largest distance of the vertices of a flat piece to the plane of its first triangle.
const COPLANAR_DISTANCE_EPSILON: Real = 1.0e-3;

type Polygon = ArrayVec<Point<Real>, 4>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Front,
    Back,
    On,
}

/// A plane cutting a piece of mesh in two.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct SplitPlane {
    pub origin: Point<Real>,
    /// Unit normal, pointing towards the front side.
    pub normal: Vector<Real>,
}

impl SplitPlane {
    /// The plane through the center of the oriented box of `points`, orthogonal to its
    /// longest axis.
    pub fn halving(points: &[Point<Real>]) -> Self {
        let obb = utils::obb(points);
        let axis = obb.half_extents.imax();

        SplitPlane {
            origin: obb.center,
            normal: obb.axes.column(axis).into_owned(),
        }
    }

    #[inline]
    fn distance(&self, point: &Point<Real>) -> Real {
        (point - self.origin).dot(&self.normal)
    }

    fn side(&self, distance: Real) -> Side {
        if distance > PLANE_EPSILON {
            Side::Front
        } else if distance < -PLANE_EPSILON {
            Side::Back
        } else {
            Side::On
        }
    }

    /// Cuts a triangle into the polygons in front of and behind this plane.
    ///
    /// Vertices on the plane go to the side of the first vertex that is not; a
    /// triangle lying on the plane goes to the front. Each polygon is either empty or
    /// has three or four vertices, in the same order as the triangle.
    fn split_triangle(&self, triangle: [Point<Real>; 3]) -> (Polygon, Polygon) {
        let distances = triangle.map(|p| self.distance(&p));
        let mut sides = distances.map(|d| self.side(d));
        let whole: Polygon = triangle.into_iter().collect();

        let Some(off_plane) = sides.iter().copied().find(|s| *s != Side::On) else {
            return (whole, Polygon::new());
        };

        for side in &mut sides {
            if *side == Side::On {
                *side = off_plane;
            }
        }

        if sides.iter().all(|s| *s == off_plane) {
            return match off_plane {
                Side::Back => (Polygon::new(), whole),
                _ => (whole, Polygon::new()),
            };
        }

        let mut front = Polygon::new();
        let mut back = Polygon::new();

        for i in 0..3 {
            let j = (i + 1) % 3;
            let (a, b) = (triangle[i], triangle[j]);

            if sides[i] == Side::Front {
                front.push(a);
            } else {
                back.push(a);
            }

            if sides[i] != sides[j] {
                let denom = distances[i] - distances[j];
                let t = if denom != 0.0 {
                    (distances[i] / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let cut = a + (b - a) * t;
                front.push(cut);
                back.push(cut);
            }
        }

        (front, back)
    }

    /// Splits `mesh` into the pieces in front of and behind this plane.
    ///
    /// Cut triangles are re-triangulated and the vertices of each piece are welded.
    pub fn split(&self, mesh: &HacdMesh) -> (Option<HacdMesh>, Option<HacdMesh>) {
        let mut front = PieceBuilder::default();
        let mut back = PieceBuilder::default();

        for t in mesh.triangles() {
            let triangle = t.map(|i| mesh.points()[i as usize]);
            let (f, b) = self.split_triangle(triangle);
            front.add_polygon(&f);
            back.add_polygon(&b);
        }

        (front.build(), back.build())
    }
}

#[derive(Default)]
struct PieceBuilder {
    points: Vec<Point<Real>>,
    triangles: Vec<[u32; 3]>,
}

impl PieceBuilder {
    fn add_polygon(&mut self, polygon: &[Point<Real>]) {
        if polygon.len() < 3 {
            return;
        }

        let base = self.points.len() as u32;
        self.points.extend_from_slice(polygon);

        for k in 1..polygon.len() as u32 - 1 {
            self.triangles.push([base, base + k, base + k + 1]);
        }
    }

    fn build(self) -> Option<HacdMesh> {
        let mut mesh = HacdMesh::new(self.points, self.triangles).ok()?;
        let _ = mesh.weld_vertices(PIECE_WELD_DISTANCE);
        (!mesh.triangles().is_empty()).then_some(mesh)
    }
}

/// Are all the triangles of `mesh` on the same plane, whatever their orientation?
///
/// A piece with a degenerate triangle is not considered flat.
pub(crate) fn is_flat(mesh: &HacdMesh) -> bool {
    let points = mesh.points();
    let normal = |t: &[u32; 3]| {
        let [a, b, c] = t.map(|i| points[i as usize]);
        (b - a).cross(&(c - a)).try_normalize(1.0e-6)
    };

    let Some((first, others)) = mesh.triangles().split_first() else {
        return true;
    };
    let Some(n0) = normal(first) else {
        return false;
    };
    let origin = points[first[0] as usize];

    others.iter().all(|t| {
        normal(t)
            .map(|n| n.dot(&n0).abs() >= 1.0 - COPLANAR_NORMAL_EPSILON)
            .unwrap_or(false)
            && t.iter()
                .all(|i| (points[*i as usize] - origin).dot(&n0).abs() < COPLANAR_DISTANCE_EPSILON)
    })
}

/// The volume swept by the triangles of `mesh` pushed along their normals onto the
/// boundary of `hull`, which must contain them.
pub(crate) fn concavity_volume(mesh: &HacdMesh, hull: &ConvexHull) -> Real {
    let planes: Vec<(Vector<Real>, Real)> = hull
        .faces()
        .iter()
        .filter_map(|f| {
            let normal = f.normal(hull.vertices()).try_normalize(0.0)?;
            let offset = normal.dot(&hull.vertices()[f.indices[0] as usize].coords);
            Some((normal, offset))
        })
        .collect();

    // The point where the ray leaves the hull.
    let project = |p: &Point<Real>, dir: &Vector<Real>| {
        let exit = planes
            .iter()
            .filter_map(|(normal, offset)| {
                let den = normal.dot(dir);
                (den > 1.0e-12).then(|| (offset - normal.dot(&p.coords)) / den)
            })
            .fold(Real::MAX, Real::min);

        if exit < Real::MAX {
            p + dir * exit.max(0.0)
        } else {
            *p
        }
    };

    mesh.triangles()
        .iter()
        .map(|t| {
            let [a, b, c] = t.map(|i| mesh.points()[i as usize]);
            let Some(dir) = (b - a).cross(&(c - a)).try_normalize(1.0e-12) else {
                return 0.0;
            };
            let [pa, pb, pc] = [a, b, c].map(|p| project(&p, &dir));

            DecomposedHull::new(
                vec![a, b, c, pa, pb, pc],
                vec![
                    [2, 1, 0],
                    [3, 4, 5],
                    [0, 3, 4],
                    [0, 4, 1],
                    [2, 5, 3],
                    [2, 3, 0],
                    [1, 4, 5],
                    [1, 5, 2],
                ],
            )
            .volume
        })
        .sum()
}

struct PlaneSplitter<'a> {
    params: &'a HacdParameters,
    max_depth: usize,
    /// Percentage of the volume of its hull a piece must miss to be split.
    concave_percent: Real,
    /// Percentage of the volume of the first hull under which a piece is not split.
    volume_percent: Real,
    master_volume: Real,
    hulls: Vec<DecomposedHull>,
}

impl PlaneSplitter<'_> {
    /// Should `piece`, whose hull is `hull`, be split?
    fn needs_split(&mut self, piece: &HacdMesh, hull: &ConvexHull, depth: usize) -> bool {
        if depth >= self.max_depth {
            return false;
        }

        let hull_volume = hull.volume_and_surface_area().0.abs();
        if depth == 0 {
            self.master_volume = hull_volume;
        }

        if self.master_volume <= 0.0 || hull_volume * 100.0 / self.master_volume <= self.volume_percent
        {
            return false;
        }

        let concave_volume = concavity_volume(piece, hull);
        log::trace!(
            "Piece at depth {}: hull volume {}, concave volume {}.",
            depth,
            hull_volume,
            concave_volume
        );

        concave_volume * 100.0 / hull_volume >= self.concave_percent
    }

    fn emit(&mut self, piece: &HacdMesh, progress: &mut dyn ProgressCallback) {
        let hull = ConvexHull::new(
            piece.points(),
            self.params.hull_distance_tolerance,
            Some(self.params.max_vertices_per_hull),
        );

        if !hull.is_empty() {
            self.hulls.push(DecomposedHull::from_convex_hull(&hull));
            let leaves = (1usize << self.max_depth) as Real;
            report(progress, "SplittingMesh", self.hulls.len() as Real / leaves);
        }
    }
}

/// Decomposes `mesh` by cutting it recursively in halves.
///
/// A piece is cut by the plane orthogonal to the longest axis of its oriented bounding
/// box, unless it is at depth `params.decomposition_depth`, its hull is smaller than
/// `params.small_cluster_threshold` percent of the hull of the whole mesh, or the space
/// between the piece and its hull is smaller than `10 * params.concavity` percent of
/// the hull. Flat pieces are dropped. Each piece that is not cut gives one hull.
pub(crate) fn split_decomposition(
    mesh: &HacdMesh,
    params: &HacdParameters,
    progress: &mut dyn ProgressCallback,
) -> Vec<DecomposedHull> {
    let max_depth = if params.max_merge_hulls == 1 {
        0
    } else {
        params.decomposition_depth.min(MAX_DECOMPOSITION_DEPTH)
    };
    let mut splitter = PlaneSplitter {
        params,
        max_depth,
        concave_percent: params.concavity * 10.0,
        volume_percent: params.small_cluster_threshold,
        master_volume: 0.0,
        hulls: Vec::new(),
    };

    // Front pieces are processed before back pieces, depth first.
    let mut stack = vec![(mesh.clone(), 0)];
    let mut splits = 0;

    while let Some((piece, depth)) = stack.pop() {
        if is_flat(&piece) {
            continue;
        }

        let hull = ConvexHull::new(piece.points(), 0.0, None);
        if hull.is_empty() {
            continue;
        }

        if splitter.needs_split(&piece, &hull, depth) {
            let plane = SplitPlane::halving(hull.vertices());
            let (front, back) = plane.split(&piece);
            splits += 1;
            stack.extend(back.map(|back| (back, depth + 1)));
            stack.extend(front.map(|front| (front, depth + 1)));
        } else {
            splitter.emit(&piece, progress);
        }
    }

    log::debug!(
        "Plane splitting: {} splits, {} hulls.",
        splits,
        splitter.hulls.len()
    );

    splitter.hulls
}

#[cfg(test)]
mod test {
    use super::{concavity_volume, is_flat, split_decomposition, SplitPlane};
    use crate::math::{Point, Real, Vector};
    use crate::transformation::convex_hull3::ConvexHull;
    use crate::transformation::hacd::{HacdMesh, HacdParameters};

    fn x_plane(x: Real) -> SplitPlane {
        SplitPlane {
            origin: Point::new(x, 0.0, 0.0),
            normal: Vector::x(),
        }
    }

    #[test]
    fn triangle_cuts() {
        let plane = x_plane(0.5);
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 1.0, 0.0);

        // One vertex in front: a triangle in front and a quad behind.
        let (front, back) = plane.split_triangle([a, b, c]);
        assert_eq!(front.len(), 3);
        assert_eq!(back.len(), 4);
        assert_relative_eq!(front[0], Point::new(0.5, 0.0, 0.0), epsilon = 1.0e-12);
        assert_eq!(front[1], b);
        assert_relative_eq!(front[2], Point::new(0.5, 0.5, 0.0), epsilon = 1.0e-12);
        assert_eq!(back[0], a);
        assert_eq!(back[3], c);

        // A vertex on the plane follows the others.
        let on = Point::new(0.5, 2.0, 0.0);
        let (front, back) = plane.split_triangle([a, on, c]);
        assert!(front.is_empty());
        assert_eq!(back.as_slice(), &[a, on, c]);

        // A triangle on the plane goes to the front.
        let flat = [
            Point::new(0.5, 0.0, 0.0),
            Point::new(0.5, 1.0, 0.0),
            Point::new(0.5, 0.0, 1.0),
        ];
        let (front, back) = plane.split_triangle(flat);
        assert_eq!(front.len(), 3);
        assert!(back.is_empty());
    }

    #[test]
    fn cube_is_halved() {
        let cube = HacdMesh::cuboid(Vector::new(2.0, 1.0, 1.0));
        let plane = SplitPlane::halving(cube.points());
        assert_relative_eq!(plane.origin, Point::new(1.0, 0.5, 0.5), epsilon = 1.0e-9);
        assert_relative_eq!(plane.normal.x.abs(), 1.0, epsilon = 1.0e-9);

        let (front, back) = plane.split(&cube);
        let (front, back) = (front.unwrap(), back.unwrap());

        for piece in [&front, &back] {
            let (volume, _) = ConvexHull::new(piece.points(), 0.0, None).volume_and_surface_area();
            assert_relative_eq!(volume, 1.0, epsilon = 1.0e-9);
            // The cut is left open: the four side quads are halved, one end is whole.
            assert_eq!(piece.triangles().len(), 2 + 4 * 3);
        }
    }

    #[test]
    fn flat_pieces() {
        let quad = HacdMesh::new(
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(1.0, 1.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
            ],
            // Opposite orientations are still flat.
            vec![[0, 1, 2], [0, 3, 2]],
        )
        .unwrap();
        assert!(is_flat(&quad));
        assert!(!is_flat(&HacdMesh::cuboid(Vector::repeat(1.0))));
    }

    #[test]
    fn convex_pieces_have_no_concavity() {
        let cube = HacdMesh::cuboid(Vector::new(1.0, 2.0, 3.0));
        let hull = ConvexHull::new(cube.points(), 0.0, None);
        assert_relative_eq!(concavity_volume(&cube, &hull), 0.0, epsilon = 1.0e-9);

        // Turning the cube inside out makes every face sweep through the hull.
        let inverted = HacdMesh::new(
            cube.points().to_vec(),
            cube.triangles().iter().map(|[a, b, c]| [*a, *c, *b]).collect(),
        )
        .unwrap();
        assert!(concavity_volume(&inverted, &hull) > 1.0);
    }

    #[test]
    fn convex_mesh_is_never_split() {
        let cube = HacdMesh::cuboid(Vector::new(1.0, 2.0, 3.0));
        let params = HacdParameters {
            decomposition_depth: 5,
            ..HacdParameters::default()
        };

        let hulls = split_decomposition(&cube, &params, &mut |_: &str, _: Real| {});
        assert_eq!(hulls.len(), 1);
        assert_relative_eq!(hulls[0].volume, 6.0, epsilon = 1.0e-9);
    }
}
