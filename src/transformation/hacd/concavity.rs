use super::mesh_face::MeshFace;
use crate::math::{Point, Real, Vector};
use crate::transformation::convex_hull3::ConvexHull;
use std::collections::VecDeque;

/// Number of sample points measured per triangle.
const MAX_SAMPLES: usize = 5;
/// Triangles whose doubled area exceeds `sqrt(MIN_SPLIT_AREA2)` are subdivided.
const MIN_SPLIT_AREA2: Real = 0.125 * 0.125 * 0.5;
/// Distance of the ray origins to the sampled triangle, relative to the hull diagonal.
const RAY_LENGTH: Real = 4.0;

/// The largest depth of a triangle under the surface of `hull`.
///
/// The triangle is sampled at its centroid, then at the centroids of its corner
/// sub-triangles, breadth-first, for at most a few samples. Each sample is
/// measured by casting a ray from outside the hull towards it, along `-normal`.
pub(crate) fn triangle_concavity(
    hull: &ConvexHull,
    normal: &Vector<Real>,
    triangle: [Point<Real>; 3],
    guess: &mut Option<usize>,
) -> Real {
    let step = normal * (RAY_LENGTH * hull.diagonal());
    let step_len = step.norm();
    let mut concavity: Real = 0.0;
    let mut queue = VecDeque::with_capacity(MAX_SAMPLES * 3);
    queue.push_back(triangle);

    for _ in 0..MAX_SAMPLES {
        let Some([p0, p1, p2]) = queue.pop_front() else {
            break;
        };

        let q1 = Point::from((p0.coords + p1.coords + p2.coords) / 3.0);
        let q0 = q1 + step;
        let param = hull.ray_cast(&q0, &q1, guess).min(1.0);
        concavity = concavity.max(step_len * (1.0 - param));

        if (p1 - p0).cross(&(p2 - p0)).norm_squared() > MIN_SPLIT_AREA2 {
            let p01 = na::center(&p0, &p1);
            let p12 = na::center(&p1, &p2);
            let p20 = na::center(&p2, &p0);
            queue.push_back([p0, p01, p20]);
            queue.push_back([p1, p12, p01]);
            queue.push_back([p2, p20, p12]);
        }
    }

    concavity
}

/// The largest concavity of the triangles of the given faces with respect to `hull`.
pub(crate) fn faces_concavity(
    hull: &ConvexHull,
    faces: &[MeshFace],
    cluster: &[usize],
    points: &[Point<Real>],
) -> Real {
    let mut guess = None;
    let mut concavity: Real = 0.0;

    for face in cluster.iter().map(|f| &faces[*f]) {
        for [i0, i1, i2] in face.fan() {
            let triangle = [
                points[i0 as usize],
                points[i1 as usize],
                points[i2 as usize],
            ];
            concavity = concavity.max(triangle_concavity(hull, &face.normal, triangle, &mut guess));
        }
    }

    concavity
}
