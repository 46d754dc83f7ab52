use super::mesh_face::MeshFace;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::partitioning::AabbTree;
use crate::query::{self, Ray};

/// Finds the pairs of faces that look at each other across the inside of the mesh.
///
/// From the centroids of the four sub-triangles of every fan triangle of a face, a ray
/// is cast backward (along the opposite of the face normal) for twice `threshold`.
/// The closest face hit from its back side, if closer than `threshold`, is paired
/// with the casting face. Each pair `(a, b)` is reported once with `a < b`, in
/// increasing order.
pub(crate) fn back_face_pairs(
    faces: &[MeshFace],
    points: &[Point<Real>],
    threshold: Real,
) -> Vec<(usize, usize)> {
    let triangles: Vec<(usize, [u32; 3])> = faces
        .iter()
        .enumerate()
        .flat_map(|(i, f)| f.fan().map(move |t| (i, t)))
        .collect();
    let leaves = triangles
        .iter()
        .enumerate()
        .map(|(id, (_, t))| {
            let aabb = Aabb::from_points(t.iter().map(|i| points[*i as usize]));
            (id as u32, aabb)
        })
        .collect();
    let tree = AabbTree::new(leaves);
    let max_toi = threshold * 2.0;
    let mut pairs = Vec::new();

    for (face_id, face) in faces.iter().enumerate() {
        if face.normal.norm_squared() == 0.0 {
            continue;
        }

        let dir = -face.normal;

        for [i0, i1, i2] in face.fan() {
            let p0 = points[i0 as usize];
            let p1 = points[i1 as usize];
            let p2 = points[i2 as usize];
            let p01 = na::center(&p0, &p1);
            let p12 = na::center(&p1, &p2);
            let p20 = na::center(&p2, &p0);

            for [a, b, c] in [[p0, p01, p20], [p1, p12, p01], [p2, p20, p12], [p01, p12, p20]] {
                let origin = Point::from((a.coords + b.coords + c.coords) / 3.0);
                let ray = Ray::new(origin, dir);
                let hit = tree.cast_ray(&ray, max_toi, |id, _| {
                    let (other, [j0, j1, j2]) = triangles[id as usize];

                    // Only faces seen from their back side count.
                    if other == face_id || faces[other].normal.dot(&dir) <= 0.0 {
                        return None;
                    }

                    query::local_ray_intersection_with_triangle(
                        &points[j0 as usize],
                        &points[j1 as usize],
                        &points[j2 as usize],
                        &ray,
                    )
                    .map(|(inter, _)| inter.time_of_impact)
                });

                if let Some((id, toi)) = hit {
                    if toi < threshold {
                        let other = triangles[id as usize].0;
                        pairs.push((face_id.min(other), face_id.max(other)));
                    }
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs.dedup();
    log::debug!("Found {} back-face pairs.", pairs.len());
    pairs
}
