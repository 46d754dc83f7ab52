use super::point_tree::PointTree;
use crate::math::{Point, Real, Vector};

/// Number of directions tried when looking for the initial tetrahedron.
pub(super) const NUM_DIRECTIONS: usize = 32;

/// Relative tolerance on the squared lengths and areas of the initial tetrahedron.
const AFFINE_TOLERANCE: Real = 1.0e-4;
/// Relative tolerance on the volume of the initial tetrahedron.
const VOLUME_TOLERANCE: Real = 1.0e-6;

/// Normals of the faces of an octahedron subdivided once, spread over the sphere.
///
/// The four sub-faces of each octant are interleaved so that consecutive directions
/// point to different octants.
pub(super) fn sphere_directions() -> [Vector<Real>; NUM_DIRECTIONS] {
    let p = [
        Vector::x(),
        -Vector::x(),
        Vector::y(),
        -Vector::y(),
        Vector::z(),
        -Vector::z(),
    ];
    let octants = [
        [4, 0, 2],
        [5, 3, 1],
        [5, 1, 2],
        [4, 3, 0],
        [4, 2, 1],
        [5, 0, 3],
        [5, 2, 0],
        [4, 1, 3],
    ];
    let normal = |a: &Vector<Real>, b: &Vector<Real>, c: &Vector<Real>| (b - a).cross(&(c - a)).normalize();
    let mut directions = [Vector::zeros(); NUM_DIRECTIONS];

    for (k, [i0, i1, i2]) in octants.iter().enumerate() {
        let (a, b, c) = (p[*i0], p[*i1], p[*i2]);
        let ab = (a + b).normalize();
        let bc = (b + c).normalize();
        let ca = (c + a).normalize();

        directions[k] = normal(&a, &ab, &ca);
        directions[k + 8] = normal(&b, &bc, &ab);
        directions[k + 16] = normal(&c, &ca, &bc);
        directions[k + 24] = normal(&ab, &bc, &ca);
    }

    directions
}

fn support_off_plane(
    tree: &mut PointTree,
    points: &[Point<Real>],
    dir: &Vector<Real>,
    origin: &Point<Real>,
    normal: &Vector<Real>,
    tolerance: Real,
) -> Option<u32> {
    let id = tree.support_vertex(points, dir)?;
    (normal.dot(&(points[id as usize] - origin)).abs() > tolerance).then_some(id)
}

/// Finds four affinely independent points of the cloud.
///
/// The points are returned in an order such that `(p1 - p0).cross(p2 - p0).dot(p3 - p0)`
/// is negative, and they are all consumed from `tree`. Returns `None` if the cloud is
/// flat or a line with respect to its diagonal.
pub(super) fn initial_tetrahedron(points: &[Point<Real>], tree: &mut PointTree) -> Option<[u32; 4]> {
    let directions = sphere_directions();
    let diagonal2 = tree.aabb().extents().norm_squared();

    let i0 = tree.support_vertex(points, &directions[0])?;
    tree.consume(i0);
    let p0 = points[i0 as usize];

    let (i1, e1) = directions[1..].iter().find_map(|dir| {
        let id = tree.support_vertex(points, dir)?;
        let e1 = points[id as usize] - p0;
        (e1.norm_squared() > AFFINE_TOLERANCE * diagonal2).then_some((id, e1))
    })?;
    tree.consume(i1);

    let (i2, e2, normal) = directions[2..].iter().find_map(|dir| {
        let id = tree.support_vertex(points, dir)?;
        let e2 = points[id as usize] - p0;
        let normal = e1.cross(&e2);
        (normal.norm() > AFFINE_TOLERANCE * diagonal2).then_some((id, e2, normal))
    })?;
    tree.consume(i2);

    let tolerance = VOLUME_TOLERANCE * diagonal2;
    let i3 = support_off_plane(tree, points, &normal, &p0, &normal, tolerance)
        .or_else(|| support_off_plane(tree, points, &-normal, &p0, &normal, tolerance))
        .or_else(|| {
            directions[3..]
                .iter()
                .find_map(|dir| support_off_plane(tree, points, dir, &p0, &normal, tolerance))
        })?;
    tree.consume(i3);

    let e3 = points[i3 as usize] - p0;
    let volume = e1.cross(&e2).dot(&e3);

    if volume > 0.0 {
        Some([i0, i1, i3, i2])
    } else {
        Some([i0, i1, i2, i3])
    }
}

#[cfg(test)]
mod test {
    use super::{initial_tetrahedron, sphere_directions};
    use crate::math::Point;
    use crate::transformation::convex_hull3::point_tree::PointTree;

    #[test]
    fn directions_cover_the_sphere() {
        let directions = sphere_directions();

        for (i, dir) in directions.iter().enumerate() {
            assert_relative_eq!(dir.norm(), 1.0, epsilon = 1.0e-12);
            for other in &directions[i + 1..] {
                assert!(dir.dot(other) < 1.0 - 1.0e-6);
            }
        }

        let sum = directions.iter().fold(na::zero::<crate::math::Vector<f64>>(), |a, b| a + b);
        assert_relative_eq!(sum.norm(), 0.0, epsilon = 1.0e-12);
        // The first direction points to the (+x, +y, +z) octant.
        assert!(directions[0].iter().all(|c| *c > 0.0));
    }

    #[test]
    fn tetrahedron_is_negatively_oriented() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(0.2, 0.2, 0.2),
        ];
        let mut tree = PointTree::new(&points);
        let [i0, i1, i2, i3] = initial_tetrahedron(&points, &mut tree).unwrap();
        let p = |i: u32| points[i as usize];
        let volume = (p(i1) - p(i0)).cross(&(p(i2) - p(i0))).dot(&(p(i3) - p(i0)));

        assert!(volume < 0.0);
        assert!(![i0, i1, i2, i3].contains(&4));
    }

    #[test]
    fn flat_cloud_has_no_tetrahedron() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.5, 0.5, 0.0),
        ];
        let mut tree = PointTree::new(&points);
        assert!(initial_tetrahedron(&points, &mut tree).is_none());
    }
}
