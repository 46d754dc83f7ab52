use crate::shapes::unit_cube_points;
use hacd3d::math::{Point, Real};
use hacd3d::transformation::convex_hull3::{ConvexHull, ConvexHullError, NO_HIT};

#[test]
fn cube_hull() {
    let hull = ConvexHull::new(&unit_cube_points(), 0.0, None);
    assert_eq!(hull.vertex_count(), 8);
    assert_eq!(hull.face_count(), 12);
    assert!(hull.check(1.0e-9).is_ok());

    let (volume, area) = hull.volume_and_surface_area();
    assert_relative_eq!(volume, 1.0, epsilon = 1.0e-9);
    assert_relative_eq!(area, 6.0, epsilon = 1.0e-9);
}

#[test]
fn coplanar_points_have_no_hull() {
    let points = [
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ];
    let hull = ConvexHull::new(&points, 0.0, None);
    assert_eq!(hull.vertex_count(), 0);
    assert_eq!(
        ConvexHull::try_new(&points, 0.0, None).err(),
        Some(ConvexHullError::Degenerate)
    );
}

#[test]
fn ray_cast_through_cube() {
    let hull = ConvexHull::new(&unit_cube_points(), 0.0, None);
    let p0 = Point::new(0.5, 0.5, 2.0);
    let p1 = Point::new(0.5, 0.5, 0.0);

    assert_relative_eq!(hull.ray_cast(&p0, &p1, &mut None), 0.5, epsilon = 1.0e-9);
    assert_relative_eq!(hull.linear_ray_cast(&p0, &p1), 0.5, epsilon = 1.0e-9);

    // Stops before the hull.
    let p1 = Point::new(0.5, 0.5, 1.5);
    assert!(hull.ray_cast(&p0, &p1, &mut None) > 1.0);
    assert_eq!(hull.linear_ray_cast(&p0, &p1), NO_HIT);
}

#[test]
fn random_spheres_are_convex_and_closed() {
    let mut rng = oorandom::Rand64::new(42);

    for _ in 0..10 {
        let points: Vec<_> = (0..500)
            .map(|_| {
                let p = Point::new(
                    rng.rand_float() as Real - 0.5,
                    rng.rand_float() as Real - 0.5,
                    rng.rand_float() as Real - 0.5,
                );
                // Half of the points on a sphere, the rest inside.
                if rng.rand_u64() % 2 == 0 {
                    Point::from(p.coords.normalize())
                } else {
                    p
                }
            })
            .collect();

        let hull = ConvexHull::new(&points, 0.0, None);
        assert!(!hull.is_empty());
        assert!(hull.check(1.0e-9).is_ok());

        for point in &points {
            assert!(hull.linear_ray_cast(point, &Point::origin()) <= 1.0);
        }
    }
}
