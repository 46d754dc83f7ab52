use crate::math::{Point, Real, Vector};
use crate::query::{Ray, RayIntersection};

/// Computes the intersection between a triangle and a ray.
///
/// Both sides of the triangle are hit. If an intersection is found, the time of
/// impact, the normal facing the ray origin and the barycentric coordinates of the
/// intersection point are returned.
pub fn local_ray_intersection_with_triangle(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    ray: &Ray,
) -> Option<(RayIntersection, Vector<Real>)> {
    let ab = *b - *a;
    let ac = *c - *a;

    // normal
    let n = ab.cross(&ac);
    let d = n.dot(&ray.dir);

    // the normal and the ray direction are parallel
    if d == 0.0 {
        return None;
    }

    let ap = ray.origin - *a;
    let t = ap.dot(&n);

    // the ray does not intersect the halfspace defined by the triangle
    if (t < 0.0 && d < 0.0) || (t > 0.0 && d > 0.0) {
        return None;
    }

    let d = d.abs();

    //
    // intersection: compute barycentric coordinates
    //
    let e = -ray.dir.cross(&ap);

    let v;
    let w;
    let toi;
    let normal;

    if t < 0.0 {
        let v0 = -ac.dot(&e);

        if v0 < 0.0 || v0 > d {
            return None;
        }

        let w0 = ab.dot(&e);

        if w0 < 0.0 || v0 + w0 > d {
            return None;
        }

        let invd = 1.0 / d;
        toi = -t * invd;
        normal = -n.normalize();
        v = v0 * invd;
        w = w0 * invd;
    } else {
        let v0 = ac.dot(&e);

        if v0 < 0.0 || v0 > d {
            return None;
        }

        let w0 = -ab.dot(&e);

        if w0 < 0.0 || v0 + w0 > d {
            return None;
        }

        let invd = 1.0 / d;
        toi = t * invd;
        normal = n.normalize();
        v = v0 * invd;
        w = w0 * invd;
    }

    Some((
        RayIntersection::new(toi, normal),
        Vector::new(-v - w + 1.0, v, w),
    ))
}

#[cfg(test)]
mod test {
    use super::local_ray_intersection_with_triangle;
    use crate::math::{Point, Vector};
    use crate::query::Ray;

    #[test]
    fn hits_both_sides() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(0.0, 1.0, 0.0);

        let down = Ray::new(Point::new(0.25, 0.25, 2.0), Vector::new(0.0, 0.0, -1.0));
        let (inter, bcoords) = local_ray_intersection_with_triangle(&a, &b, &c, &down).unwrap();
        assert_relative_eq!(inter.time_of_impact, 2.0);
        assert_relative_eq!(inter.normal, Vector::z());
        assert_relative_eq!(bcoords, Vector::new(0.5, 0.25, 0.25));

        let up = Ray::new(Point::new(0.25, 0.25, -1.0), Vector::new(0.0, 0.0, 1.0));
        let (inter, _) = local_ray_intersection_with_triangle(&a, &b, &c, &up).unwrap();
        assert_relative_eq!(inter.time_of_impact, 1.0);
        assert_relative_eq!(inter.normal, -Vector::z());

        let miss = Ray::new(Point::new(0.75, 0.75, 1.0), Vector::new(0.0, 0.0, -1.0));
        assert!(local_ray_intersection_with_triangle(&a, &b, &c, &miss).is_none());
    }
}
