//! Rays and ray intersections.

use crate::math::{Point, Real, Vector};

/// A ray for ray-casting queries.
///
/// A ray starts at an origin point and extends in a direction. The direction does
/// NOT need to be normalized: every time of impact returned by the queries of this
/// crate is expressed in multiples of `dir`, so a ray whose `dir` spans a segment
/// yields hit parameters in `[0, 1]` for hits on that segment.
///
/// # Example
///
/// ```
/// use hacd3d::query::Ray;
/// use hacd3d::math::{Point, Vector};
///
/// // The segment from (2, 0, 0) to (-2, 0, 0).
/// let ray = Ray::new(Point::new(2.0, 0.0, 0.0), Vector::new(-4.0, 0.0, 0.0));
/// assert_eq!(ray.point_at(0.25), Point::new(1.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction vector of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray from an origin point and a direction vector.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// Creates the ray spanning the segment `[start, end]`.
    pub fn from_segment(start: Point<Real>, end: Point<Real>) -> Ray {
        Ray {
            origin: start,
            dir: end - start,
        }
    }

    /// Computes the point at parameter `t` along this ray.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}

/// Structure containing the result of a successful ray cast.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RayIntersection {
    /// The time of impact of the ray with the object, in multiples of the ray direction.
    pub time_of_impact: Real,
    /// The unit normal of the hit surface, pointing against the ray.
    pub normal: Vector<Real>,
}

impl RayIntersection {
    /// Creates a new `RayIntersection`.
    #[inline]
    pub fn new(time_of_impact: Real, normal: Vector<Real>) -> RayIntersection {
        RayIntersection {
            time_of_impact,
            normal,
        }
    }
}
