//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector, DIM};
use crate::query::Ray;
use std::mem;

/// An Axis-Aligned Bounding Box (AABB).
///
/// An AABB is defined by its minimum and maximum corners. It is used here to bound
/// point clouds (the convex hull builder's point partition tree), mesh polygons (the
/// back-face ray casting tree) and output hulls (the hull merging pass).
///
/// # Structure
///
/// - **mins**: The point with the smallest coordinates on each axis.
/// - **maxs**: The point with the largest coordinates on each axis.
/// - **Invariant**: `mins.x ≤ maxs.x`, `mins.y ≤ maxs.y` and `mins.z ≤ maxs.z`, except for
///   the empty AABB returned by [`Aabb::new_invalid`].
///
/// # Example
///
/// ```
/// use hacd3d::bounding_volume::Aabb;
/// use hacd3d::math::Point;
///
/// let aabb = Aabb::from_points([
///     Point::new(1.0, 2.0, 3.0),
///     Point::new(-1.0, 4.0, 2.0),
///     Point::new(0.0, 0.0, 5.0),
/// ]);
///
/// assert_eq!(aabb.mins, Point::new(-1.0, 0.0, 2.0));
/// assert_eq!(aabb.maxs, Point::new(1.0, 4.0, 5.0));
/// ```
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point<Real>,
    /// The point with maximum coordinates.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its minimum and maximum corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with inverted bounds.
    ///
    /// The resulting AABB has `mins` set to maximum values and `maxs` set to
    /// minimum values. It is the neutral element of [`Aabb::merge`] and
    /// [`Aabb::take_point`].
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB that tightly encloses a set of points.
    ///
    /// Returns an invalid AABB if the iterator is empty.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut result = Self::new_invalid();
        for pt in pts {
            result.take_point(pt);
        }
        result
    }

    /// Creates a new AABB that tightly encloses a set of points given by reference.
    pub fn from_points_ref<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        Self::from_points(pts.into_iter().copied())
    }

    /// Returns `true` if `mins <= maxs` on every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..DIM).all(|i| self.mins[i] <= self.maxs[i])
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half-extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The length of the diagonal of this AABB.
    #[inline]
    pub fn diagonal(&self) -> Real {
        self.extents().norm()
    }

    /// The volume of this AABB.
    #[inline]
    pub fn volume(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Enlarges this AABB so it also contains `other`.
    #[inline]
    pub fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    /// The smallest AABB containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// This AABB with each face pushed outward by `amount`.
    #[inline]
    pub fn loosened(&self, amount: Real) -> Aabb {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        Aabb {
            mins: self.mins + Vector::repeat(-amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }

    /// This AABB with each axis grown by `ratio` times its extent on both sides.
    #[inline]
    pub fn inflated(&self, ratio: Real) -> Aabb {
        let margin = self.extents() * ratio;
        Aabb {
            mins: self.mins - margin,
            maxs: self.maxs + margin,
        }
    }

    /// Tests if `self` and `other` overlap (touching counts as overlapping).
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    /// Tests if `point` is inside this AABB or on its boundary.
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        (0..DIM).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }

    /// The largest value of `dir.dot(p)` for any point `p` of this AABB.
    #[inline]
    pub fn support_projection(&self, dir: &Vector<Real>) -> Real {
        (0..DIM)
            .map(|i| (dir[i] * self.mins[i]).max(dir[i] * self.maxs[i]))
            .sum()
    }

    /// Clips the segment `ray.origin + t * ray.dir` for `t` in `[0, max_toi]` by this AABB.
    ///
    /// Returns the parameter interval `[tmin, tmax]` of the part of the segment inside the box,
    /// or `None` if the segment misses it.
    pub fn clip_ray(&self, ray: &Ray, max_toi: Real) -> Option<(Real, Real)> {
        let mut tmin: Real = 0.0;
        let mut tmax: Real = max_toi;

        for i in 0usize..DIM {
            if ray.dir[i] == 0.0 {
                if ray.origin[i] < self.mins[i] || ray.origin[i] > self.maxs[i] {
                    return None;
                }
            } else {
                let denom = 1.0 / ray.dir[i];
                let mut inter_with_near_halfspace = (self.mins[i] - ray.origin[i]) * denom;
                let mut inter_with_far_halfspace = (self.maxs[i] - ray.origin[i]) * denom;

                if inter_with_near_halfspace > inter_with_far_halfspace {
                    mem::swap(
                        &mut inter_with_near_halfspace,
                        &mut inter_with_far_halfspace,
                    )
                }

                tmin = tmin.max(inter_with_near_halfspace);
                tmax = tmax.min(inter_with_far_halfspace);

                if tmin > tmax {
                    // This covers the case where tmax is negative because tmin is
                    // initialized at zero.
                    return None;
                }
            }
        }

        Some((tmin, tmax))
    }
}
