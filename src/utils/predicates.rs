//! Adaptive-precision geometric predicates.
//!
//! Every predicate first evaluates its determinant in plain floating point
//! together with a conservative error bound (the sum of the absolute values
//! of the partial products). When the magnitude of the determinant does not
//! dominate that bound by [`PRECISION_THRESHOLD`], the sign could be wrong and
//! the predicate is evaluated again with the expansion arithmetic of the
//! [`robust`] crate.

use crate::math::{Point, Point2, Real};

/// Relative precision under which a floating-point determinant is not trusted.
///
/// A determinant `det` with error bound `err` is accepted when
/// `|det| > err * PRECISION_THRESHOLD`.
pub const PRECISION_THRESHOLD: Real = 1.0 / (1u32 << 24) as Real;

/// Evaluates a 2x2 determinant and its error bound.
#[inline]
pub fn determinant2x2(m: &[[Real; 2]; 2]) -> (Real, Real) {
    let a = m[0][0] * m[1][1];
    let b = m[0][1] * m[1][0];
    (a - b, a.abs() + b.abs())
}

/// Evaluates a 3x3 determinant and its error bound.
///
/// The expansion is done along the first row.
#[inline]
pub fn determinant3x3(m: &[[Real; 3]; 3]) -> (Real, Real) {
    let mut det = 0.0;
    let mut err = 0.0;
    let mut sign = 1.0;

    for col in 0..3 {
        let c0 = (col + 1) % 3;
        let c1 = (col + 2) % 3;
        let (lo, hi) = if c0 < c1 { (c0, c1) } else { (c1, c0) };
        let (minor, minor_err) =
            determinant2x2(&[[m[1][lo], m[1][hi]], [m[2][lo], m[2][hi]]]);
        det += sign * m[0][col] * minor;
        err += m[0][col].abs() * minor_err;
        sign = -sign;
    }

    (det, err)
}

/// Evaluates a 4x4 determinant and its error bound.
///
/// The expansion is done along the first row.
pub fn determinant4x4(m: &[[Real; 4]; 4]) -> (Real, Real) {
    let mut det = 0.0;
    let mut err = 0.0;
    let mut sign = 1.0;

    for col in 0..4 {
        let mut minor = [[0.0; 3]; 3];
        for row in 1..4 {
            let mut k = 0;
            for c in (0..4).filter(|c| *c != col) {
                minor[row - 1][k] = m[row][c];
                k += 1;
            }
        }

        let (minor_det, minor_err) = determinant3x3(&minor);
        det += sign * m[0][col] * minor_det;
        err += m[0][col].abs() * minor_err;
        sign = -sign;
    }

    (det, err)
}

/// Returns `true` if a determinant evaluated with floating-point arithmetic
/// has a trustworthy sign.
#[inline]
pub fn is_determinant_reliable(det: Real, err: Real) -> bool {
    det.abs() > err * PRECISION_THRESHOLD
}

#[inline]
fn coord2(p: &Point2<Real>) -> robust::Coord<Real> {
    robust::Coord { x: p.x, y: p.y }
}

#[inline]
fn coord3(p: &Point<Real>) -> robust::Coord3D<Real> {
    robust::Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive if `(a, b, c)` is counter-clockwise, negative if it is clockwise, zero
/// if the three points are collinear.
pub fn orient2d(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Real {
    let ab = b - a;
    let ac = c - a;
    let (det, err) = determinant2x2(&[[ab.x, ab.y], [ac.x, ac.y]]);

    if is_determinant_reliable(det, err) {
        det
    } else {
        robust::orient2d(coord2(a), coord2(b), coord2(c))
    }
}

/// Evaluates the plane of the triangle `(p0, p1, p2)` at `q`.
///
/// Returns `(q - p0).dot((p1 - p0).cross(p2 - p0))`: positive if `q` lies on the
/// side the triangle's counter-clockwise normal points to, negative on the other
/// side, and zero if the four points are coplanar. The sign is exact.
pub fn orient3d(p0: &Point<Real>, p1: &Point<Real>, p2: &Point<Real>, q: &Point<Real>) -> Real {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let e3 = q - p0;
    let (det, err) = determinant3x3(&[
        [e1.x, e1.y, e1.z],
        [e2.x, e2.y, e2.z],
        [e3.x, e3.y, e3.z],
    ]);

    if is_determinant_reliable(det, err) {
        det
    } else {
        // Shewchuk's convention is positive below the plane.
        -robust::orient3d(coord3(p0), coord3(p1), coord3(p2), coord3(q))
    }
}

/// Tests `d` against the circumcircle of the counter-clockwise triangle `(a, b, c)`.
///
/// Positive if `d` is inside the circle, negative if it is outside, zero if the four
/// points are cocircular.
pub fn incircle(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>, d: &Point2<Real>) -> Real {
    let row = |p: &Point2<Real>| {
        let v = p - d;
        [v.x, v.y, v.norm_squared()]
    };
    let (det, err) = determinant3x3(&[row(a), row(b), row(c)]);

    if is_determinant_reliable(det, err) {
        det
    } else {
        robust::incircle(coord2(a), coord2(b), coord2(c), coord2(d))
    }
}

/// Tests `e` against the circumsphere of the tetrahedron `(a, b, c, d)`.
///
/// The tetrahedron must be such that `orient3d(a, b, c, d)` is negative. The result is
/// positive if `e` is inside the sphere, negative if it is outside, zero if the five
/// points are cospherical.
pub fn insphere(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    d: &Point<Real>,
    e: &Point<Real>,
) -> Real {
    let row = |p: &Point<Real>| {
        let v = p - e;
        [v.x, v.y, v.z, v.norm_squared()]
    };
    let (det, err) = determinant4x4(&[row(a), row(b), row(c), row(d)]);

    if is_determinant_reliable(det, err) {
        det
    } else {
        robust::insphere(coord3(a), coord3(b), coord3(c), coord3(d), coord3(e))
    }
}
