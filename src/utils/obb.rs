use crate::math::{Matrix, Point, Real, Vector, DIM};

/// An oriented bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Obb {
    /// The center of the box.
    pub center: Point<Real>,
    /// The orthonormal axes of the box, as the columns of a rotation matrix.
    pub axes: Matrix<Real>,
    /// Half the length of the box along each of its axes.
    pub half_extents: Vector<Real>,
}

/// Computes the center and the covariance matrix of a set of points.
pub fn center_cov(pts: &[Point<Real>]) -> (Point<Real>, Matrix<Real>) {
    let normalizer = 1.0 / pts.len().max(1) as Real;
    let center = Point::from(
        pts.iter()
            .fold(Vector::zeros(), |acc, p| acc + p.coords)
            * normalizer,
    );
    let mut cov: Matrix<Real> = na::zero();

    for p in pts.iter() {
        let cp = *p - center;
        // NOTE: this is more numerically stable than using cov.syger.
        cov += cp * (cp * normalizer).transpose();
    }

    (center, cov)
}

/// Computes an oriented bounding box aligned with the principal axes of the given points.
///
/// The returned OBB is not guaranteed to be the smallest enclosing OBB.
pub fn obb(pts: &[Point<Real>]) -> Obb {
    let (_, cov) = center_cov(pts);
    let mut axes = cov.symmetric_eigen().eigenvectors;

    if axes.determinant() < 0.0 {
        axes = -axes;
    }

    let mut mins = Vector::repeat(Real::MAX);
    let mut maxs = Vector::repeat(-Real::MAX);

    for pt in pts {
        for i in 0..DIM {
            let dot = axes.column(i).dot(&pt.coords);
            mins[i] = mins[i].min(dot);
            maxs[i] = maxs[i].max(dot);
        }
    }

    if pts.is_empty() {
        mins = Vector::zeros();
        maxs = Vector::zeros();
    }

    Obb {
        center: Point::from(axes * ((maxs + mins) / 2.0)),
        axes,
        half_extents: (maxs - mins) / 2.0,
    }
}
