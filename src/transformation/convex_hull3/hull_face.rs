use crate::math::{Point, Real, Vector};
use crate::utils::predicates;

/// Marker for a twin link that is not set yet.
pub(super) const NO_TWIN: usize = usize::MAX;

/// A triangular face of a [`ConvexHull`](super::ConvexHull).
///
/// The three vertices are counter-clockwise when seen from outside the hull. The `i`-th
/// edge joins `indices[i]` to `indices[(i + 1) % 3]` and is shared with the face
/// `twins[i]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HullFace {
    /// Indices of the vertices of this face in the hull's vertex pool.
    pub indices: [u32; 3],
    /// The faces adjacent to each edge of this face.
    pub twins: [usize; 3],
    pub(super) valid: bool,
}

impl HullFace {
    pub(super) fn new(i0: u32, i1: u32, i2: u32) -> Self {
        HullFace {
            indices: [i0, i1, i2],
            twins: [NO_TWIN; 3],
            valid: true,
        }
    }

    /// The vertex indices of the `i`-th edge of this face.
    #[inline]
    pub fn edge(&self, i: usize) -> (u32, u32) {
        (self.indices[i], self.indices[(i + 1) % 3])
    }

    /// The vertices of this face.
    #[inline]
    pub fn vertices<'a>(&self, points: &'a [Point<Real>]) -> [&'a Point<Real>; 3] {
        self.indices.map(|i| &points[i as usize])
    }

    /// The non-normalized outward normal of this face, twice its area in magnitude.
    #[inline]
    pub fn normal(&self, points: &[Point<Real>]) -> Vector<Real> {
        let [p0, p1, p2] = self.vertices(points);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Evaluates the plane of this face at `point` with exact sign.
    ///
    /// Positive if `point` is strictly outside.
    #[inline]
    pub fn orientation(&self, points: &[Point<Real>], point: &Point<Real>) -> Real {
        let [p0, p1, p2] = self.vertices(points);
        predicates::orient3d(p0, p1, p2, point)
    }

    /// The slot of `twin` in the twin links of this face.
    #[inline]
    pub fn twin_slot(&self, twin: usize) -> Option<usize> {
        self.twins.iter().position(|t| *t == twin)
    }
}
