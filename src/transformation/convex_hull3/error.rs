/// Errors raised when building or validating a [`ConvexHull`](super::ConvexHull).
///
/// [`ConvexHull::new`](super::ConvexHull::new) never fails: it returns an empty hull
/// on degenerate input. These errors are reported by
/// [`ConvexHull::try_new`](super::ConvexHull::try_new) and
/// [`ConvexHull::check`](super::ConvexHull::check).
#[derive(thiserror::Error, Debug, PartialEq, Clone, Copy)]
pub enum ConvexHullError {
    /// Less than four distinct points were given.
    #[error("less than four distinct points were given to the convex-hull algorithm")]
    IncompleteInput,
    /// The input points are collinear or coplanar.
    #[error("the input points are either invalid (NaN) or almost coplanar")]
    Degenerate,
    /// A face is not listed back as a twin by one of its neighbors.
    #[error("the twin links of face {0} are not symmetric")]
    TwinMismatch(usize),
    /// A hull vertex lies outside the plane of a face.
    #[error("vertex {vertex} lies at distance {distance} outside of face {face}")]
    NonConvex {
        /// The face index.
        face: usize,
        /// The vertex index.
        vertex: u32,
        /// The signed distance of the vertex to the face plane.
        distance: f64,
    },
    /// The faces, edges and vertices of the hull do not form a topological sphere.
    #[error("the hull does not have the Euler characteristic of a sphere")]
    EulerCharacteristic,
}
