use crate::polyhedron::TopologyError;

/// Errors raised while validating the input of a decomposition.
///
/// The decomposition itself never fails: invalid faces are skipped and degenerate
/// clusters do not produce any hull.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum HacdError {
    /// The mesh has no vertex or no triangle.
    #[error("the input mesh is empty")]
    EmptyMesh,
    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {face} refers to the vertex {index}, which does not exist")]
    InvalidIndex {
        /// The index of the triangle.
        face: usize,
        /// The out-of-bounds vertex index.
        index: u32,
    },
    /// A triangle cannot be inserted in the half-edge mesh.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}
