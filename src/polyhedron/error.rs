use super::EdgeHandle;

/// Errors raised while building or validating a [`Polyhedron`](super::Polyhedron).
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TopologyError {
    /// A face was given less than three vertices.
    #[error("a face needs at least three vertices, {0} were given")]
    DegenerateFace(usize),
    /// The per-vertex payload of a face does not have one entry per vertex.
    #[error("expected {expected} per-vertex payloads, found {found}")]
    UserDataLength {
        /// The number of vertices of the face.
        expected: usize,
        /// The number of payloads given.
        found: usize,
    },
    /// Two consecutive vertices of a face are identical.
    #[error("vertex {0} appears twice in a row")]
    RepeatedVertex(u32),
    /// A face goes through the same pair of vertices more than once.
    #[error("the face goes through the vertex pair ({0}, {1}) more than once")]
    SelfIntersectingFace(u32, u32),
    /// A face reuses a directed edge already owned by another face.
    #[error("the directed edge ({0}, {1}) already exists")]
    DuplicateEdge(u32, u32),
    /// A half-edge has no twin.
    #[error("the half-edge {0:?} has no twin")]
    MissingTwin(EdgeHandle),
    /// A half-edge and its twin do not point back to each other or do not join the same vertices.
    #[error("the half-edge {0:?} and its twin are inconsistent")]
    TwinMismatch(EdgeHandle),
    /// The `next`/`prev` links or the face ids around a half-edge are inconsistent.
    #[error("the face loop through the half-edge {0:?} is broken")]
    BrokenLoop(EdgeHandle),
    /// A half-edge is missing from, or misregistered in, the vertex-pair map.
    #[error("the half-edge {0:?} is not registered under its vertex pair")]
    UnknownEdge(EdgeHandle),
}
