//! Half-edge polygonal meshes.

pub use self::error::TopologyError;
pub use self::polyhedron::{EdgeHandle, FaceId, HalfEdge, Polyhedron, BOUNDARY_FACE};
pub(crate) use self::convex_partition::is_convex_corner;

mod convex_partition;
mod error;
mod polyhedron;
mod triangulation;
