//! Hierarchical approximate convex decomposition (HACD).
//!
//! A triangle mesh is first turned into a half-edge mesh whose coplanar triangles are
//! grouped into convex faces. Each face starts as its own cluster in the dual graph of
//! the mesh, where clusters are linked if they share an edge, or if they face each
//! other across a thin part of the mesh. Linked clusters are then merged greedily,
//! the cheapest first, the cost being dominated by the concavity of the merged
//! cluster: the largest distance between its faces and its convex hull.
//!
//! Every merge is recorded in a [`MergeTree`], which is finally cut into the
//! clusters that are convex enough. Each cluster is then replaced by its convex hull.
//!
//! Setting [`HacdParameters::decomposition_depth`] replaces the clustering by recursive
//! cuts of the mesh in halves, until the pieces are convex enough.
//!
//! ```
//! use hacd3d::math::Point;
//! use hacd3d::transformation::hacd::{self, HacdMesh};
//!
//! // A unit cube.
//! let points = (0..8)
//!     .map(|i| Point::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!     .collect();
//! let quads = [[0, 2, 3, 1], [4, 5, 7, 6], [0, 1, 5, 4], [2, 6, 7, 3], [0, 4, 6, 2], [1, 3, 7, 5]];
//! let triangles = quads
//!     .iter()
//!     .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
//!     .collect();
//!
//! let mesh = HacdMesh::new(points, triangles).unwrap();
//! let hulls = hacd::decompose(&mesh, 0.1, 16, 32);
//! assert_eq!(hulls.len(), 1);
//! assert!((hulls[0].volume - 1.0).abs() < 1.0e-9);
//! ```

pub use self::decomposition::{decompose, DecomposedHull, Hacd};
pub use self::error::HacdError;
pub use self::input_mesh::{HacdMesh, Normalization, WELD_DISTANCE};
pub use self::merge_tree::{MergeTree, MergeTreeNode};
pub use self::parameters::HacdParameters;
pub use self::progress::ProgressCallback;

mod back_face;
mod cluster_graph;
mod concavity;
mod decomposition;
mod error;
mod fast;
mod input_mesh;
mod merge_hulls;
mod merge_tree;
mod mesh_face;
mod parameters;
mod plane_split;
mod progress;
