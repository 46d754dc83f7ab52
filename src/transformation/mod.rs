//! Convex hulls and approximate convex decomposition of meshes.

pub mod convex_hull3;
pub mod hacd;
