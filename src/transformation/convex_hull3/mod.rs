//! Incremental convex hull of 3D point clouds.

pub use self::convex_hull::ConvexHull;
pub use self::error::ConvexHullError;
pub use self::hull_face::HullFace;
pub use self::ray_cast::NO_HIT;

mod convex_hull;
mod error;
mod hull_face;
mod initial_mesh;
mod point_tree;
mod ray_cast;
mod validation;
