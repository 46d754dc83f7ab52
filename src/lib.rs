/*!
hacd3d
========

**hacd3d** computes hierarchical approximate convex decompositions of 3D
triangle meshes: an arbitrary closed mesh goes in, a small set of convex
hulls whose union approximately covers it comes out.

The crate is organized bottom-up:

- [`utils::predicates`]: adaptive-precision orientation and in-circle tests.
- [`polyhedron`]: a half-edge mesh with face insertion, deletion, edge flips,
  edge splits, triangulation and convex partitioning.
- [`transformation::convex_hull3`]: an incremental 3D convex hull builder and
  a best-first ray caster over its faces.
- [`transformation::hacd`]: the dual-graph clustering engine, its merge tree
  and the decomposition driver.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;
#[cfg_attr(test, macro_use)]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod partitioning;
pub mod polyhedron;
pub mod query;
pub mod transformation;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    pub use f64 as Real;
}

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use super::real::*;
    pub use na::{Matrix3, Point2, Point3, Vector2, Vector3};

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The matrix type.
    pub use Matrix3 as Matrix;
}
