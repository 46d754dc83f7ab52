#[macro_use]
extern crate approx;

mod convex_hull;
mod decomposition;
mod polyhedron;
mod shapes;
