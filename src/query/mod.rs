//! Geometric queries: ray casts against triangles and bounding boxes.

pub use self::ray::{local_ray_intersection_with_triangle, Ray, RayIntersection};

pub mod ray;
