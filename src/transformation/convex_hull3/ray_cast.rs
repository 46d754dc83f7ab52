use super::ConvexHull;
use crate::math::{Point, Real, Vector};
use crate::query::Ray;
use crate::utils::hashmap::HashSet;
use crate::utils::WeightedValue;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Value returned by the ray-casts when the segment does not enter the hull.
pub const NO_HIT: Real = 1.2;

/// Hulls with more faces than this use a local search to find where to start a ray-cast.
const LOCAL_SEARCH_THRESHOLD: usize = 32;
/// Ratio by which a neighbor may be further than the best face and still be explored.
const LOCAL_SEARCH_HYSTERESIS: Real = 1.001;
/// Difference between two face parameters under which the best-first ray-cast gives up.
const AMBIGUOUS_PARAMETER: Real = 1.0e-10;

const FAR_BEHIND: Real = -1.0e30;
const FAR_AHEAD: Real = 1.0e30;

impl ConvexHull {
    /// Intersects the line `origin + t * dir` with the plane of the face `face`.
    ///
    /// Returns the parameter `t` and `dir.dot(normal)`, which is negative if the line
    /// enters the hull through this plane. Lines parallel to the plane give an infinite
    /// parameter of the sign telling whether they are in front of it.
    fn face_ray_cast(&self, face: usize, origin: &Point<Real>, dir: &Vector<Real>) -> (Real, Real) {
        let face = &self.faces[face];
        let normal = face.normal(&self.vertices);
        let p0 = &self.vertices[face.indices[0] as usize];
        let num = (origin - p0).dot(&normal);
        let den = dir.dot(&normal);

        if den.abs() < 1.0e-16 {
            if num > 0.0 {
                (FAR_BEHIND, 0.0)
            } else {
                (FAR_AHEAD, 0.0)
            }
        } else {
            (-num / den, den)
        }
    }

    /// Clips the segment `p0 → p1` by every face of this hull.
    ///
    /// Returns the parameter in `(0, 1]` at which the segment enters the hull, and
    /// [`NO_HIT`] if it misses the hull or starts inside it.
    pub fn linear_ray_cast(&self, p0: &Point<Real>, p1: &Point<Real>) -> Real {
        let dir = p1 - p0;
        let mut t_enter: Real = 0.0;
        let mut t_leave: Real = 1.0;
        let mut hit = false;

        for face in &self.faces {
            let normal = face.normal(&self.vertices);
            let num = -(p0 - self.vertices[face.indices[0] as usize]).dot(&normal);
            let den = dir.dot(&normal);

            if den.abs() < 1.0e-12 {
                if num < 0.0 {
                    return NO_HIT;
                }
                continue;
            }

            let t = num / den;

            if den < 0.0 {
                if t > t_enter {
                    t_enter = t;
                    hit = true;
                }
                if t_enter > t_leave {
                    return NO_HIT;
                }
            } else {
                t_leave = t_leave.min(t);
                if t_leave < t_enter {
                    return NO_HIT;
                }
            }
        }

        if hit {
            t_enter
        } else {
            NO_HIT
        }
    }

    /// Finds the face whose vertices are closest to `point` with a local search.
    ///
    /// The search starts from the first face and walks towards neighbors whose vertices are
    /// not significantly further than the best distance so far.
    pub fn closest_face_to_point(&self, point: &Point<Real>) -> usize {
        let face_distance = |face: usize| {
            self.faces[face]
                .vertices(&self.vertices)
                .iter()
                .map(|p| (*p - point).norm_squared())
                .fold(Real::MAX, Real::min)
        };

        let mut closest = 0;
        let mut min_dist = face_distance(0);
        let mut visited = HashSet::default();
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(WeightedValue::new(0, min_dist)));

        while let Some(Reverse(entry)) = heap.pop() {
            let face = entry.value;

            if !visited.insert(face) {
                continue;
            }

            if entry.cost < min_dist {
                min_dist = entry.cost;
                closest = face;
            }

            for twin in self.faces[face].twins {
                if !visited.contains(&twin) {
                    let dist = face_distance(twin);
                    if dist < min_dist * LOCAL_SEARCH_HYSTERESIS {
                        heap.push(Reverse(WeightedValue::new(twin, dist)));
                    }
                }
            }
        }

        closest
    }

    /// Finds the parameter at which the segment `p0 → p1` enters this hull.
    ///
    /// This walks the hull from face to face, most promising first, and falls back to
    /// [`ConvexHull::linear_ray_cast`] when the walk cannot tell two faces apart. `guess`
    /// is a face to start from; it is updated with the face hit, if any. Returns a value in
    /// `[0, 1]` on hit and [`NO_HIT`] otherwise.
    pub fn ray_cast(&self, p0: &Point<Real>, p1: &Point<Real>, guess: &mut Option<usize>) -> Real {
        if self.faces.is_empty() {
            return NO_HIT;
        }

        let dir = p1 - p0;
        let start = guess.filter(|f| *f < self.faces.len()).unwrap_or_else(|| {
            if self.faces.len() > LOCAL_SEARCH_THRESHOLD {
                let ray = Ray::new(*p0, dir);
                if let Some((tmin, _)) = self.aabb.clip_ray(&ray, 1.0) {
                    return self.closest_face_to_point(&ray.point_at(tmin));
                }
            }
            0
        });

        let face_parameter = |face: usize| {
            let (t, den) = self.face_ray_cast(face, p0, &dir);
            if den >= 0.0 {
                (FAR_BEHIND, den)
            } else {
                (t, den)
            }
        };

        let mut t0 = -1.0e20;
        let t1 = 1.0e20;
        let mut tested = HashSet::default();
        let mut heap = BinaryHeap::new();
        let _ = tested.insert(start);
        let (t, den) = face_parameter(start);
        heap.push(WeightedValue::new((start, den), t));

        while let Some(entry) = heap.pop() {
            let (face, den) = entry.value;
            let mut best = true;

            if den < 0.0 {
                t0 = entry.cost.max(t0);
                if t0 > t1 {
                    return NO_HIT;
                }
            } else {
                best = false;
            }

            for twin in self.faces[face].twins {
                if !tested.insert(twin) {
                    continue;
                }

                let (t, den) = face_parameter(twin);

                if den < 0.0 {
                    if t > t0 {
                        best = false;
                    } else if (t - t0).abs() < AMBIGUOUS_PARAMETER {
                        return self.linear_ray_cast(p0, p1);
                    }
                }

                heap.push(WeightedValue::new((twin, den), t));
            }

            if best {
                if t0 >= 0.0 && t0 <= 1.0 {
                    *guess = Some(face);
                    return t0;
                }
                break;
            }
        }

        NO_HIT
    }
}
