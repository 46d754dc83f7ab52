use crate::math::{Point, Real};

/// Removes from `points` every point that no triangle of `indices` refers to.
///
/// The kept points stay in their original order and `indices` is rewritten to match.
/// Returns the new index of each original point, `u32::MAX` for the removed ones.
pub fn remove_unused_points(points: &mut Vec<Point<Real>>, indices: &mut [[u32; 3]]) -> Vec<u32> {
    let mut remap = vec![u32::MAX; points.len()];

    for idx in indices.iter() {
        for i in idx {
            remap[*i as usize] = 0;
        }
    }

    let mut kept = 0;
    for (i, new_id) in remap.iter_mut().enumerate() {
        if *new_id == 0 {
            points[kept] = points[i];
            *new_id = kept as u32;
            kept += 1;
        }
    }
    points.truncate(kept);

    for idx in indices.iter_mut() {
        for i in idx {
            *i = remap[*i as usize];
        }
    }

    remap
}
