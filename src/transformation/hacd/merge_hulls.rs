use super::decomposition::DecomposedHull;
use super::progress::{report, ProgressCallback};
use super::HacdParameters;
use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::transformation::convex_hull3::ConvexHull;
use crate::utils::hashmap::HashMap;
use crate::utils::SortedPair;

/// Hulls with a volume below this are discarded by [`merge_hulls`].
const MIN_HULL_VOLUME: Real = 1.0e-5;
/// Growth ratio of the boxes used to find the hulls close enough to be merged.
const AABB_INFLATION: Real = 0.1;

struct HullEntry {
    id: usize,
    hull: DecomposedHull,
    aabb: Aabb,
}

impl HullEntry {
    fn new(id: usize, hull: DecomposedHull) -> Self {
        let aabb = hull.aabb().inflated(AABB_INFLATION);
        Self { id, hull, aabb }
    }
}

/// The convex hull of the vertices of two hulls, unless their boxes are disjoint.
fn combined_hull(a: &HullEntry, b: &HullEntry, max_vertices: Option<usize>) -> Option<ConvexHull> {
    if !a.aabb.intersects(&b.aabb) {
        return None;
    }

    let mut cloud = a.hull.vertices.clone();
    cloud.extend_from_slice(&b.hull.vertices);
    let hull = ConvexHull::new(&cloud, 0.0, max_vertices);
    (!hull.is_empty()).then_some(hull)
}

fn combined_volume(a: &HullEntry, b: &HullEntry) -> Real {
    combined_hull(a, b, None)
        .map(|h| h.volume_and_surface_area().0.abs())
        .unwrap_or(0.0)
}

/// Merges nearby hulls until there are at most `params.max_merge_hulls` of them.
///
/// The pair whose union has the smallest convex hull is merged first. Pairs whose
/// union takes less than `params.small_cluster_threshold` percent of the total
/// volume are merged even if the hull count is already small enough. Hulls with
/// a negligible volume are dropped.
pub(crate) fn merge_hulls(
    hulls: Vec<DecomposedHull>,
    params: &HacdParameters,
    progress: &mut dyn ProgressCallback,
) -> Vec<DecomposedHull> {
    report(progress, "Gathering Input Hulls", 0.0);
    let mut entries: Vec<_> = hulls
        .into_iter()
        .filter(|h| h.volume > MIN_HULL_VOLUME)
        .enumerate()
        .map(|(id, hull)| HullEntry::new(id, hull))
        .collect();
    let mut next_id = entries.len();
    let mut total_volume: Real = entries.iter().map(|e| e.hull.volume).sum();
    let mut volumes: HashMap<SortedPair<usize>, Real> = HashMap::default();
    let merge_count = entries.len();
    let mut merges = 0;

    loop {
        report(progress, "Merging", merges as Real / merge_count.max(1) as Real);

        let mut missing = Vec::new();
        for i in 0..entries.len() {
            for j in i + 1..entries.len() {
                let key = SortedPair::new(entries[i].id, entries[j].id);
                if !volumes.contains_key(&key) {
                    missing.push((key, i, j));
                }
            }
        }

        #[cfg(feature = "parallel")]
        let computed: Vec<_> = {
            use rayon::prelude::*;
            missing
                .par_iter()
                .map(|(key, i, j)| (*key, combined_volume(&entries[*i], &entries[*j])))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let computed: Vec<_> = missing
            .iter()
            .map(|(key, i, j)| (*key, combined_volume(&entries[*i], &entries[*j])))
            .collect();
        volumes.extend(computed);

        let mut best: Option<(usize, usize, Real)> = None;
        for i in 0..entries.len() {
            for j in i + 1..entries.len() {
                let key = SortedPair::new(entries[i].id, entries[j].id);
                let volume = volumes.get(&key).copied().unwrap_or(0.0);

                if volume > 0.0 && best.map(|b| volume < b.2).unwrap_or(true) {
                    best = Some((i, j, volume));
                }
            }
        }

        let Some((i, j, volume)) = best else {
            break;
        };

        let small = volume / total_volume * 100.0 < params.small_cluster_threshold;
        if !small && entries.len() <= params.max_merge_hulls {
            break;
        }

        let key = SortedPair::new(entries[i].id, entries[j].id);
        let Some(hull) = combined_hull(&entries[i], &entries[j], Some(params.max_vertices_per_hull))
        else {
            let _ = volumes.insert(key, 0.0);
            continue;
        };

        // `i < j`: remove the last one first.
        let b = entries.remove(j);
        let a = entries.remove(i);
        let merged = DecomposedHull::from_convex_hull(&hull);
        total_volume += merged.volume - a.hull.volume - b.hull.volume;
        volumes.retain(|k, _| !k.contains(&a.id) && !k.contains(&b.id));
        entries.insert(0, HullEntry::new(next_id, merged));
        next_id += 1;
        merges += 1;

        log::trace!("Merged hulls {} and {} into hull {}.", a.id, b.id, next_id - 1);
    }

    report(progress, "Gathering Merged Hulls", 0.0);
    log::debug!("Hull merging: {} merges, {} hulls left.", merges, entries.len());
    entries.into_iter().map(|e| e.hull).collect()
}
