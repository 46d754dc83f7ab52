use super::plane_split::MAX_DECOMPOSITION_DEPTH;
use crate::math::Real;

/// Parameters controlling the HACD decomposition.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct HacdParameters {
    /// Maximum allowed concavity, relative to the diagonal of the input mesh.
    ///
    /// The merge tree is cut until every output cluster has a concavity below
    /// `concavity * diagonal`, or `max_hulls` is reached. The fast variant uses it
    /// as an absolute merge-cost budget instead.
    ///
    /// Default: 0.2
    /// Clamped to: `>= 1.0e-5`
    pub concavity: Real,
    /// Maximum number of convex hulls generated.
    ///
    /// Default: 256
    /// Clamped to: `>= 1`
    pub max_hulls: usize,
    /// Maximum number of vertices of each generated convex hull.
    ///
    /// Default: 64
    /// Clamped to: `>= 4`
    pub max_vertices_per_hull: usize,
    /// Length of the rays searching for faces facing each other, relative to the
    /// diagonal of the input mesh.
    ///
    /// Default: 0.2
    /// Clamped to: `[0.01, 1.0]`
    pub back_face_distance_factor: Real,
    /// Margin under which the two children of a merge tree node are considered as
    /// concave as their parent, in which case they are absorbed into it.
    ///
    /// Default: 1.0e-5
    pub absorb_epsilon: Real,
    /// Target number of hulls of the hull merging pass.
    ///
    /// Default: 256
    pub max_merge_hulls: usize,
    /// Hulls pairs whose combined volume is smaller than this percentage of the
    /// total volume are merged, whatever the hull count.
    ///
    /// Default: 0.0
    pub small_cluster_threshold: Real,
    /// Welds input vertices closer than `0.001` to each other.
    ///
    /// Default: true
    pub remove_duplicate_vertices: bool,
    /// Centers the input mesh and scales it to a unit box before the decomposition.
    ///
    /// The output hulls are mapped back to the original frame.
    ///
    /// Default: false
    pub normalize_input_mesh: bool,
    /// Runs the faster, non-hierarchical, per-edge clustering.
    ///
    /// Default: false
    pub use_fast_version: bool,
    /// Tolerance of the per-cluster convex hulls, relative to their diagonal.
    ///
    /// Default: 1.0e-5
    pub hull_distance_tolerance: Real,
    /// Replaces the hierarchical clustering by recursive plane splits, down to this
    /// depth, if it is not zero.
    ///
    /// Each piece is cut in half across its longest axis until it is convex enough,
    /// too small, or at this depth.
    ///
    /// Default: 0
    /// Clamped to: `<= 10`
    pub decomposition_depth: usize,
}

impl Default for HacdParameters {
    fn default() -> Self {
        Self {
            concavity: 0.2,
            max_hulls: 256,
            max_vertices_per_hull: 64,
            back_face_distance_factor: 0.2,
            absorb_epsilon: 1.0e-5,
            max_merge_hulls: 256,
            small_cluster_threshold: 0.0,
            remove_duplicate_vertices: true,
            normalize_input_mesh: false,
            use_fast_version: false,
            hull_distance_tolerance: 1.0e-5,
            decomposition_depth: 0,
        }
    }
}

impl HacdParameters {
    /// Copy of these parameters with every value brought back to its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            concavity: self.concavity.max(1.0e-5),
            max_hulls: self.max_hulls.max(1),
            max_vertices_per_hull: self.max_vertices_per_hull.max(4),
            back_face_distance_factor: self.back_face_distance_factor.clamp(0.01, 1.0),
            absorb_epsilon: self.absorb_epsilon.max(0.0),
            max_merge_hulls: self.max_merge_hulls.max(1),
            small_cluster_threshold: self.small_cluster_threshold.max(0.0),
            hull_distance_tolerance: self.hull_distance_tolerance.max(0.0),
            decomposition_depth: self.decomposition_depth.min(MAX_DECOMPOSITION_DEPTH),
            ..*self
        }
    }
}

#[cfg(test)]
mod test {
    use super::HacdParameters;

    #[test]
    fn clamping() {
        let params = HacdParameters {
            concavity: -1.0,
            max_hulls: 0,
            max_vertices_per_hull: 2,
            back_face_distance_factor: 3.0,
            decomposition_depth: 40,
            ..HacdParameters::default()
        }
        .clamped();

        assert_eq!(params.concavity, 1.0e-5);
        assert_eq!(params.max_hulls, 1);
        assert_eq!(params.max_vertices_per_hull, 4);
        assert_eq!(params.back_face_distance_factor, 1.0);
        assert_eq!(params.decomposition_depth, 10);
        assert_eq!(HacdParameters::default().hull_distance_tolerance, 1.0e-5);
        assert_eq!(HacdParameters::default().clamped(), HacdParameters::default());
    }
}
