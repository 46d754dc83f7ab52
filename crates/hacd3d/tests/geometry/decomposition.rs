use crate::shapes::{dumbbell, icosahedron, unit_cube};
use hacd3d::math::{Point, Real};
use hacd3d::transformation::convex_hull3::ConvexHull;
use hacd3d::transformation::hacd::{self, Hacd, HacdMesh, HacdParameters};

fn check_hulls(hulls: &[hacd::DecomposedHull]) {
    for hull in hulls {
        let rebuilt = ConvexHull::new(&hull.vertices, 0.0, None);
        assert!(!rebuilt.is_empty());
        assert!(rebuilt.check(1.0e-7).is_ok());
        assert_relative_eq!(rebuilt.volume_and_surface_area().0, hull.volume, epsilon = 1.0e-7);
    }
}

#[test]
fn convex_mesh_gives_its_hull() {
    let hulls = hacd::decompose(&unit_cube(), 0.1, 16, 64);
    assert_eq!(hulls.len(), 1);
    assert_eq!(hulls[0].vertices.len(), 8);
    assert_eq!(hulls[0].indices.len(), 12);
    assert_relative_eq!(hulls[0].volume, 1.0, epsilon = 1.0e-9);
}

#[test]
fn single_hull_icosahedron() {
    let hulls = hacd::decompose(&icosahedron(), 0.1, 1, 64);
    assert_eq!(hulls.len(), 1);
    assert_eq!(hulls[0].vertices.len(), 12);
    assert_eq!(hulls[0].indices.len(), 20);
    check_hulls(&hulls);
}

#[test]
fn dumbbell_is_split() {
    let mesh = dumbbell();
    let params = HacdParameters {
        concavity: 0.01,
        max_hulls: 16,
        ..HacdParameters::default()
    };

    let hulls = Hacd::new(params).decompose(&mesh);
    assert!(hulls.len() >= 2);
    assert!(hulls.len() <= 16);
    check_hulls(&hulls);

    // Every hull lies within the bounding box of the mesh.
    let aabb = mesh.aabb();
    for pt in hulls.iter().flat_map(|h| h.vertices.iter()) {
        assert!(aabb.loosened(1.0e-9).contains_local_point(pt));
    }

    // A single hull is the hull of the whole mesh.
    let single = Hacd::new(HacdParameters {
        max_hulls: 1,
        ..params
    })
    .decompose(&mesh);
    assert_eq!(single.len(), 1);
    assert_relative_eq!(single[0].volume, 4.0, epsilon = 1.0e-9);
}

#[test]
fn fast_version_splits_the_dumbbell() {
    let params = HacdParameters {
        concavity: 0.01,
        max_hulls: 16,
        use_fast_version: true,
        ..HacdParameters::default()
    };

    let hulls = Hacd::new(params).decompose(&dumbbell());
    assert!(hulls.len() >= 2);
    check_hulls(&hulls);
}

#[test]
fn merge_pass_bounds_the_hull_count() {
    let params = HacdParameters {
        concavity: 0.01,
        max_hulls: 16,
        max_merge_hulls: 1,
        ..HacdParameters::default()
    };

    let hulls = Hacd::new(params).decompose(&dumbbell());
    assert_eq!(hulls.len(), 1);
    assert_relative_eq!(hulls[0].volume, 4.0, epsilon = 1.0e-9);
}

#[test]
fn duplicated_vertices_are_welded() {
    // The cube with every triangle using its own copies of the vertices.
    let cube = unit_cube();
    let mut points = Vec::new();
    let mut triangles = Vec::new();

    for t in cube.triangles() {
        let base = points.len() as u32;
        points.extend(t.iter().map(|i| {
            cube.points()[*i as usize] + hacd3d::math::Vector::repeat(1.0e-5)
        }));
        triangles.push([base, base + 1, base + 2]);
    }

    let mut mesh = HacdMesh::new(points, triangles).unwrap();
    let remap = mesh.weld_vertices(hacd::WELD_DISTANCE);
    assert_eq!(remap.len(), 36);
    assert_eq!(mesh.points().len(), 8);

    let welded = mesh.clone();
    let remap = mesh.weld_vertices(hacd::WELD_DISTANCE);
    assert_eq!(remap, (0..8).collect::<Vec<u32>>());
    assert_eq!(mesh, welded);

    let hulls = Hacd::new(HacdParameters::default()).decompose(&mesh);
    assert_eq!(hulls.len(), 1);
    assert_relative_eq!(hulls[0].volume, 1.0, epsilon = 1.0e-9);
}

#[test]
fn progress_is_reported_in_order() {
    let mut phases: Vec<(String, Real)> = Vec::new();
    let params = HacdParameters {
        concavity: 0.01,
        small_cluster_threshold: 0.5,
        ..HacdParameters::default()
    };

    let _ = Hacd::new(params).decompose_with_progress(&dumbbell(), &mut |phase: &str, fraction| {
        phases.push((phase.to_string(), fraction))
    });

    assert!(phases.iter().all(|(_, f)| (0.0..=1.0).contains(f)));
    assert_eq!(phases.first().map(|p| p.0.as_str()), Some("Starting HACD"));
    assert_eq!(phases.last().map(|p| p.0.as_str()), Some("Gathering Merged Hulls"));

    let position = |name: &str| phases.iter().position(|p| p.0 == name).unwrap();
    assert!(position("Begin HACD") < position("Creating Connectivity Graph"));
    assert!(position("Collapse Clusters") < position("Creating Partition Mesh"));
    assert!(position("Gathering Input Hulls") < position("Merging"));
}

#[test]
fn degenerate_input_gives_no_hull() {
    let mesh = HacdMesh::new(
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap();

    assert!(hacd::decompose(&mesh, 0.1, 8, 32).is_empty());
}

fn split_params(depth: usize) -> HacdParameters {
    HacdParameters {
        decomposition_depth: depth,
        ..HacdParameters::default()
    }
}

#[test]
fn plane_splits_leave_convex_meshes_whole() {
    for depth in [1, 3, 10] {
        let hulls = Hacd::new(split_params(depth)).decompose(&unit_cube());
        assert_eq!(hulls.len(), 1);
        assert_relative_eq!(hulls[0].volume, 1.0, epsilon = 1.0e-9);
    }
}

#[test]
fn plane_splits_cut_the_dumbbell_bar() {
    let mesh = dumbbell();
    let hulls = Hacd::new(split_params(1)).decompose(&mesh);
    assert_eq!(hulls.len(), 2);
    check_hulls(&hulls);

    // Each half holds one block and half of the bar.
    let total: Real = hulls.iter().map(|h| h.volume).sum();
    assert!(total >= 2.4 - 1.0e-9);
    assert!(total <= 4.0 + 1.0e-9);
    for hull in &hulls {
        let aabb = hull.aabb();
        assert_relative_eq!(aabb.maxs.x - aabb.mins.x, 2.0, epsilon = 1.0e-6);
    }
}

#[test]
fn plane_split_hull_count_is_bounded_by_depth() {
    let mesh = dumbbell();
    let aabb = mesh.aabb();

    for depth in 1..=4 {
        let hulls = Hacd::new(split_params(depth)).decompose(&mesh);
        assert!(hulls.len() >= 2);
        assert!(hulls.len() <= 1 << depth);
        check_hulls(&hulls);

        for pt in hulls.iter().flat_map(|h| h.vertices.iter()) {
            assert!(aabb.loosened(1.0e-6).contains_local_point(pt));
        }
    }
}

#[test]
fn plane_splits_stop_at_a_single_merged_hull() {
    let params = HacdParameters {
        max_merge_hulls: 1,
        ..split_params(4)
    };
    let hulls = Hacd::new(params).decompose(&dumbbell());
    assert_eq!(hulls.len(), 1);
    assert_relative_eq!(hulls[0].volume, 4.0, epsilon = 1.0e-9);
}

#[test]
fn plane_splits_report_progress() {
    let mut phases: Vec<String> = Vec::new();
    let mut record = |phase: &str, fraction: Real| {
        assert!((0.0..=1.0).contains(&fraction));
        if phases.last().map(|p| p != phase).unwrap_or(true) {
            phases.push(phase.to_string());
        }
    };
    let _ = Hacd::new(split_params(2)).decompose_with_progress(&dumbbell(), &mut record);

    assert_eq!(phases[0], "Starting HACD");
    assert_eq!(phases.last().map(|p| p.as_str()), Some("SplittingMesh"));
}
