use hacd3d::math::Point;
use hacd3d::polyhedron::{Polyhedron, TopologyError};

#[test]
fn duplicate_faces_are_rejected() {
    let mut mesh = Polyhedron::new();
    assert!(mesh.add_face(&[0, 1, 2], None).is_some());
    let edges = mesh.edge_count();

    assert!(mesh.add_face(&[0, 1, 2], None).is_none());
    assert!(mesh.add_face(&[1, 2, 0], None).is_none());
    assert_eq!(mesh.edge_count(), edges);
    assert_eq!(
        mesh.try_add_face(&[2, 0, 1], None),
        Err(TopologyError::DuplicateEdge(2, 0))
    );
}

#[test]
fn tetrahedron_topology() {
    let points = [
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
        Point::new(0.0, 0.0, 1.0),
    ];
    let mut mesh = Polyhedron::new();
    for face in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]] {
        assert!(mesh.add_face(&face, Some(&[10, 11, 12][..])).is_some());
    }
    mesh.end_face();

    assert!(mesh.check_topology().is_ok());
    assert_eq!(mesh.face_count(), 4);
    assert_eq!(mesh.edge_count(), 12);
    assert_eq!(mesh.connected_surfaces().len(), 1);

    // No face was merged: the tetrahedron is convex but not flat.
    assert_eq!(mesh.convex_partition(&points), 0);

    mesh.clear_user_data();
    assert!(mesh.edges().all(|(_, e)| e.user_data == e.origin as u64));
}
