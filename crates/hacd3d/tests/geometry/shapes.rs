use hacd3d::math::{Point, Real};
use hacd3d::transformation::convex_hull3::ConvexHull;
use hacd3d::transformation::hacd::HacdMesh;

pub fn unit_cube_points() -> Vec<Point<Real>> {
    (0..8)
        .map(|i| {
            Point::new(
                (i & 1) as Real,
                ((i >> 1) & 1) as Real,
                ((i >> 2) & 1) as Real,
            )
        })
        .collect()
}

pub fn unit_cube() -> HacdMesh {
    let quads = [
        [0, 2, 3, 1],
        [4, 5, 7, 6],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 4, 6, 2],
        [1, 3, 7, 5],
    ];
    let triangles = quads
        .iter()
        .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
        .collect();
    HacdMesh::new(unit_cube_points(), triangles).unwrap()
}

pub fn icosahedron() -> HacdMesh {
    let phi = (1.0 + (5.0 as Real).sqrt()) / 2.0;
    let mut points = Vec::new();

    for a in [-1.0, 1.0] {
        for b in [-phi, phi] {
            points.push(Point::new(0.0, a, b));
            points.push(Point::new(a, b, 0.0));
            points.push(Point::new(b, 0.0, a));
        }
    }

    let (points, triangles) = ConvexHull::new(&points, 0.0, None).to_trimesh();
    HacdMesh::new(points, triangles).unwrap()
}

/// Two unit cubes joined by a thin bar: the profile below, extruded along `z` over `[0, 1]`.
///
/// ```text
///  ____          ____
/// |    |________|    |
/// |     ________     |
/// |____|        |____|
/// ```
pub fn dumbbell() -> HacdMesh {
    let profile = [
        (0.0, 0.0),
        (1.0, 0.0),
        (1.0, 0.4),
        (3.0, 0.4),
        (3.0, 0.0),
        (4.0, 0.0),
        (4.0, 1.0),
        (3.0, 1.0),
        (3.0, 0.6),
        (1.0, 0.6),
        (1.0, 1.0),
        (0.0, 1.0),
    ];
    let n = profile.len() as u32;
    let points: Vec<_> = [0.0, 1.0]
        .iter()
        .flat_map(|z| profile.iter().map(move |(x, y)| Point::new(*x, *y, *z)))
        .collect();

    // Convex pieces of the profile: left block, bar, right block.
    let cap = [
        [0, 1, 2],
        [0, 2, 9],
        [0, 9, 10],
        [0, 10, 11],
        [2, 3, 8],
        [2, 8, 9],
        [5, 6, 7],
        [5, 7, 8],
        [5, 8, 3],
        [5, 3, 4],
    ];

    let mut triangles = Vec::new();
    for [a, b, c] in cap {
        triangles.push([a, c, b]);
        triangles.push([a + n, b + n, c + n]);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        triangles.push([i, j, j + n]);
        triangles.push([i, j + n, i + n]);
    }

    HacdMesh::new(points, triangles).unwrap()
}
