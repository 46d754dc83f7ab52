use hacd3d::math::{Point, Real};
use hacd3d::transformation::hacd::{Hacd, HacdMesh, HacdParameters};

/// Two unit cubes joined by a thin bar.
fn dumbbell() -> HacdMesh {
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
    let points = [0.0, 1.0]
        .iter()
        .flat_map(|z| profile.iter().map(move |(x, y)| Point::new(*x, *y, *z)))
        .collect();
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

    HacdMesh::new(points, triangles).expect("the dumbbell mesh is valid")
}

fn main() {
    let params = HacdParameters {
        concavity: 0.01,
        max_hulls: 8,
        ..HacdParameters::default()
    };
    let hacd = Hacd::new(params);

    let mut progress = |phase: &str, fraction: Real| {
        println!("[{:>5.1}%] {}", fraction * 100.0, phase);
    };
    let hulls = hacd.decompose_with_progress(&dumbbell(), &mut progress);

    println!("Generated {} convex hulls:", hulls.len());
    for (i, hull) in hulls.iter().enumerate() {
        println!(
            "  hull {}: {} vertices, {} triangles, volume {:.4}",
            i,
            hull.vertices.len(),
            hull.indices.len(),
            hull.volume
        );
    }
}
