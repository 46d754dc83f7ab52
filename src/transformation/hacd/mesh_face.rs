use crate::math::{Point, Real, Vector};
use crate::polyhedron::Polyhedron;
use crate::utils::hashmap::HashMap;
use smallvec::SmallVec;

/// A convex face of the preprocessed mesh, as seen by the clustering engines.
#[derive(Clone, Debug)]
pub(crate) struct MeshFace {
    /// The vertex indices, counterclockwise.
    pub vertices: SmallVec<[u32; 8]>,
    /// For each edge `vertices[i] → vertices[i + 1]`, the neighbor face and the slot
    /// of the reversed edge in it. `None` on the mesh boundary.
    pub neighbors: SmallVec<[Option<(usize, usize)>; 8]>,
    /// Unit normal (zero for degenerate faces).
    pub normal: Vector<Real>,
    pub area: Real,
    pub perimeter: Real,
}

impl MeshFace {
    /// The vertices of the edge starting at slot `i`.
    #[inline]
    pub fn edge(&self, i: usize) -> (u32, u32) {
        (self.vertices[i], self.vertices[(i + 1) % self.vertices.len()])
    }

    /// The triangle fan of this face, around its first vertex.
    pub fn fan(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let v0 = self.vertices[0];
        self.vertices[1..].windows(2).map(move |w| [v0, w[0], w[1]])
    }
}

/// Collects the interior faces of `mesh`, in [`Polyhedron::faces`] order.
pub(crate) fn extract_faces(mesh: &Polyhedron, points: &[Point<Real>]) -> Vec<MeshFace> {
    let handles = mesh.faces();
    let ids: HashMap<_, _> = handles
        .iter()
        .enumerate()
        .map(|(i, h)| (mesh.edge(*h).face, i))
        .collect();

    let mut faces: Vec<MeshFace> = handles
        .iter()
        .map(|handle| {
            let vertices = mesh.face_vertices(*handle);
            let normal = mesh.face_normal(*handle, points);
            let n = vertices.len();
            let perimeter = (0..n)
                .map(|i| {
                    na::distance(
                        &points[vertices[i] as usize],
                        &points[vertices[(i + 1) % n] as usize],
                    )
                })
                .sum();

            MeshFace {
                vertices,
                neighbors: SmallVec::new(),
                normal: normal.try_normalize(0.0).unwrap_or_else(Vector::zeros),
                area: normal.norm() / 2.0,
                perimeter,
            }
        })
        .collect();

    for (i, handle) in handles.iter().enumerate() {
        let neighbors = mesh
            .face_loop(*handle)
            .map(|h| {
                let twin = mesh.edge(h).twin?;
                let face = *ids.get(&mesh.edge(twin).face)?;
                let dest = mesh.edge(twin).origin;
                let slot = faces[face].vertices.iter().position(|v| *v == dest)?;
                Some((face, slot))
            })
            .collect();
        faces[i].neighbors = neighbors;
    }

    faces
}

#[cfg(test)]
mod test {
    use super::extract_faces;
    use crate::math::Point;
    use crate::polyhedron::Polyhedron;

    #[test]
    fn faces_of_a_tetrahedron() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ];
        let mut mesh = Polyhedron::new();
        for t in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]] {
            assert!(mesh.add_face(&t, None).is_some());
        }
        mesh.end_face();

        let faces = extract_faces(&mesh, &points);
        assert_eq!(faces.len(), 4);

        for (i, face) in faces.iter().enumerate() {
            assert_eq!(face.fan().count(), 1);
            for slot in 0..3 {
                let (a, b) = face.edge(slot);
                let (j, twin_slot) = face.neighbors[slot].unwrap();
                assert_ne!(i, j);
                assert_eq!(faces[j].edge(twin_slot), (b, a));
                assert_eq!(faces[j].neighbors[twin_slot], Some((i, slot)));
            }
        }

        let total_area: f64 = faces.iter().map(|f| f.area).sum();
        assert_relative_eq!(total_area, 1.5 + 3.0f64.sqrt() / 2.0, epsilon = 1.0e-12);
        assert_relative_eq!(faces[0].normal, -crate::math::Vector::z());
    }
}
