use super::{ConvexHull, ConvexHullError};
use crate::math::Real;

impl ConvexHull {
    /// Checks that this hull is closed, consistently linked and convex.
    ///
    /// Every twin link must be symmetric and join the same pair of vertices, every vertex
    /// must lie at most `tolerance` above the plane of every face, and the vertex, edge and
    /// face counts must be those of a topological sphere. An empty hull is valid.
    pub fn check(&self, tolerance: Real) -> Result<(), ConvexHullError> {
        if self.faces.is_empty() {
            return Ok(());
        }

        for (id, face) in self.faces.iter().enumerate() {
            for (slot, twin) in face.twins.iter().enumerate() {
                let Some(adj) = self.faces.get(*twin) else {
                    return Err(ConvexHullError::TwinMismatch(id));
                };
                let Some(back) = adj.twin_slot(id) else {
                    return Err(ConvexHullError::TwinMismatch(id));
                };
                let (a, b) = face.edge(slot);

                if adj.edge(back) != (b, a) {
                    return Err(ConvexHullError::TwinMismatch(id));
                }
            }
        }

        for (id, face) in self.faces.iter().enumerate() {
            let Some(normal) = face.normal(&self.vertices).try_normalize(0.0) else {
                continue;
            };
            let origin = &self.vertices[face.indices[0] as usize];

            for (vertex, pt) in self.vertices.iter().enumerate() {
                let distance = normal.dot(&(pt - origin));

                if distance > tolerance {
                    return Err(ConvexHullError::NonConvex {
                        face: id,
                        vertex: vertex as u32,
                        distance,
                    });
                }
            }
        }

        let num_edges = self.faces.len() * 3 / 2;
        if self.vertices.len() + self.faces.len() != num_edges + 2 {
            return Err(ConvexHullError::EulerCharacteristic);
        }

        Ok(())
    }
}
