//! Lumped (barycentric) mass matrix.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Build the diagonal mass matrix, stored as a vector.
///
/// `M[i,i]` is one third of the total area of the faces incident to vertex
/// `i`, so the entries sum to the surface area of the mesh. `face_areas` is
/// indexed by face (see [`face_areas`](super::face_areas)).
///
/// # Errors
///
/// Returns [`MeshError::ZeroVertexArea`] for the first vertex whose incident
/// area is zero: an unreferenced vertex, or one whose faces are all degenerate.
/// Such a vertex makes the heat system singular.
pub fn mass_matrix<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    face_areas: &[f64],
) -> Result<DVector<f64>> {
    let mass: Vec<f64> = (0..mesh.num_vertices())
        .into_par_iter()
        .map(|vi| {
            let area: f64 = mesh
                .vertex_faces(VertexId::new(vi))
                .map(|f| face_areas[f.index()])
                .sum();
            area / 3.0
        })
        .collect();

    if let Some(vertex) = mass.iter().position(|&m| m <= 0.0 || !m.is_finite()) {
        return Err(MeshError::ZeroVertexArea { vertex });
    }

    Ok(DVector::from_vec(mass))
}
