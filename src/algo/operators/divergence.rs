//! Integrated divergence of a face vector field.

use nalgebra::{DVector, Vector3};
use rayon::prelude::*;

use super::geometry::cotangent;
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Divergence of the face field `x` at every vertex.
///
/// For each corner of vertex `v` in face `f`, with `e1` and `e2` the two
/// edges leaving `v` and `θ1`, `θ2` the angles opposite them:
///
/// ```text
/// div[v] += ½ (cot θ1 · e1·X_f + cot θ2 · e2·X_f)
/// ```
///
/// Summed over the corners of `v` in one-ring order. Faces whose vector is
/// zero contribute nothing.
pub fn divergence<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, x: &[Vector3<f64>]) -> DVector<f64> {
    let values: Vec<f64> = (0..mesh.num_vertices())
        .into_par_iter()
        .map(|vi| {
            mesh.vertex_corners(VertexId::<I>::new(vi))
                .map(|(f, corner)| {
                    let p = mesh.face_positions(f);
                    let p0 = p[corner];
                    let p1 = p[(corner + 1) % 3];
                    let p2 = p[(corner + 2) % 3];
                    let xf = &x[f.index()];

                    let e1 = p1 - p0;
                    let e2 = p2 - p0;
                    let cot1 = cotangent(&(p0 - p2), &(p1 - p2));
                    let cot2 = cotangent(&(p0 - p1), &(p2 - p1));

                    0.5 * (cot1 * e1.dot(xf) + cot2 * e2.dot(xf))
                })
                .sum()
        })
        .collect();

    DVector::from_vec(values)
}
