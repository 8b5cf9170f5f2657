//! Per-face gradient of a vertex function, and field normalization.

use nalgebra::{DVector, Vector3};
use rayon::prelude::*;
use tracing::warn;

use super::geometry::FaceGeometry;
use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex};

/// What to do with face vectors too short to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VanishingGradient {
    /// Replace them with the zero vector. The face then contributes nothing
    /// to the divergence.
    #[default]
    Zero,
    /// Fail with [`MeshError::VanishingGradient`].
    Reject,
}

/// Gradient of the piecewise-linear function `u` on every face.
///
/// On face `f = (v0, v1, v2)` with unit normal `n` and area `A`:
///
/// ```text
/// ∇u = 1/(2A) Σ_k u[v_k] (n × e_k),   e_k = p[k+2] - p[k+1]
/// ```
///
/// The result lies in the face plane. Faces with zero area get a zero
/// gradient. A constant `u` gives zero on every face.
pub fn gradient<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    geometry: &FaceGeometry,
    u: &DVector<f64>,
) -> Vec<Vector3<f64>> {
    (0..mesh.num_faces())
        .into_par_iter()
        .map(|fi| {
            let area = geometry.areas[fi];
            if area <= 0.0 {
                return Vector3::zeros();
            }

            let f = FaceId::<I>::new(fi);
            let vertices = mesh.face_triangle(f);
            let p = mesh.face_positions(f);
            let n = &geometry.normals[fi];

            let mut g = Vector3::zeros();
            for k in 0..3 {
                let e = p[(k + 2) % 3] - p[(k + 1) % 3];
                g += n.cross(&e) * u[vertices[k].index()];
            }
            g / (2.0 * area)
        })
        .collect()
}

/// Reference magnitude for the gradient on each face: the largest `|u|` at
/// its corners divided by its longest edge.
///
/// A gradient much shorter than this means `u` is numerically constant on
/// the face. The reference is local, so faces far from the heat source,
/// where `u` itself is tiny, are judged against their own values.
pub fn gradient_scales<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, u: &DVector<f64>) -> Vec<f64> {
    (0..mesh.num_faces())
        .into_par_iter()
        .map(|fi| {
            let f = FaceId::<I>::new(fi);
            let [p0, p1, p2] = mesh.face_positions(f);
            let longest = (p1 - p0).norm().max((p2 - p1).norm()).max((p0 - p2).norm());
            if longest <= 0.0 {
                return 0.0;
            }

            let peak = mesh
                .face_triangle(f)
                .iter()
                .map(|v| u[v.index()].abs())
                .fold(0.0, f64::max);
            peak / longest
        })
        .collect()
}

/// Scale every vector of a face field to unit length.
///
/// Vector `f` is vanishing if it is zero, not finite, or no longer than
/// `tolerance * scales[f]` (see [`gradient_scales`]). Vanishing vectors are
/// handled according to `policy`; every other vector is normalized, however
/// short.
///
/// # Errors
///
/// With [`VanishingGradient::Reject`], returns [`MeshError::VanishingGradient`]
/// for the first vanishing face.
///
/// # Panics
///
/// Panics if `scales` and `field` differ in length.
pub fn normalize_field(
    field: &[Vector3<f64>],
    scales: &[f64],
    policy: VanishingGradient,
    tolerance: f64,
) -> Result<Vec<Vector3<f64>>> {
    assert_eq!(field.len(), scales.len(), "one scale per face");

    let normalized: Vec<Option<Vector3<f64>>> = field
        .par_iter()
        .zip(scales.par_iter())
        .map(|(g, &scale)| {
            let norm = g.norm();
            (norm.is_finite() && norm > 0.0 && norm > tolerance * scale).then(|| g / norm)
        })
        .collect();

    if let Some(face) = normalized.iter().position(Option::is_none) {
        if policy == VanishingGradient::Reject {
            return Err(MeshError::VanishingGradient { face });
        }
        warn!(
            faces = normalized.iter().filter(|x| x.is_none()).count(),
            total = field.len(),
            "Zeroing vanishing gradient vectors"
        );
    }

    Ok(normalized
        .into_iter()
        .map(|x| x.unwrap_or_else(Vector3::zeros))
        .collect())
}
