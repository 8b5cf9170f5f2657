//! Mesh statistics used to choose the diffusion time.

use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Mean edge length, counting each edge once per incident face.
///
/// Equal to the sum of face half-perimeters divided by `1.5 * num_faces`.
/// Interior edges are counted twice and boundary edges once, which matches the
/// denominator on closed meshes. Returns 0 for a mesh without faces.
pub fn mean_edge_length<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> f64 {
    let num_faces = mesh.num_faces();
    if num_faces == 0 {
        return 0.0;
    }

    let half_perimeters: f64 = mesh
        .face_ids()
        .map(|f| {
            let [p0, p1, p2] = mesh.face_positions(f);
            0.5 * ((p1 - p0).norm() + (p2 - p1).norm() + (p0 - p2).norm())
        })
        .sum();

    half_perimeters / (1.5 * num_faces as f64)
}

/// Diffusion time `t = m * h^2` for mean edge length `h` and scale `m`.
#[inline]
pub fn time_step(mean_edge_length: f64, scale: f64) -> f64 {
    scale * mean_edge_length * mean_edge_length
}
