//! Cotangent Laplacian.
//!
//! The matrix is assembled row by row from each vertex's one-ring. For an
//! edge `(i, j)` with opposite angles `α` and `β`,
//!
//! ```text
//! L[i,j] = L[j,i] = (cot α + cot β) / 2
//! L[i,i] = -Σ_{j≠i} L[i,j]
//! ```
//!
//! so every row sums to zero and `L` is negative semidefinite on a mesh
//! without obtuse-angle pathologies. Both cotangents of an edge are computed
//! from the same three points regardless of which endpoint's row is being
//! built, so the matrix is exactly symmetric.

use nalgebra_sparse::{CooMatrix, CscMatrix};
use rayon::prelude::*;
use tracing::debug;

use super::geometry::cotangent;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// How edges with only one incident face are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Boundary edges use the single cotangent available (half the usual
    /// weight). This gives natural (Neumann) boundary conditions.
    #[default]
    OneSided,
    /// Fail with [`MeshError::BoundaryVertex`] if the mesh has any boundary.
    Reject,
}

/// Cotangent of the angle opposite `he` in its face, or 0 for a boundary half-edge.
fn opposite_cotangent<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, he: HalfEdgeId<I>) -> f64 {
    if mesh.is_boundary_halfedge(he) {
        return 0.0;
    }
    let a = mesh.position(mesh.origin(he));
    let b = mesh.position(mesh.dest(he));
    let o = mesh.position(mesh.origin(mesh.prev(he)));
    cotangent(&(a - o), &(b - o))
}

/// Off-diagonal entries of one row, in angular order.
fn laplacian_row<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Vec<(usize, f64)> {
    mesh.vertex_halfedges(v)
        .map(|he| {
            let w = 0.5 * (opposite_cotangent(mesh, he) + opposite_cotangent(mesh, mesh.twin(he)));
            (mesh.dest(he).index(), w)
        })
        .collect()
}

/// Build the cotangent Laplacian of a triangle mesh.
///
/// # Errors
///
/// With [`BoundaryPolicy::Reject`], returns [`MeshError::BoundaryVertex`] for
/// the lowest-index vertex whose one-ring does not close.
pub fn cotangent_laplacian<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    boundary: BoundaryPolicy,
) -> Result<CscMatrix<f64>> {
    let n = mesh.num_vertices();

    if boundary == BoundaryPolicy::Reject {
        if let Some(v) = mesh.vertex_ids().find(|&v| mesh.is_boundary_vertex(v)) {
            return Err(MeshError::BoundaryVertex { vertex: v.index() });
        }
    }

    let rows: Vec<Vec<(usize, f64)>> = (0..n)
        .into_par_iter()
        .map(|vi| laplacian_row(mesh, VertexId::new(vi)))
        .collect();

    let nnz = rows.iter().map(|r| r.len() + 1).sum();
    let mut coo = CooMatrix::new(n, n);
    coo.reserve(nnz);
    for (i, row) in rows.iter().enumerate() {
        let mut diagonal = 0.0;
        for &(j, w) in row {
            coo.push(i, j, w);
            diagonal -= w;
        }
        coo.push(i, i, diagonal);
    }

    let laplacian = CscMatrix::from(&coo);
    debug!(
        vertices = n,
        nnz = laplacian.nnz(),
        ?boundary,
        "Built cotangent Laplacian"
    );

    Ok(laplacian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_meshes;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn dense(mesh: &HalfEdgeMesh, boundary: BoundaryPolicy) -> DMatrix<f64> {
        DMatrix::from(&cotangent_laplacian(mesh, boundary).unwrap())
    }

    #[test]
    fn test_rows_sum_to_zero() {
        for mesh in [
            test_meshes::tetrahedron(),
            test_meshes::icosahedron(),
            test_meshes::grid(3),
            test_meshes::disk(8),
        ] {
            let l = dense(&mesh, BoundaryPolicy::OneSided);
            for i in 0..l.nrows() {
                let scale = l[(i, i)].abs().max(1.0);
                assert!(l.row(i).sum().abs() <= 1e-9 * scale, "row {} sum {}", i, l.row(i).sum());
            }
        }
    }

    #[test]
    fn test_symmetric() {
        let l = dense(&test_meshes::disk(8), BoundaryPolicy::OneSided);
        assert_eq!(l, l.transpose());

        let l = dense(&test_meshes::icosahedron(), BoundaryPolicy::Reject);
        assert_eq!(l, l.transpose());
    }

    #[test]
    fn test_equilateral_weights() {
        // Every angle is 60 degrees: each edge weight is cot(60) = 1/sqrt(3).
        let l = dense(&test_meshes::tetrahedron(), BoundaryPolicy::Reject);
        let w = 1.0 / 3.0_f64.sqrt();

        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { -3.0 * w } else { w };
                assert_relative_eq!(l[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_grid_weights() {
        // Interior vertex of a regular right-triangle grid is the usual
        // 5-point stencil: axis neighbours 1, diagonal neighbours 0.
        let mesh = test_meshes::grid(2);
        let l = dense(&mesh, BoundaryPolicy::OneSided);

        assert_relative_eq!(l[(4, 4)], -4.0, epsilon = 1e-12);
        for j in [1, 3, 5, 7] {
            assert_relative_eq!(l[(4, j)], 1.0, epsilon = 1e-12);
        }
        for j in [0, 8] {
            assert_relative_eq!(l[(4, j)], 0.0, epsilon = 1e-12);
        }

        // Boundary edge 0-1 has a single 45 degree angle opposite: weight 1/2.
        assert_relative_eq!(l[(0, 1)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_semidefinite() {
        let mesh = test_meshes::icosahedron();
        let l = dense(&mesh, BoundaryPolicy::OneSided);
        let eigen = l.symmetric_eigenvalues();
        assert!(eigen.iter().all(|&e| e <= 1e-10));
        // One zero eigenvalue per connected component.
        assert_eq!(eigen.iter().filter(|e| e.abs() < 1e-10).count(), 1);
    }

    #[test]
    fn test_reject_boundary() {
        let mesh = test_meshes::grid(2);
        let err = cotangent_laplacian(&mesh, BoundaryPolicy::Reject).unwrap_err();
        assert!(matches!(err, MeshError::BoundaryVertex { vertex: 0 }));
    }
}
