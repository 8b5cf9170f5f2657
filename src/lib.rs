//! # Geoheat
//!
//! Geodesic distances on triangle meshes with the heat method.
//!
//! Geoheat builds the discrete differential operators of a triangle mesh
//! (lumped mass matrix, cotangent Laplacian, per-face gradient, per-vertex
//! divergence) on top of a half-edge data structure, and chains them into the
//! heat method of Crane, Weischedel and Wardetzky: a short heat diffusion from
//! the sources, a unit direction field from the heat gradient, and a Poisson
//! solve that recovers the distance.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Sparse Cholesky**: both linear systems are factorized once per mesh with
//!   `nalgebra-sparse`, and reused across queries by [`HeatSolver`](algo::geodesic::HeatSolver)
//! - **Open and disconnected meshes**: one-sided boundary weights, and
//!   per-component handling of the Poisson null space
//! - **Stage hooks**: every intermediate matrix and field can be observed
//!
//! ## Quick Start
//!
//! ```
//! use geoheat::prelude::*;
//! use nalgebra::Point3;
//!
//! // Regular tetrahedron
//! let s = std::f64::consts::FRAC_1_SQRT_2;
//! let vertices = vec![
//!     Point3::new(1.0, 0.0, -s),
//!     Point3::new(-1.0, 0.0, -s),
//!     Point3::new(0.0, 1.0, s),
//!     Point3::new(0.0, -1.0, s),
//! ];
//! let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let result = heat_method(&mesh, VertexId::new(0), &HeatMethodOptions::default()).unwrap();
//!
//! assert_eq!(result.distance(VertexId::new(0)), 0.0);
//! for v in 1..4 {
//!     assert!(result.distance(VertexId::new(v)) > 0.0);
//! }
//! ```
//!
//! ## Mesh Traversal
//!
//! The half-edge structure enables efficient traversal of mesh elements:
//!
//! ```
//! use geoheat::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let faces = vec![[0, 1, 2]];
//! # let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let v = VertexId::new(0);
//!
//! // Faces around a vertex, with the corner the vertex occupies in each
//! for (face, corner) in mesh.vertex_corners(v) {
//!     assert_eq!(mesh.face_triangle(face)[corner], v);
//! }
//!
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

#[cfg(test)]
mod test_meshes;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use geoheat::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::geodesic::{
        heat_method, heat_method_from_initial_condition, heat_method_multiple,
        heat_method_with_observer, Baseline, GeodesicResult, HeatMethodOptions, HeatSolver,
    };
    pub use crate::algo::observe::{Stage, StageObserver};
    pub use crate::algo::operators::{BoundaryPolicy, VanishingGradient};
    pub use crate::error::{ErrorKind, MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex,
        VertexId,
    };
}

// Re-export the linear algebra crates used in the public API
pub use nalgebra;
pub use nalgebra_sparse;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_pipeline() {
        let mesh = crate::test_meshes::icosahedron();
        assert_eq!(mesh.num_halfedges(), 60);
        assert!(mesh.is_valid());

        let result = heat_method(&mesh, VertexId::new(0), &HeatMethodOptions::default()).unwrap();
        assert_eq!(result.reachable_count(), 12);
        assert_eq!(result.distance(VertexId::new(0)), 0.0);
    }
}
