//! Half-edge triangle meshes.
//!
//! [`HalfEdgeMesh`] stores each triangle as three half-edges linked to their
//! twins, with boundary loops closed by faceless half-edges. The geodesic code
//! asks it three things, each in constant time per step:
//!
//! - the corners around a vertex, in angular order ([`HalfEdgeMesh::vertex_corners`])
//! - the vertices of a face, in winding order ([`HalfEdgeMesh::face_triangle`])
//! - whether an edge or vertex lies on the boundary
//!
//! Elements are addressed by [`VertexId`], [`HalfEdgeId`] and [`FaceId`]. All
//! three are generic over a [`MeshIndex`] (`u16`, `u32` or `u64`); a vertex's
//! dense index is its row in every operator matrix.
//!
//! Meshes come from an indexed triangle list. [`build_from_triangles`] rejects
//! input that is not an oriented 2-manifold (with or without boundary):
//!
//! ```
//! use geoheat::mesh::{build_from_triangles, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let positions = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh<u16> = build_from_triangles(&positions, &[[0, 1, 2], [2, 1, 3]]).unwrap();
//! assert_eq!(mesh.num_faces(), 2);
//!
//! // Two faces reusing the directed edge 0 -> 1 disagree on orientation.
//! assert!(build_from_triangles::<u32>(&positions, &[[0, 1, 2], [0, 1, 3]]).is_err());
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
