//! Discrete differential operators on triangle meshes.
//!
//! These are the building blocks of the heat method, exposed individually so
//! they can be reused and tested on their own:
//!
//! - [`face_geometry`] / [`face_areas`]: per-face area and unit normal
//! - [`mass_matrix`]: lumped vertex areas
//! - [`cotangent_laplacian`]: symmetric cotangent Laplacian
//! - [`mean_edge_length`] / [`time_step`]: diffusion time selection
//! - [`gradient`] / [`gradient_scales`] / [`normalize_field`]: per-face gradient and
//!   unit direction field
//! - [`divergence`]: per-vertex integrated divergence
//!
//! Sign conventions: the Laplacian has positive off-diagonals and a negative
//! diagonal, and `divergence(gradient(u)) == L * u` up to rounding.
//!
//! # Example
//!
//! ```
//! use geoheat::algo::operators::{cotangent_laplacian, face_areas, mass_matrix, BoundaryPolicy};
//! use geoheat::mesh::{build_from_triangles, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//!
//! let mass = mass_matrix(&mesh, &face_areas(&mesh)).unwrap();
//! assert!((mass.sum() - 0.5).abs() < 1e-12);
//!
//! let laplacian = cotangent_laplacian(&mesh, BoundaryPolicy::OneSided).unwrap();
//! assert_eq!(laplacian.nrows(), 3);
//! ```

mod divergence;
mod geometry;
mod gradient;
mod laplacian;
mod mass;
mod stats;

pub use divergence::divergence;
pub use geometry::{cotangent, face_areas, face_geometry, heron_area, FaceGeometry, FLAT_RATIO};
pub use gradient::{gradient, gradient_scales, normalize_field, VanishingGradient};
pub use laplacian::{cotangent_laplacian, BoundaryPolicy};
pub use mass::mass_matrix;
pub use stats::{mean_edge_length, time_step};
