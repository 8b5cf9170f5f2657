//! Geometry processing algorithms.
//!
//! - [`operators`]: mass matrix, cotangent Laplacian, gradient, divergence
//! - [`sparse`]: sparse system assembly and Cholesky solves
//! - [`geodesic`]: heat method geodesic distances
//! - [`observe`]: stage-boundary hooks for inspecting intermediate results

pub mod geodesic;
pub mod observe;
pub mod operators;
pub mod sparse;
