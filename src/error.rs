//! Error types for geoheat.
//!
//! This module defines all error types used throughout the library.

use nalgebra_sparse::factorization::CholeskyError;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building a mesh or computing distances on it.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A directed edge is used by more than one face.
    ///
    /// This happens when an edge has more than two incident faces, or when two
    /// faces sharing the edge are wound inconsistently.
    #[error("edge ({v0}, {v1}) is shared by more than two faces or by inconsistently wound faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A vertex one-ring does not close and boundaries were rejected.
    #[error("vertex {vertex} lies on an open boundary")]
    BoundaryVertex {
        /// The boundary vertex.
        vertex: usize,
    },

    /// A vertex has zero dual-cell area (isolated, or all incident faces degenerate).
    #[error("vertex {vertex} has zero incident area")]
    ZeroVertexArea {
        /// The vertex index.
        vertex: usize,
    },

    /// A face has a zero-length gradient and cannot be normalized.
    #[error("gradient on face {face} vanishes and cannot be normalized")]
    VanishingGradient {
        /// The face index.
        face: usize,
    },

    /// A sparse Cholesky factorization failed.
    #[error("failed to factorize the {system} system: {source}")]
    Factorization {
        /// Which system was being factorized.
        system: &'static str,
        /// The underlying solver error.
        #[source]
        source: CholeskyError,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

/// Coarse classification of [`MeshError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: bad indices, empty meshes, out-of-range parameters.
    InvalidInput,
    /// Zero-area geometry or a vector field that cannot be normalized.
    DegenerateGeometry,
    /// Open or pinched one-rings, over-shared edges.
    NonManifoldTopology,
    /// A linear system could not be factorized.
    Factorization,
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::EmptyMesh
            | MeshError::InvalidVertexIndex { .. }
            | MeshError::DegenerateFace { .. }
            | MeshError::InvalidParameter { .. } => ErrorKind::InvalidInput,
            MeshError::ZeroVertexArea { .. } | MeshError::VanishingGradient { .. } => {
                ErrorKind::DegenerateGeometry
            }
            MeshError::NonManifold { .. }
            | MeshError::NonManifoldEdge { .. }
            | MeshError::BoundaryVertex { .. } => ErrorKind::NonManifoldTopology,
            MeshError::Factorization { .. } => ErrorKind::Factorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(MeshError::EmptyMesh.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            MeshError::ZeroVertexArea { vertex: 3 }.kind(),
            ErrorKind::DegenerateGeometry
        );
        assert_eq!(
            MeshError::BoundaryVertex { vertex: 0 }.kind(),
            ErrorKind::NonManifoldTopology
        );
        let err = MeshError::Factorization {
            system: "heat",
            source: CholeskyError::NotPositiveDefinite,
        };
        assert_eq!(err.kind(), ErrorKind::Factorization);
    }

    #[test]
    fn test_error_messages() {
        let err = MeshError::invalid_param("diffusion_scale", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: diffusion_scale = -1 (must be positive)"
        );

        let err = MeshError::Factorization {
            system: "poisson",
            source: CholeskyError::NotPositiveDefinite,
        };
        assert!(err.to_string().starts_with("failed to factorize the poisson system"));
    }
}
