//! Geodesic distance computation on meshes.
//!
//! Distances along the surface are computed with the heat method (Crane,
//! Weischedel and Wardetzky 2013): diffuse heat from the sources for a short
//! time, turn the heat gradient into a unit direction field, and recover the
//! distance whose gradient best matches that field by a Poisson solve.
//!
//! Use [`HeatSolver`] when querying many source sets on one mesh: it
//! factorizes both linear systems once. The [`heat_method`] family of free
//! functions builds a fresh solver per call.
//!
//! # Example
//!
//! ```
//! use geoheat::prelude::*;
//! use geoheat::algo::geodesic::{heat_method, HeatMethodOptions};
//! use nalgebra::Point3;
//!
//! // A unit square split into two triangles.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let result = heat_method(&mesh, VertexId::new(0), &HeatMethodOptions::default()).unwrap();
//! assert_eq!(result.distance(VertexId::new(0)), 0.0);
//!
//! if let Some((v, d)) = result.farthest_vertex() {
//!     println!("Farthest vertex: {:?} at distance {}", v, d);
//! }
//! ```

mod heat;

use std::marker::PhantomData;

pub use heat::{
    heat_method, heat_method_from_initial_condition, heat_method_multiple,
    heat_method_with_observer, Baseline, HeatMethodOptions, HeatSolver,
};

use crate::mesh::{MeshIndex, VertexId};

/// Per-vertex distances from a source set.
///
/// Vertices in a connected component without any source hold
/// `f64::INFINITY`.
#[derive(Debug, Clone)]
pub struct GeodesicResult<I: MeshIndex = u32> {
    distances: Vec<f64>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> GeodesicResult<I> {
    pub(crate) fn new(distances: Vec<f64>) -> Self {
        Self {
            distances,
            _marker: PhantomData,
        }
    }

    pub(crate) fn unreachable(n: usize) -> Self {
        Self::new(vec![f64::INFINITY; n])
    }

    /// Distance at `v`, or `f64::INFINITY` if `v` is unreachable.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex of the mesh the result was computed on.
    #[inline]
    pub fn distance(&self, v: VertexId<I>) -> f64 {
        self.distances[v.index()]
    }

    /// Distances indexed by vertex.
    #[inline]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Take ownership of the distance vector.
    pub fn into_distances(self) -> Vec<f64> {
        self.distances
    }

    /// Number of vertices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// True for a result over a mesh with no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// The reachable vertex farthest from the sources, with its distance.
    ///
    /// Ties resolve to the lowest vertex index. `None` when nothing is
    /// reachable.
    pub fn farthest_vertex(&self) -> Option<(VertexId<I>, f64)> {
        self.reachable_iter()
            .fold(None, |best: Option<(VertexId<I>, f64)>, (v, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((v, d)),
            })
    }

    /// True when `v` shares a connected component with a source.
    #[inline]
    pub fn is_reachable(&self, v: VertexId<I>) -> bool {
        self.distance(v).is_finite()
    }

    /// How many vertices have a finite distance.
    pub fn reachable_count(&self) -> usize {
        self.reachable_iter().count()
    }

    /// `(vertex, distance)` pairs in vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, f64)> + '_ {
        (0..self.distances.len()).map(|i| (VertexId::new(i), self.distances[i]))
    }

    /// Like [`iter`](Self::iter), skipping unreachable vertices.
    pub fn reachable_iter(&self) -> impl Iterator<Item = (VertexId<I>, f64)> + '_ {
        self.iter().filter(|&(_, d)| d.is_finite())
    }
}
