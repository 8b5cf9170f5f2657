//! Heat method for geodesic distances.
//!
//! Computes geodesic distances using the heat method (Crane et al. 2013).
//! This gives smooth approximate geodesic distances by solving heat diffusion
//! followed by a Poisson equation:
//!
//! 1. Solve `(M - tL) u = u₀` for the heat `u` after time `t`.
//! 2. Compute `X = -∇u / |∇u|` on every face.
//! 3. Solve `L φ = ∇·X` for the distance `φ`.
//!
//! `M` is the lumped mass matrix and `L` the cotangent Laplacian. `L` has a
//! constant null space on every connected component, so the Poisson system is
//! solved with the lowest-index vertex of each component pinned to zero and
//! the result is shifted according to [`Baseline`].

use nalgebra::{DVector, Vector3};
use nalgebra_sparse::CscMatrix;
use tracing::debug;

use crate::algo::observe::{Stage, StageObserver};
use crate::algo::operators::{
    cotangent_laplacian, divergence, face_geometry, gradient, gradient_scales, mass_matrix,
    mean_edge_length, normalize_field, time_step, BoundaryPolicy, FaceGeometry,
    VanishingGradient,
};
use crate::algo::sparse::{heat_system, CholeskySolver, PinnedSolver};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

use super::GeodesicResult;

/// Which additive constant is removed from the Poisson solution.
///
/// The constant is chosen independently on each connected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Baseline {
    /// Shift so the smallest value over the sources is 0. Sources of a
    /// single-source query read exactly 0.
    #[default]
    Sources,
    /// Shift so the smallest value over the component is 0. All distances are
    /// non-negative.
    Minimum,
    /// No shift: the pinned vertex of each component reads 0.
    Raw,
}

/// Options for the heat method geodesic distance computation.
#[derive(Debug, Clone)]
pub struct HeatMethodOptions {
    /// Scale `m` of the diffusion time `t = m * h²`, where `h` is the mean
    /// edge length. Larger values smooth the result.
    pub diffusion_scale: f64,

    /// Explicit diffusion time. Overrides `diffusion_scale` when set.
    pub time_step: Option<f64>,

    /// Treatment of boundary edges in the Laplacian.
    pub boundary: BoundaryPolicy,

    /// Additive constant convention for the result.
    pub baseline: Baseline,

    /// Treatment of faces whose heat gradient cannot be normalized.
    pub vanishing_gradient: VanishingGradient,

    /// A face gradient is vanishing when it is no longer than this fraction
    /// of the face's largest heat value divided by its longest edge.
    pub gradient_tolerance: f64,
}

impl Default for HeatMethodOptions {
    fn default() -> Self {
        Self {
            diffusion_scale: 1.0,
            time_step: None,
            boundary: BoundaryPolicy::OneSided,
            baseline: Baseline::Sources,
            vanishing_gradient: VanishingGradient::Zero,
            gradient_tolerance: 1e-10,
        }
    }
}

impl HeatMethodOptions {
    /// Set the diffusion time scale `m`.
    pub fn with_diffusion_scale(mut self, m: f64) -> Self {
        self.diffusion_scale = m;
        self
    }

    /// Set custom time step (overrides auto-computation).
    pub fn with_time_step(mut self, t: f64) -> Self {
        self.time_step = Some(t);
        self
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the baseline convention.
    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set the vanishing gradient policy.
    pub fn with_vanishing_gradient(mut self, policy: VanishingGradient) -> Self {
        self.vanishing_gradient = policy;
        self
    }

    /// Set the relative vanishing gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tolerance: f64) -> Self {
        self.gradient_tolerance = tolerance;
        self
    }

    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] for a non-positive or
    /// non-finite diffusion scale or time step, or a negative or non-finite
    /// gradient tolerance.
    pub fn validate(&self) -> Result<()> {
        if !(self.diffusion_scale.is_finite() && self.diffusion_scale > 0.0) {
            return Err(MeshError::invalid_param(
                "diffusion_scale",
                self.diffusion_scale,
                "must be positive",
            ));
        }
        if let Some(t) = self.time_step {
            if !(t.is_finite() && t > 0.0) {
                return Err(MeshError::invalid_param("time_step", t, "must be positive"));
            }
        }
        if !(self.gradient_tolerance.is_finite() && self.gradient_tolerance >= 0.0) {
            return Err(MeshError::invalid_param(
                "gradient_tolerance",
                self.gradient_tolerance,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Prefactored heat method on a fixed mesh.
///
/// Construction builds the operators and factorizes both linear systems.
/// Each query then costs two triangular solves plus the per-face and
/// per-vertex passes, so one solver can answer many source sets.
///
/// # Example
///
/// ```
/// use geoheat::prelude::*;
/// use geoheat::algo::geodesic::{HeatMethodOptions, HeatSolver};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
///
/// let solver = HeatSolver::new(&mesh, &HeatMethodOptions::default()).unwrap();
/// let from_0 = solver.distances_from(&[VertexId::new(0)]).unwrap();
/// let from_2 = solver.distances_from(&[VertexId::new(2)]).unwrap();
///
/// assert_eq!(from_0.distance(VertexId::new(0)), 0.0);
/// assert_eq!(from_2.distance(VertexId::new(2)), 0.0);
/// ```
pub struct HeatSolver<'m, I: MeshIndex = u32> {
    mesh: &'m HalfEdgeMesh<I>,
    options: HeatMethodOptions,
    geometry: FaceGeometry,
    mass: DVector<f64>,
    laplacian: CscMatrix<f64>,
    mean_edge_length: f64,
    time_step: f64,
    heat: CholeskySolver,
    poisson: PinnedSolver,
    components: Vec<usize>,
    num_components: usize,
}

impl<'m, I: MeshIndex> HeatSolver<'m, I> {
    /// Build operators and factorize both systems.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidParameter`] if `options` fail validation
    /// - [`MeshError::EmptyMesh`] if the mesh has no faces
    /// - [`MeshError::ZeroVertexArea`] if a vertex has no incident area
    /// - [`MeshError::BoundaryVertex`] with [`BoundaryPolicy::Reject`] on an open mesh
    /// - [`MeshError::Factorization`] if either system cannot be factorized
    pub fn new(mesh: &'m HalfEdgeMesh<I>, options: &HeatMethodOptions) -> Result<Self> {
        Self::new_with_observer(mesh, options, &StageObserver::none())
    }

    /// Like [`new`](Self::new), reporting each setup stage to `observer`.
    pub fn new_with_observer(
        mesh: &'m HalfEdgeMesh<I>,
        options: &HeatMethodOptions,
        observer: &StageObserver,
    ) -> Result<Self> {
        options.validate()?;
        if mesh.num_faces() == 0 {
            return Err(MeshError::EmptyMesh);
        }

        let geometry = face_geometry(mesh);
        let mass = mass_matrix(mesh, &geometry.areas)?;
        observer.notify(&Stage::Mass(&mass));

        let laplacian = cotangent_laplacian(mesh, options.boundary)?;
        observer.notify(&Stage::Laplacian(&laplacian));

        let h = mean_edge_length(mesh);
        let t = options
            .time_step
            .unwrap_or_else(|| time_step(h, options.diffusion_scale));
        if !(t.is_finite() && t > 0.0) {
            return Err(MeshError::invalid_param("time_step", t, "must be positive"));
        }
        observer.notify(&Stage::TimeStep {
            mean_edge_length: h,
            time_step: t,
        });

        let heat_matrix = heat_system(&mass, &laplacian, t);
        observer.notify(&Stage::HeatSystem(&heat_matrix));
        let heat = CholeskySolver::factor(&heat_matrix, "heat")?;

        let (components, num_components) = mesh.connected_components();
        let mut pinned = vec![false; components.len()];
        let mut seen = vec![false; num_components];
        for (v, &c) in components.iter().enumerate() {
            if !seen[c] {
                seen[c] = true;
                pinned[v] = true;
            }
        }

        let poisson = PinnedSolver::factor(&-&laplacian, &pinned, "poisson")?;
        observer.notify(&Stage::PoissonSystem(poisson.matrix()));

        debug!(
            vertices = mesh.num_vertices(),
            faces = mesh.num_faces(),
            components = num_components,
            mean_edge_length = h,
            time_step = t,
            "Prepared heat method solver"
        );

        Ok(Self {
            mesh,
            options: options.clone(),
            geometry,
            mass,
            laplacian,
            mean_edge_length: h,
            time_step: t,
            heat,
            poisson,
            components,
            num_components,
        })
    }

    /// The mesh this solver was built for.
    pub fn mesh(&self) -> &'m HalfEdgeMesh<I> {
        self.mesh
    }

    /// The options this solver was built with.
    pub fn options(&self) -> &HeatMethodOptions {
        &self.options
    }

    /// Diagonal of the lumped mass matrix.
    pub fn mass(&self) -> &DVector<f64> {
        &self.mass
    }

    /// The cotangent Laplacian.
    pub fn laplacian(&self) -> &CscMatrix<f64> {
        &self.laplacian
    }

    /// Per-face areas and normals.
    pub fn face_geometry(&self) -> &FaceGeometry {
        &self.geometry
    }

    /// Mean edge length `h`.
    pub fn mean_edge_length(&self) -> f64 {
        self.mean_edge_length
    }

    /// Diffusion time `t`.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of connected components of the mesh.
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Distances from a unit heat impulse at each of `sources`.
    ///
    /// An empty source list gives every vertex an infinite distance.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] if a source is out of range,
    /// and propagates errors from [`distances`](Self::distances).
    pub fn distances_from(&self, sources: &[VertexId<I>]) -> Result<GeodesicResult<I>> {
        self.distances_from_with_observer(sources, &StageObserver::none())
    }

    /// Like [`distances_from`](Self::distances_from), reporting each stage to `observer`.
    pub fn distances_from_with_observer(
        &self,
        sources: &[VertexId<I>],
        observer: &StageObserver,
    ) -> Result<GeodesicResult<I>> {
        let n = self.mesh.num_vertices();
        let mut initial = DVector::zeros(n);
        for &s in sources {
            if s.index() >= n {
                return Err(MeshError::invalid_param(
                    "source",
                    s.index(),
                    "vertex index out of range",
                ));
            }
            initial[s.index()] = 1.0;
        }
        self.distances_with_observer(&initial, observer)
    }

    /// Distances from an arbitrary initial heat distribution.
    ///
    /// Vertices with a non-zero entry are the sources. Vertices in connected
    /// components without a source are unreachable (`f64::INFINITY`).
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidParameter`] if `initial` has the wrong length or
    ///   a non-finite entry
    /// - [`MeshError::VanishingGradient`] with [`VanishingGradient::Reject`]
    pub fn distances(&self, initial: &DVector<f64>) -> Result<GeodesicResult<I>> {
        self.distances_with_observer(initial, &StageObserver::none())
    }

    /// Like [`distances`](Self::distances), reporting each stage to `observer`.
    pub fn distances_with_observer(
        &self,
        initial: &DVector<f64>,
        observer: &StageObserver,
    ) -> Result<GeodesicResult<I>> {
        let n = self.mesh.num_vertices();
        if initial.len() != n {
            return Err(MeshError::invalid_param(
                "initial_condition",
                initial.len(),
                "length must equal the vertex count",
            ));
        }
        if let Some(&bad) = initial.iter().find(|x| !x.is_finite()) {
            return Err(MeshError::invalid_param(
                "initial_condition",
                bad,
                "entries must be finite",
            ));
        }

        let sources: Vec<usize> = initial
            .iter()
            .enumerate()
            .filter(|&(_, &x)| x != 0.0)
            .map(|(i, _)| i)
            .collect();
        if sources.is_empty() {
            debug!("Initial condition has no sources; every vertex is unreachable");
            return Ok(GeodesicResult::unreachable(n));
        }

        let heat = self.heat.solve(initial);
        observer.notify(&Stage::Heat(&heat));

        let grad = gradient(self.mesh, &self.geometry, &heat);
        observer.notify(&Stage::Gradient(&grad));

        let scales = gradient_scales(self.mesh, &heat);
        let direction: Vec<Vector3<f64>> = normalize_field(
            &grad,
            &scales,
            self.options.vanishing_gradient,
            self.options.gradient_tolerance,
        )?
        .into_iter()
        .map(|x| -x)
        .collect();
        observer.notify(&Stage::Direction(&direction));

        let div = divergence(self.mesh, &direction);
        observer.notify(&Stage::Divergence(&div));

        let phi = self.poisson.solve(&-&div);
        let distances = self.apply_baseline(&phi, &sources);
        observer.notify(&Stage::Distance(&distances));

        debug!(
            sources = sources.len(),
            baseline = ?self.options.baseline,
            "Computed heat method distances"
        );

        Ok(GeodesicResult::new(distances))
    }

    /// Shift each component by its baseline; components without a source
    /// become unreachable.
    fn apply_baseline(&self, phi: &DVector<f64>, sources: &[usize]) -> Vec<f64> {
        let mut has_source = vec![false; self.num_components];
        let mut offset = vec![f64::INFINITY; self.num_components];

        for &s in sources {
            has_source[self.components[s]] = true;
        }

        match self.options.baseline {
            Baseline::Sources => {
                for &s in sources {
                    let c = self.components[s];
                    offset[c] = offset[c].min(phi[s]);
                }
            }
            Baseline::Minimum => {
                for (v, &c) in self.components.iter().enumerate() {
                    offset[c] = offset[c].min(phi[v]);
                }
            }
            Baseline::Raw => offset.fill(0.0),
        }

        phi.iter()
            .zip(&self.components)
            .map(|(&p, &c)| if has_source[c] { p - offset[c] } else { f64::INFINITY })
            .collect()
    }
}

impl<I: MeshIndex> std::fmt::Debug for HeatSolver<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeatSolver")
            .field("vertices", &self.mesh.num_vertices())
            .field("faces", &self.mesh.num_faces())
            .field("time_step", &self.time_step)
            .field("components", &self.num_components)
            .finish_non_exhaustive()
    }
}

/// Compute geodesic distances using the heat method.
///
/// The heat method provides approximate geodesic distances that are smooth
/// and globally consistent. It's faster than exact methods for large meshes.
///
/// # Arguments
///
/// * `mesh` - The input triangle mesh
/// * `source` - The source vertex
/// * `options` - Algorithm options
///
/// # Returns
///
/// A `GeodesicResult` containing distances from the source to all vertices.
pub fn heat_method<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    source: VertexId<I>,
    options: &HeatMethodOptions,
) -> Result<GeodesicResult<I>> {
    heat_method_multiple(mesh, &[source], options)
}

/// Compute geodesic distances from multiple source vertices using the heat method.
///
/// All source vertices are treated as having distance 0. This is useful for
/// computing distance fields from a set of points.
///
/// # Arguments
///
/// * `mesh` - The input triangle mesh
/// * `sources` - The source vertices
/// * `options` - Algorithm options
///
/// # Returns
///
/// A `GeodesicResult` containing distances from the nearest source to all vertices.
pub fn heat_method_multiple<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    sources: &[VertexId<I>],
    options: &HeatMethodOptions,
) -> Result<GeodesicResult<I>> {
    if sources.is_empty() {
        return Ok(GeodesicResult::unreachable(mesh.num_vertices()));
    }

    HeatSolver::new(mesh, options)?.distances_from(sources)
}

/// Compute geodesic distances from an initial heat distribution.
///
/// `initial` has one entry per vertex; non-zero entries mark the sources.
pub fn heat_method_from_initial_condition<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    initial: &DVector<f64>,
    options: &HeatMethodOptions,
) -> Result<GeodesicResult<I>> {
    heat_method_with_observer(mesh, initial, options, &StageObserver::none())
}

/// Like [`heat_method_from_initial_condition`], reporting every stage to `observer`.
///
/// Pass [`StageObserver::tracing`] to log all intermediate results.
pub fn heat_method_with_observer<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    initial: &DVector<f64>,
    options: &HeatMethodOptions,
    observer: &StageObserver,
) -> Result<GeodesicResult<I>> {
    HeatSolver::new_with_observer(mesh, options, observer)?.distances_with_observer(initial, observer)
}
