//! Per-triangle geometry shared by the differential operators.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex};

/// Relative size below which a triangle is treated as flat: twice its area
/// against its longest squared edge, or `|a × b|` against `|a| |b|`.
pub const FLAT_RATIO: f64 = 64.0 * f64::EPSILON;

/// Cotangent of the angle between two vectors.
///
/// Returns 0 for (numerically) parallel or zero-length input, so flat
/// triangles contribute nothing to cotangent weights.
#[inline]
pub fn cotangent(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let sin = a.cross(b).norm();
    if sin <= FLAT_RATIO * a.norm() * b.norm() {
        0.0
    } else {
        a.dot(b) / sin
    }
}

/// Area of a triangle with side lengths `a`, `b`, `c` (Heron's formula).
///
/// Uses Kahan's ordering, which stays accurate for needle-shaped triangles.
/// Side lengths that violate the triangle inequality through rounding give 0.
pub fn heron_area(a: f64, b: f64, c: f64) -> f64 {
    let mut s = [a, b, c];
    s.sort_by(|x, y| y.total_cmp(x));
    let [a, b, c] = s;

    let product = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    0.25 * product.max(0.0).sqrt()
}

/// Per-face areas and unit normals.
///
/// Computed once per mesh and passed explicitly to the operators that need
/// them; nothing is cached on the mesh itself.
#[derive(Debug, Clone)]
pub struct FaceGeometry {
    /// Area of each face.
    pub areas: Vec<f64>,
    /// Unit normal of each face (zero for degenerate faces).
    pub normals: Vec<Vector3<f64>>,
}

impl FaceGeometry {
    /// Number of faces.
    #[inline]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// True if there are no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Total area of all faces.
    pub fn total_area(&self) -> f64 {
        self.areas.iter().sum()
    }
}

/// Compute the area of every face from its edge lengths.
///
/// Flat faces (see [`FLAT_RATIO`]) get exactly 0. Heron's formula alone
/// leaves them with an area on the order of the square root of the rounding
/// error in the edge lengths.
pub fn face_areas<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Vec<f64> {
    (0..mesh.num_faces())
        .into_par_iter()
        .map(|fi| {
            let [p0, p1, p2] = mesh.face_positions(FaceId::new(fi));
            let (e0, e1, e2) = (p1 - p0, p2 - p1, p0 - p2);

            let longest = e0.norm_squared().max(e1.norm_squared()).max(e2.norm_squared());
            if e0.cross(&e2).norm() <= FLAT_RATIO * longest {
                return 0.0;
            }
            heron_area(e0.norm(), e1.norm(), e2.norm())
        })
        .collect()
}

/// Compute areas and unit normals for every face.
pub fn face_geometry<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> FaceGeometry {
    let areas = face_areas(mesh);
    let normals = (0..mesh.num_faces())
        .into_par_iter()
        .map(|fi| mesh.face_normal(FaceId::new(fi)))
        .collect();

    FaceGeometry { areas, normals }
}
