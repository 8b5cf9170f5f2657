//! Small meshes shared by the unit tests.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use nalgebra::Point3;

use crate::mesh::{build_from_triangles, HalfEdgeMesh};

/// Planar `n x n` grid of unit squares, each split along its (0,0)-(1,1) diagonal.
///
/// Vertex `(i, j)` has index `j * (n + 1) + i`.
pub fn grid(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = j * (n + 1) + i + 1;
            let v01 = (j + 1) * (n + 1) + i;
            let v11 = (j + 1) * (n + 1) + i + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

/// Regular tetrahedron with edge length 2, outward winding.
pub fn tetrahedron() -> HalfEdgeMesh {
    let s = FRAC_1_SQRT_2;
    let vertices = vec![
        Point3::new(1.0, 0.0, -s),
        Point3::new(-1.0, 0.0, -s),
        Point3::new(0.0, 1.0, s),
        Point3::new(0.0, -1.0, s),
    ];
    let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];

    build_from_triangles(&vertices, &faces).unwrap()
}

/// Regular icosahedron with edge length 2.
pub fn icosahedron() -> HalfEdgeMesh {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let vertices = vec![
        Point3::new(-1.0, phi, 0.0),
        Point3::new(1.0, phi, 0.0),
        Point3::new(-1.0, -phi, 0.0),
        Point3::new(1.0, -phi, 0.0),
        Point3::new(0.0, -1.0, phi),
        Point3::new(0.0, 1.0, phi),
        Point3::new(0.0, -1.0, -phi),
        Point3::new(0.0, 1.0, -phi),
        Point3::new(phi, 0.0, -1.0),
        Point3::new(phi, 0.0, 1.0),
        Point3::new(-phi, 0.0, -1.0),
        Point3::new(-phi, 0.0, 1.0),
    ];

    let faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    build_from_triangles(&vertices, &faces).unwrap()
}

/// Flat disk: a center vertex, a ring of `k` vertices at radius 1, and a ring
/// of `k` vertices at radius 2 rotated by half a step.
///
/// The center is vertex 0, the inner ring is `1..=k`, the outer ring is `k+1..=2k`.
pub fn disk(k: usize) -> HalfEdgeMesh {
    let mut vertices = vec![Point3::origin()];
    for i in 0..k {
        let a = 2.0 * PI * i as f64 / k as f64;
        vertices.push(Point3::new(a.cos(), a.sin(), 0.0));
    }
    for i in 0..k {
        let a = 2.0 * PI * (i as f64 + 0.5) / k as f64;
        vertices.push(Point3::new(2.0 * a.cos(), 2.0 * a.sin(), 0.0));
    }

    let mut faces = Vec::new();
    for i in 0..k {
        faces.push([0, 1 + i, 1 + (i + 1) % k]);
    }
    for i in 0..k {
        faces.push([1 + i, 1 + k + i, 1 + (i + 1) % k]);
    }

    build_from_triangles(&vertices, &faces).unwrap()
}
