//! Mesh fixtures for the integration tests.

#![allow(dead_code)]

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use geoheat::prelude::*;
use nalgebra::Point3;

pub fn grid_data(n: usize) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    (vertices, faces)
}

pub fn grid(n: usize) -> HalfEdgeMesh {
    let (vertices, faces) = grid_data(n);
    build_from_triangles(&vertices, &faces).unwrap()
}

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

pub fn icosahedron_data() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
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
    (vertices, faces)
}

pub fn icosahedron() -> HalfEdgeMesh {
    let (vertices, faces) = icosahedron_data();
    build_from_triangles(&vertices, &faces).unwrap()
}

/// Center vertex 0, inner ring `1..=k` at radius 1, outer ring at radius 2.
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

/// Check that geodesic distance never decreases as Euclidean distance from
/// `source` grows. Vertices whose Euclidean distances differ by less than
/// `eps` are not compared.
pub fn assert_monotone(mesh: &HalfEdgeMesh, result: &GeodesicResult, source: VertexId, eps: f64) {
    let origin = *mesh.position(source);
    let euclid: Vec<f64> = mesh
        .vertex_ids()
        .map(|v| (mesh.position(v) - origin).norm())
        .collect();

    for a in mesh.vertex_ids() {
        for b in mesh.vertex_ids() {
            if euclid[a.index()] + eps < euclid[b.index()] {
                assert!(
                    result.distance(a) <= result.distance(b) + 1e-9,
                    "{:?} (euclid {}, geodesic {}) vs {:?} (euclid {}, geodesic {})",
                    a,
                    euclid[a.index()],
                    result.distance(a),
                    b,
                    euclid[b.index()],
                    result.distance(b)
                );
            }
        }
    }
}
