//! Half-edge meshes from indexed triangle lists.
//!
//! [`build_from_triangles`] accepts oriented 2-manifolds, with or without
//! boundary. Anything else is an error: indices past the vertex list, a vertex
//! repeated within a face, an edge with three or more faces, neighbours with
//! opposite winding, and vertices where several fans meet.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a [`HalfEdgeMesh`] from positions and counter-clockwise triangles.
///
/// Face `i` of the input becomes `FaceId(i)` and its first vertex becomes
/// corner 0. Vertices that no face references are kept without a one-ring.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] for an empty face list
/// - [`MeshError::InvalidVertexIndex`] or [`MeshError::DegenerateFace`] for a
///   malformed face
/// - [`MeshError::NonManifoldEdge`] when a directed edge appears twice
/// - [`MeshError::NonManifold`] for pinched vertices
///
/// # Example
/// ```
/// use geoheat::mesh::{build_from_triangles, FaceId, HalfEdgeMesh, VertexId};
/// use nalgebra::Point3;
///
/// // A fan of three triangles around vertex 0.
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(-1.0, 0.0, 0.0),
///     Point3::new(0.0, -1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.vertex_corners(VertexId::new(0)).count(), 3);
/// assert_eq!(mesh.face_triangle(FaceId::new(1))[0], VertexId::new(0));
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    faces
        .iter()
        .enumerate()
        .try_for_each(|(fi, face)| check_face(fi, face, vertices.len()))?;

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices
        .iter()
        .map(|&pos| mesh.add_vertex(pos))
        .collect();

    // Directed edge (v0, v1) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> =
        HashMap::with_capacity(faces.len() * 3);

    for (fi, face) in faces.iter().enumerate() {
        let face_id = FaceId::<I>::new(fi);
        let base = mesh.num_halfedges();
        let ids = [
            HalfEdgeId::<I>::new(base),
            HalfEdgeId::<I>::new(base + 1),
            HalfEdgeId::<I>::new(base + 2),
        ];

        mesh.faces.push(Face::new(ids[0]));

        for k in 0..3 {
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[face[k]],
                twin: HalfEdgeId::invalid(),
                next: ids[(k + 1) % 3],
                prev: ids[(k + 2) % 3],
                face: face_id,
            });
            mesh.vertex_mut(vertex_ids[face[k]]).halfedge = ids[k];

            let (a, b) = (face[k], face[(k + 1) % 3]);
            if edge_map.insert((a, b), ids[k]).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
        }
    }

    // Link twins in half-edge order so boundary half-edge ids are reproducible.
    let num_interior = mesh.num_halfedges();
    for i in 0..num_interior {
        let he = HalfEdgeId::<I>::new(i);
        let a = mesh.origin(he).index();
        let b = mesh.origin(mesh.next(he)).index();

        if let Some(&twin) = edge_map.get(&(b, a)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            let boundary_he = HalfEdgeId::<I>::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[b],
                twin: he,
                ..HalfEdge::new()
            });
            mesh.halfedge_mut(he).twin = boundary_he;
        }
    }

    link_boundary_loops(&mut mesh)?;
    fix_boundary_vertex_halfedges(&mut mesh);
    check_vertex_fans(&mesh, faces)?;

    Ok(mesh)
}

fn check_face(fi: usize, face: &[usize; 3], num_vertices: usize) -> Result<()> {
    if let Some(&vertex) = face.iter().find(|&&v| v >= num_vertices) {
        return Err(MeshError::InvalidVertexIndex { face: fi, vertex });
    }
    let [a, b, c] = *face;
    if a == b || b == c || a == c {
        return Err(MeshError::DegenerateFace { face: fi });
    }
    Ok(())
}

/// Chain the faceless half-edges into boundary loops.
///
/// Fails if a vertex has more than one outgoing boundary half-edge, which
/// means two separate fans touch at that vertex.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::with_capacity(boundary_hes.len());
    for &he in &boundary_hes {
        let origin = mesh.origin(he).index();
        if outgoing.insert(origin, he).is_some() {
            return Err(MeshError::NonManifold {
                details: format!("vertex {} has more than one boundary fan", origin),
            });
        }
    }

    for &he in &boundary_hes {
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }

    Ok(())
}

/// Point every boundary vertex at its faceless outgoing half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let boundary = mesh
            .vertex_halfedges(vid)
            .find(|&he| mesh.is_boundary_halfedge(he));
        if let Some(he) = boundary {
            mesh.vertex_mut(vid).halfedge = he;
        }
    }
}

/// Check that every vertex's incident faces form a single fan.
///
/// The one-ring walk from the stored half-edge must reach every face that
/// references the vertex. A vertex where two closed fans meet passes the
/// boundary checks but fails this one.
fn check_vertex_fans<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, faces: &[[usize; 3]]) -> Result<()> {
    let mut incident = vec![0usize; mesh.num_vertices()];
    for face in faces {
        for &v in face {
            incident[v] += 1;
        }
    }

    for (vi, &expected) in incident.iter().enumerate() {
        if expected == 0 {
            continue;
        }
        let walked = mesh.vertex_corners(VertexId::new(vi)).count();
        if walked != expected {
            return Err(MeshError::NonManifold {
                details: format!(
                    "vertex {} has {} incident faces but its one-ring reaches {}",
                    vi, expected, walked
                ),
            });
        }
    }

    Ok(())
}

/// Positions and triangles of `mesh`, in element order.
///
/// Inverse of [`build_from_triangles`] for any mesh it accepted.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();

    (vertices, faces)
}
