//! Half-edge connectivity for triangle meshes.
//!
//! Every undirected edge is stored as a pair of opposed half-edges. A
//! half-edge records its tail vertex, its twin, its successor and
//! predecessor in the face, and the face itself. Vertices keep one outgoing
//! half-edge and faces keep the half-edge leaving their corner 0, so the
//! corner numbering used by the operators is fixed by the input winding.
//!
//! Open edges get a faceless twin. Those twins are chained into boundary
//! loops, and a boundary vertex points at its faceless outgoing half-edge:
//! rotating from there visits every incident face exactly once before the walk
//! crosses the gap and returns to the start.

use std::collections::VecDeque;

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// Vertex record: a position and one outgoing half-edge.
///
/// On a boundary vertex the outgoing half-edge is the faceless one, which is
/// where [`HalfEdgeMesh::vertex_corners`] starts its sweep.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// Position in space.
    pub position: Point3<f64>,
    /// Outgoing half-edge, invalid for an isolated vertex.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Isolated vertex at `position`.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// Directed edge record.
///
/// `next` and `prev` walk the owning face in winding order. Half-edges with
/// an invalid `face` close the boundary loops.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// Tail vertex.
    pub origin: VertexId<I>,
    /// Same edge, opposite direction.
    pub twin: HalfEdgeId<I>,
    /// Successor in the face (or boundary loop).
    pub next: HalfEdgeId<I>,
    /// Predecessor in the face (or boundary loop).
    pub prev: HalfEdgeId<I>,
    /// Owning face; invalid on the boundary.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Half-edge with every link unset.
    pub fn new() -> Self {
        let unset = HalfEdgeId::invalid();
        Self {
            origin: VertexId::invalid(),
            twin: unset,
            next: unset,
            prev: unset,
            face: FaceId::invalid(),
        }
    }

    /// True for the faceless half-edges of a boundary loop.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangle record.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// Half-edge leaving corner 0; the other two follow via `next`.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Face whose corner-0 half-edge is `halfedge`.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

/// Triangle mesh in half-edge form.
///
/// Built once by [`build_from_triangles`](super::build_from_triangles); the
/// operators and solvers only read it.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Mesh with no elements.
    pub fn new() -> Self {
        Self {
            vertices: vec![],
            halfedges: vec![],
            faces: vec![],
        }
    }

    /// Empty mesh with room for the given element counts.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // 3 half-edges per face, plus slack for boundary twins.
        let halfedge_hint = 3 * num_faces + num_faces / 2;
        let mut mesh = Self::new();
        mesh.vertices.reserve(num_vertices);
        mesh.halfedges.reserve(halfedge_hint);
        mesh.faces.reserve(num_faces);
        mesh
    }

    /// Vertex count. Also the dimension of every operator matrix.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Half-edge count, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Triangle count.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Vertex record for `v`.
    #[inline]
    pub fn vertex(&self, v: VertexId<I>) -> &Vertex<I> {
        &self.vertices[v.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, v: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[v.index()]
    }

    /// Half-edge record for `he`.
    #[inline]
    pub fn halfedge(&self, he: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[he.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, he: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[he.index()]
    }

    /// Face record for `f`.
    #[inline]
    pub fn face(&self, f: FaceId<I>) -> &Face<I> {
        &self.faces[f.index()]
    }

    /// Position of `v`.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertices[v.index()].position
    }

    // Topology

    /// Opposite half-edge of `he`.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedges[he.index()].twin
    }

    /// Successor of `he` in its face or boundary loop.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedges[he.index()].next
    }

    /// Predecessor of `he` in its face or boundary loop.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedges[he.index()].prev
    }

    /// Tail vertex of `he`.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedges[he.index()].origin
    }

    /// Head vertex of `he`.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        let twin = self.twin(he);
        self.origin(twin)
    }

    /// Face owning `he`; invalid for a boundary half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedges[he.index()].face
    }

    /// True if `he` has no face.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        !self.face_of(he).is_valid()
    }

    /// True if `v` touches an open edge, or has no edges at all.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let out = self.vertex(v).halfedge;
        // Boundary vertices store their faceless half-edge.
        !out.is_valid() || self.is_boundary_halfedge(out)
    }

    /// Local corner index (0, 1 or 2) that `v` occupies in face `f`.
    ///
    /// Returns `None` if `v` is not a vertex of `f`.
    pub fn corner_index(&self, f: FaceId<I>, v: VertexId<I>) -> Option<usize> {
        self.face_triangle(f).iter().position(|&u| u == v)
    }

    /// Local corner index of the origin of an interior half-edge within its face.
    fn halfedge_corner(&self, he: HalfEdgeId<I>) -> usize {
        let he0 = self.face(self.face_of(he)).halfedge;
        if he == he0 {
            0
        } else if he == self.next(he0) {
            1
        } else {
            2
        }
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges), in angular order.
    ///
    /// The walk stops when it returns to its starting half-edge. It is also
    /// bounded by the total half-edge count, so corrupted connectivity can
    /// shorten the sequence but never make it infinite.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_corners(v).map(|(f, _)| f)
    }

    /// Iterate over the corners of a vertex's one-ring in angular order.
    ///
    /// Yields `(face, corner)` where `corner` is the local index (0, 1 or 2)
    /// the vertex occupies in `face`. The sequence is finite and can be
    /// restarted by calling this method again. On boundary vertices the gap
    /// is skipped, so the fan is reported from one boundary edge to the other.
    pub fn vertex_corners(
        &self,
        v: VertexId<I>,
    ) -> impl Iterator<Item = (FaceId<I>, usize)> + '_ {
        self.vertex_halfedges(v).filter_map(move |he| {
            let f = self.face_of(he);
            f.is_valid().then(|| (f, self.halfedge_corner(he)))
        })
    }

    /// Get the three vertices of a triangular face, in winding order.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face from its winding order.
    ///
    /// Degenerate (zero-area) faces have a zero normal.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Components ====================

    /// Label every vertex with the connected component it belongs to.
    ///
    /// Returns the per-vertex labels and the number of components. Labels are
    /// assigned in order of each component's lowest vertex index, so component
    /// `c` starts at the first vertex carrying label `c`.
    pub fn connected_components(&self) -> (Vec<usize>, usize) {
        let n = self.num_vertices();
        let mut labels = vec![usize::MAX; n];
        let mut count = 0;
        let mut queue = VecDeque::new();

        for seed in 0..n {
            if labels[seed] != usize::MAX {
                continue;
            }
            labels[seed] = count;
            queue.push_back(VertexId::<I>::new(seed));

            while let Some(v) = queue.pop_front() {
                for u in self.vertex_neighbors(v) {
                    if labels[u.index()] == usize::MAX {
                        labels[u.index()] = count;
                        queue.push_back(u);
                    }
                }
            }
            count += 1;
        }

        (labels, count)
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh connectivity is internally consistent.
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.origin(v.halfedge).index() != i {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::<I>::new(i);
            if !he.twin.is_valid() || self.twin(he.twin) != id {
                return false;
            }
            if he.next.is_valid() && self.prev(he.next) != id {
                return false;
            }
            if he.prev.is_valid() && self.next(he.prev) != id {
                return false;
            }
        }

        self.face_ids().all(|f| {
            let he0 = self.face(f).halfedge;
            he0.is_valid()
                && self.face_of(he0) == f
                && self.next(self.next(self.next(he0))) == he0
        })
    }
}

/// Iterator over outgoing half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;

        // he goes v -> w, twin(he) goes w -> v, and the half-edge after
        // twin(he) in its face leaves v again: the next outgoing half-edge.
        let next = self.mesh.next(self.mesh.twin(self.current));
        if !next.is_valid() || next == self.start {
            self.remaining = 0;
        }
        self.current = next;

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use crate::test_meshes;

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert_eq!(mesh.connected_components(), (vec![], 0));
    }

    #[test]
    fn test_add_vertex() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(mesh.num_vertices(), 2);
        assert_eq!(v0.index(), 0);
        assert_eq!(v1.index(), 1);
        assert!(!mesh.vertex(v0).halfedge.is_valid());
    }

    #[test]
    fn test_vertex_corners_closed() {
        let mesh = test_meshes::icosahedron();

        for v in mesh.vertex_ids() {
            let corners: Vec<_> = mesh.vertex_corners(v).collect();
            assert_eq!(corners.len(), 5, "icosahedron vertices have valence 5");

            for &(f, corner) in &corners {
                assert_eq!(mesh.face_triangle(f)[corner], v);
                assert_eq!(mesh.corner_index(f, v), Some(corner));
            }

            // Angular order: consecutive faces share an edge through v.
            for k in 0..corners.len() {
                let (fa, _) = corners[k];
                let (fb, _) = corners[(k + 1) % corners.len()];
                let a = mesh.face_triangle(fa);
                let b = mesh.face_triangle(fb);
                let shared = a.iter().filter(|u| b.contains(u)).count();
                assert_eq!(shared, 2);
            }
        }
    }

    #[test]
    fn test_vertex_corners_boundary() {
        let mesh = test_meshes::grid(2);

        // Corner vertex (0,0) touches both triangles of the first cell only
        // through the diagonal split: faces [0,1,4] and [0,4,3].
        let corners: Vec<_> = mesh.vertex_corners(VertexId::new(0)).collect();
        assert_eq!(corners.len(), 2);
        assert!(mesh.is_boundary_vertex(VertexId::new(0)));

        // Center vertex is interior with six incident faces.
        let center = VertexId::new(4);
        assert!(!mesh.is_boundary_vertex(center));
        assert_eq!(mesh.vertex_corners(center).count(), 6);
        assert_eq!(mesh.vertex_neighbors(center).count(), 6);
    }

    #[test]
    fn test_corner_index_missing_vertex() {
        let mesh = test_meshes::tetrahedron();
        let f = FaceId::new(3); // [1, 3, 2]
        assert_eq!(mesh.corner_index(f, VertexId::new(0)), None);
        assert_eq!(mesh.corner_index(f, VertexId::new(2)), Some(2));
    }

    #[test]
    fn test_face_geometry() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let f = FaceId::new(0);

        assert!((mesh.face_area(f) - 2.0).abs() < 1e-12);
        assert!((mesh.face_normal(f) - Vector3::z()).norm() < 1e-12);
        assert!((mesh.surface_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        assert_eq!(mesh.face_normal(FaceId::new(0)), Vector3::zeros());
    }

    #[test]
    fn test_connected_components() {
        // Two disjoint triangles plus an unreferenced vertex.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
            Point3::new(9.0, 9.0, 9.0),
        ];
        let faces = vec![[0, 1, 2], [3, 4, 5]];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        let (labels, count) = mesh.connected_components();
        assert_eq!(count, 3);
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1, 2]);
    }
}
