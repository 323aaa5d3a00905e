//! Seam, boundary and adjacency queries.
//!
//! An edge is a *boundary* when fewer than two faces use it, and a *seam*
//! when both faces use it but disagree on the surface point at either
//! endpoint. Both break UV continuity, so the predicates here treat them
//! together.

use super::container::Mesh;
use super::index::{EdgeId, FaceId, MeshIndex, NodeId, SurfacePointId};

impl<I: MeshIndex> Mesh<I> {
    /// Surface point that the face on `side` uses for endpoint `slot`.
    ///
    /// `None` if that side of the edge has no face.
    ///
    /// # Panics
    /// Panics if `e` is not a live edge, or if `side` or `slot` is greater
    /// than 1.
    #[track_caller]
    pub fn edge_vert(&self, e: EdgeId<I>, side: usize, slot: usize) -> Option<SurfacePointId<I>> {
        let edge = self.edge(e);
        let f = edge.face(side)?;
        let node = edge.nodes[slot];
        self.face(f)
            .verts
            .iter()
            .copied()
            .find(|&v| self.surface_point(v).node == node)
    }

    /// Corner of the face on `side` that is not an endpoint of the edge.
    ///
    /// # Panics
    /// Panics if `e` is not a live edge or `side` is greater than 1.
    #[track_caller]
    pub fn edge_other_vert_of_face(&self, e: EdgeId<I>, side: usize) -> Option<SurfacePointId<I>> {
        let edge = self.edge(e);
        let f = edge.face(side)?;
        self.face(f)
            .verts
            .iter()
            .copied()
            .find(|&v| !edge.has_node(self.surface_point(v).node))
    }

    /// Check whether an edge lies on a UV seam or on the mesh boundary.
    pub fn edge_is_on_seam_or_boundary(&self, e: EdgeId<I>) -> bool {
        self.edge_is_boundary(e) || self.edge_is_seam(e)
    }

    /// Check whether an edge has fewer than two faces.
    pub fn edge_is_boundary(&self, e: EdgeId<I>) -> bool {
        self.edge(e).face_count() < 2
    }

    /// Check whether both faces of an edge exist but use different surface
    /// points at one of its endpoints.
    pub fn edge_is_seam(&self, e: EdgeId<I>) -> bool {
        if self.edge_is_boundary(e) {
            return false;
        }
        (0..2).any(|slot| self.edge_vert(e, 0, slot) != self.edge_vert(e, 1, slot))
    }

    /// Check whether any edge of a face is on a seam or boundary.
    pub fn face_is_on_seam_or_boundary(&self, f: FaceId<I>) -> bool {
        self.face(f)
            .adj_e
            .iter()
            .any(|&e| self.edge_is_on_seam_or_boundary(e))
    }

    /// Check whether any edge at a node is on a seam or boundary.
    pub fn node_is_on_seam_or_boundary(&self, n: NodeId<I>) -> bool {
        self.node(n)
            .adj_e
            .iter()
            .any(|&e| self.edge_is_on_seam_or_boundary(e))
    }

    /// Check whether the node of a surface point is on a seam or boundary.
    ///
    /// Unlinked surface points report `false`.
    pub fn surface_point_is_on_seam_or_boundary(&self, v: SurfacePointId<I>) -> bool {
        let node = self.surface_point(v).node;
        self.get_node(node).is_some() && self.node_is_on_seam_or_boundary(node)
    }

    /// The surface point of `node` in the face that uses `other` across
    /// their shared edge.
    ///
    /// `None` when the nodes share no edge or no face on it uses `other`.
    pub fn adjacent(&self, node: NodeId<I>, other: SurfacePointId<I>) -> Option<SurfacePointId<I>> {
        let e = self.find_edge(node, self.get_surface_point(other)?.node)?;
        for side in 0..2 {
            for slot in 0..2 {
                if self.edge_vert(e, side, slot) == Some(other) {
                    return self.edge_vert(e, side, 1 - slot);
                }
            }
        }
        None
    }

    /// Iterate over edges shared by two faces with diverging surface points.
    pub fn seam_edges(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edge_ids().filter(|&e| self.edge_is_seam(e))
    }

    /// Iterate over edges with fewer than two faces.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edge_ids().filter(|&e| self.edge_is_boundary(e))
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::{Face, Mesh, Node, NodeId, SurfacePoint, SurfacePointId};

    /// Unit square split along the 0-2 diagonal. With `split` the second
    /// triangle gets its own surface points for nodes 0 and 2.
    fn square(split: bool) -> (Mesh, Vec<SurfacePointId>) {
        let mut mesh = Mesh::new();
        let mut verts = Vec::new();
        let mut nodes = Vec::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let n = mesh.add_node(Node::from_coords(x, y, 0.0));
            let v = mesh.add_surface_point(SurfacePoint::from_coords(x, y));
            mesh.connect(v, n).unwrap();
            verts.push(v);
            nodes.push(n);
        }
        mesh.add_face(Face::new(verts[0], verts[1], verts[2])).unwrap();

        let (a, c) = if split {
            let a = mesh.add_surface_point(SurfacePoint::from_coords(2.0, 0.0));
            let c = mesh.add_surface_point(SurfacePoint::from_coords(3.0, 1.0));
            mesh.connect(a, nodes[0]).unwrap();
            mesh.connect(c, nodes[2]).unwrap();
            verts.push(a);
            verts.push(c);
            (a, c)
        } else {
            (verts[0], verts[2])
        };
        mesh.add_face(Face::new(a, c, verts[3])).unwrap();
        (mesh, verts)
    }

    #[test]
    fn test_boundary_edges() {
        let (mesh, _) = square(false);
        assert_eq!(mesh.boundary_edges().count(), 4);
        assert_eq!(mesh.seam_edges().count(), 0);

        let diagonal = mesh.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        assert!(!mesh.edge_is_on_seam_or_boundary(diagonal));
        // Every node of an open square touches the boundary.
        for n in mesh.node_ids() {
            assert!(mesh.node_is_on_seam_or_boundary(n));
        }
    }

    #[test]
    fn test_seam_detection_flip() {
        let (joined, _) = square(false);
        let (split, _) = square(true);

        let d0 = joined.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        let d1 = split.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        assert!(!joined.edge_is_on_seam_or_boundary(d0));
        assert!(split.edge_is_on_seam_or_boundary(d1));
        assert_eq!(split.seam_edges().collect::<Vec<_>>(), vec![d1]);
        assert_eq!(split.node(NodeId::new(0)).surface_points().len(), 2);
    }

    #[test]
    fn test_one_split_corner_makes_seam() {
        let mut mesh = Mesh::<u32>::new();
        let mut verts = Vec::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let n = mesh.add_node(Node::from_coords(x, y, 0.0));
            let v = mesh.add_surface_point(SurfacePoint::from_coords(x, y));
            mesh.connect(v, n).unwrap();
            verts.push(v);
        }
        mesh.add_face(Face::new(verts[0], verts[1], verts[2])).unwrap();

        // Only node 2 gets a second surface point; node 0 stays shared.
        let c = mesh.add_surface_point(SurfacePoint::from_coords(3.0, 1.0));
        mesh.connect(c, NodeId::new(2)).unwrap();
        mesh.add_face(Face::new(verts[0], c, verts[3])).unwrap();

        let diagonal = mesh.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        assert!(mesh.edge_is_seam(diagonal));
        assert!(!mesh.edge_is_boundary(diagonal));
        assert_eq!(mesh.seam_edges().collect::<Vec<_>>(), vec![diagonal]);

        let slot0 = mesh.edge(diagonal).slot_of(NodeId::new(0)).unwrap();
        assert_eq!(mesh.edge_vert(diagonal, 0, slot0), mesh.edge_vert(diagonal, 1, slot0));
    }

    #[test]
    fn test_edge_vert_and_other() {
        let (mesh, verts) = square(true);
        let diagonal = mesh.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        let edge = mesh.edge(diagonal);
        let side0 = mesh.face(edge.face(0).unwrap());

        // Side 0 is the first triangle, built from the shared surface points.
        assert!(side0.surface_points().contains(&verts[1]));
        let slot0 = edge.slot_of(NodeId::new(0)).unwrap();
        assert_eq!(mesh.edge_vert(diagonal, 0, slot0), Some(verts[0]));
        assert_eq!(mesh.edge_vert(diagonal, 1, slot0), Some(verts[4]));
        assert_eq!(mesh.edge_other_vert_of_face(diagonal, 0), Some(verts[1]));
        assert_eq!(mesh.edge_other_vert_of_face(diagonal, 1), Some(verts[3]));
    }

    #[test]
    fn test_adjacent_across_seam() {
        let (mesh, verts) = square(true);
        // Node 2 as seen by the face that uses the split copy of node 0.
        assert_eq!(mesh.adjacent(NodeId::new(2), verts[4]), Some(verts[5]));
        assert_eq!(mesh.adjacent(NodeId::new(2), verts[0]), Some(verts[2]));
        // Nodes 1 and 3 share no edge.
        assert_eq!(mesh.adjacent(NodeId::new(1), verts[3]), None);
    }

    #[test]
    fn test_surface_point_on_boundary() {
        let (mesh, verts) = square(false);
        assert!(mesh.surface_point_is_on_seam_or_boundary(verts[1]));

        let mut lone = Mesh::<u32>::new();
        let v = lone.add_surface_point(SurfacePoint::from_coords(0.0, 0.0));
        assert!(!lone.surface_point_is_on_seam_or_boundary(v));
    }
}
