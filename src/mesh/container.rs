//! The mesh container.
//!
//! [`Mesh`] owns four insertion-ordered arenas (surface points, nodes, edges,
//! faces) and is the only place where adjacency is mutated. Every `add_*`
//! and `remove_*` keeps the links between the four kinds consistent.
//!
//! # Index stability
//!
//! Removing an element leaves a vacant slot so ids held by the caller stay
//! valid across edits. [`Mesh::set_indices`] compacts the arenas and
//! renumbers everything densely, returning an [`IndexRemap`].

use std::fmt::Debug;

use nalgebra::Point3;
use tracing::{debug, trace, warn};

use super::elements::{exclude, include, Edge, Face, Node, SurfacePoint};
use super::index::{EdgeId, FaceId, MeshIndex, NodeId, SurfacePointId};
use crate::error::{MeshError, Result};
use crate::geometry::{self, Transform};

/// A triangle mesh with explicit node/surface-point/edge/face adjacency.
#[derive(Debug, Clone)]
pub struct Mesh<I: MeshIndex = u32> {
    pub(crate) surface_points: Vec<Option<SurfacePoint<I>>>,
    pub(crate) nodes: Vec<Option<Node<I>>>,
    pub(crate) edges: Vec<Option<Edge<I>>>,
    pub(crate) faces: Vec<Option<Face<I>>>,

    num_surface_points: usize,
    num_nodes: usize,
    num_edges: usize,
    num_faces: usize,

    transform: Transform,
}

impl<I: MeshIndex> Default for Mesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[track_caller]
fn live<'a, T, D: Debug>(slots: &'a [Option<T>], index: usize, id: D) -> &'a T {
    match slots.get(index) {
        Some(Some(item)) => item,
        _ => panic!("{:?} does not refer to a live element", id),
    }
}

#[track_caller]
fn live_mut<'a, T, D: Debug>(slots: &'a mut [Option<T>], index: usize, id: D) -> &'a mut T {
    match slots.get_mut(index) {
        Some(Some(item)) => item,
        _ => panic!("{:?} does not refer to a live element", id),
    }
}

fn invalid_id<D: Debug>(id: D) -> MeshError {
    MeshError::InvalidId(format!("{:?}", id))
}

fn dense_remap<T, Id: From<usize> + Default>(slots: &[Option<T>]) -> Vec<Id> {
    let mut next = 0;
    slots
        .iter()
        .map(|slot| {
            if slot.is_some() {
                next += 1;
                Id::from(next - 1)
            } else {
                Id::default()
            }
        })
        .collect()
}

fn live_ids<'a, T, Id: From<usize> + 'a>(slots: &'a [Option<T>]) -> impl Iterator<Item = Id> + 'a {
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_some())
        .map(|(i, _)| Id::from(i))
}

fn live_items<'a, T, Id: From<usize> + 'a>(slots: &'a [Option<T>]) -> impl Iterator<Item = (Id, &'a T)> + 'a {
    slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.as_ref().map(|item| (Id::from(i), item)))
}

impl<I: MeshIndex> Mesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_nodes: usize, num_faces: usize) -> Self {
        // A closed triangle mesh has E = 3F/2
        let num_edges = num_faces * 3 / 2 + num_faces / 4;

        Self {
            surface_points: Vec::with_capacity(num_nodes),
            nodes: Vec::with_capacity(num_nodes),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
            num_surface_points: 0,
            num_nodes: 0,
            num_edges: 0,
            num_faces: 0,
            transform: Transform::identity(),
        }
    }

    // ==================== Accessors ====================

    /// Number of live surface points.
    #[inline]
    pub fn num_surface_points(&self) -> usize {
        self.num_surface_points
    }

    /// Number of live nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of live edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.num_faces
    }

    /// Check if the mesh has no nodes and no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0 && self.num_faces == 0
    }

    /// Get a surface point by ID.
    ///
    /// # Panics
    /// Panics if `id` does not refer to a live surface point.
    #[inline]
    #[track_caller]
    pub fn surface_point(&self, id: SurfacePointId<I>) -> &SurfacePoint<I> {
        live(&self.surface_points, id.index(), id)
    }

    /// Get a mutable surface point by ID.
    #[inline]
    #[track_caller]
    pub fn surface_point_mut(&mut self, id: SurfacePointId<I>) -> &mut SurfacePoint<I> {
        live_mut(&mut self.surface_points, id.index(), id)
    }

    /// Get a node by ID.
    ///
    /// # Panics
    /// Panics if `id` does not refer to a live node.
    #[inline]
    #[track_caller]
    pub fn node(&self, id: NodeId<I>) -> &Node<I> {
        live(&self.nodes, id.index(), id)
    }

    /// Get a mutable node by ID.
    #[inline]
    #[track_caller]
    pub fn node_mut(&mut self, id: NodeId<I>) -> &mut Node<I> {
        live_mut(&mut self.nodes, id.index(), id)
    }

    /// Get an edge by ID.
    ///
    /// # Panics
    /// Panics if `id` does not refer to a live edge.
    #[inline]
    #[track_caller]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        live(&self.edges, id.index(), id)
    }

    #[inline]
    #[track_caller]
    pub(crate) fn edge_mut(&mut self, id: EdgeId<I>) -> &mut Edge<I> {
        live_mut(&mut self.edges, id.index(), id)
    }

    /// Get a face by ID.
    ///
    /// # Panics
    /// Panics if `id` does not refer to a live face.
    #[inline]
    #[track_caller]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        live(&self.faces, id.index(), id)
    }

    /// Get a mutable face by ID.
    #[inline]
    #[track_caller]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        live_mut(&mut self.faces, id.index(), id)
    }

    /// Get a surface point if `id` is live.
    #[inline]
    pub fn get_surface_point(&self, id: SurfacePointId<I>) -> Option<&SurfacePoint<I>> {
        self.surface_points.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a node if `id` is live.
    #[inline]
    pub fn get_node(&self, id: NodeId<I>) -> Option<&Node<I>> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Get an edge if `id` is live.
    #[inline]
    pub fn get_edge(&self, id: EdgeId<I>) -> Option<&Edge<I>> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a face if `id` is live.
    #[inline]
    pub fn get_face(&self, id: FaceId<I>) -> Option<&Face<I>> {
        self.faces.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn get_surface_point_mut(&mut self, id: SurfacePointId<I>) -> Option<&mut SurfacePoint<I>> {
        self.surface_points.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    fn get_node_mut(&mut self, id: NodeId<I>) -> Option<&mut Node<I>> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    fn get_edge_mut(&mut self, id: EdgeId<I>) -> Option<&mut Edge<I>> {
        self.edges.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Get the position of a node.
    #[inline]
    pub fn position(&self, n: NodeId<I>) -> &Point3<f64> {
        &self.node(n).position
    }

    /// Set the position of a node.
    #[inline]
    pub fn set_position(&mut self, n: NodeId<I>, pos: Point3<f64>) {
        self.node_mut(n).position = pos;
    }

    // ==================== Iteration ====================

    /// Iterate over live surface point IDs in insertion order.
    pub fn surface_point_ids(&self) -> impl Iterator<Item = SurfacePointId<I>> + '_ {
        live_ids(&self.surface_points)
    }

    /// Iterate over live surface points with their IDs.
    pub fn surface_points(&self) -> impl Iterator<Item = (SurfacePointId<I>, &SurfacePoint<I>)> + '_ {
        live_items(&self.surface_points)
    }

    /// Iterate over live node IDs in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId<I>> + '_ {
        live_ids(&self.nodes)
    }

    /// Iterate over live nodes with their IDs.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId<I>, &Node<I>)> + '_ {
        live_items(&self.nodes)
    }

    /// Iterate over live edge IDs in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        live_ids(&self.edges)
    }

    /// Iterate over live edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId<I>, &Edge<I>)> + '_ {
        live_items(&self.edges)
    }

    /// Iterate over live face IDs in insertion order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        live_ids(&self.faces)
    }

    /// Iterate over live faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        live_items(&self.faces)
    }

    // ==================== Construction ====================

    /// Register a surface point. Its face list and node link are reset.
    pub fn add_surface_point(&mut self, mut sp: SurfacePoint<I>) -> SurfacePointId<I> {
        sp.node = NodeId::invalid();
        sp.adj_f.clear();

        let id = SurfacePointId::new(self.surface_points.len());
        self.surface_points.push(Some(sp));
        self.num_surface_points += 1;
        id
    }

    /// Register a node. Its edge list is reset and every surface point it
    /// lists is linked back to it; ids that are not live are dropped.
    pub fn add_node(&mut self, mut node: Node<I>) -> NodeId<I> {
        node.adj_e.clear();
        node.verts.retain(|&v| self.get_surface_point(v).is_some());

        let id = NodeId::new(self.nodes.len());
        let verts = node.verts.clone();
        self.nodes.push(Some(node));
        self.num_nodes += 1;

        for v in verts {
            let old = self.surface_point(v).node;
            if old != id {
                if let Some(old_node) = self.get_node_mut(old) {
                    exclude(&mut old_node.verts, v);
                }
            }
            self.surface_point_mut(v).node = id;
        }
        id
    }

    /// Register an edge between two existing nodes.
    ///
    /// The edge starts with no faces and is recorded in both endpoints'
    /// edge lists. At most one edge may join a pair of nodes.
    pub fn add_edge(&mut self, edge: Edge<I>) -> Result<EdgeId<I>> {
        let [n0, n1] = edge.nodes;
        if self.get_node(n0).is_none() {
            return Err(invalid_id(n0));
        }
        if self.get_node(n1).is_none() {
            return Err(invalid_id(n1));
        }
        if n0 == n1 {
            return Err(MeshError::DegenerateEdge { node: n0.index() });
        }
        if self.find_edge(n0, n1).is_some() {
            return Err(MeshError::DuplicateEdge {
                n0: n0.index(),
                n1: n1.index(),
            });
        }
        Ok(self.insert_edge(n0, n1))
    }

    fn insert_edge(&mut self, n0: NodeId<I>, n1: NodeId<I>) -> EdgeId<I> {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Some(Edge::new(n0, n1)));
        self.num_edges += 1;

        include(&mut self.node_mut(n0).adj_e, id);
        include(&mut self.node_mut(n1).adj_e, id);
        trace!(edge = ?id, ?n0, ?n1, "edge added");
        id
    }

    /// Register a triangle.
    ///
    /// Missing edges are created on the fly. The face is recorded in each of
    /// its surface points and on one side of each of its edges: side 0 when
    /// the edge's first node is the face's first corner along that edge in
    /// winding order, side 1 otherwise. If that side is already taken the
    /// face goes on the other one, so neighbours with opposite winding still
    /// share the edge. An edge that already has two faces is rejected.
    ///
    /// All checks run before anything is modified, so on error the mesh is
    /// unchanged.
    pub fn add_face(&mut self, mut face: Face<I>) -> Result<FaceId<I>> {
        let mut nodes = [NodeId::invalid(); 3];
        for (k, &v) in face.verts.iter().enumerate() {
            let sp = self.get_surface_point(v).ok_or_else(|| invalid_id(v))?;
            if self.get_node(sp.node).is_none() {
                return Err(MeshError::UnlinkedSurfacePoint(v.index()));
            }
            nodes[k] = sp.node;
        }

        for k in 0..3 {
            if nodes[k] == nodes[(k + 1) % 3] {
                return Err(MeshError::DegenerateFace {
                    node: nodes[k].index(),
                });
            }
        }

        // Side taken on the edge opposite each corner. New edges start at
        // corner i + 1, so the face lands on side 0.
        let mut sides = [0usize; 3];
        for i in 0..3 {
            let (a, b) = (nodes[(i + 1) % 3], nodes[(i + 2) % 3]);
            if let Some(e) = self.find_edge(a, b) {
                let edge = self.edge(e);
                let preferred = if edge.nodes[0] == a { 0 } else { 1 };
                sides[i] = if !edge.adj_f[preferred].is_valid() {
                    preferred
                } else if !edge.adj_f[1 - preferred].is_valid() {
                    1 - preferred
                } else {
                    return Err(MeshError::NonManifoldEdge {
                        n0: a.index(),
                        n1: b.index(),
                    });
                };
            }
        }

        let id = FaceId::new(self.faces.len());

        // Edge k joins corners k and k + 1, created in that orientation.
        let mut pair_edges = [EdgeId::invalid(); 3];
        for k in 0..3 {
            let (a, b) = (nodes[k], nodes[(k + 1) % 3]);
            pair_edges[k] = match self.find_edge(a, b) {
                Some(e) => e,
                None => self.insert_edge(a, b),
            };
        }

        for i in 0..3 {
            let v = face.verts[(i + 1) % 3];
            include(&mut self.surface_point_mut(v).adj_f, id);

            let e = pair_edges[(i + 1) % 3];
            face.adj_e[i] = e;
            self.edge_mut(e).adj_f[sides[i]] = id;
        }

        self.faces.push(Some(face));
        self.num_faces += 1;
        trace!(face = ?id, ?nodes, "face added");
        Ok(id)
    }

    /// Link a surface point to a node.
    ///
    /// A surface point that already has faces cannot be moved to another node.
    pub fn connect(&mut self, sp: SurfacePointId<I>, node: NodeId<I>) -> Result<()> {
        if self.get_node(node).is_none() {
            return Err(invalid_id(node));
        }
        let current = self.get_surface_point(sp).ok_or_else(|| invalid_id(sp))?;
        let old = current.node;
        if old != node && old.is_valid() && !current.adj_f.is_empty() {
            return Err(MeshError::SurfacePointInUse {
                surface_point: sp.index(),
                current: old.index(),
                requested: node.index(),
            });
        }

        if let Some(old_node) = self.get_node_mut(old) {
            exclude(&mut old_node.verts, sp);
        }
        self.surface_point_mut(sp).node = node;
        include(&mut self.node_mut(node).verts, sp);
        Ok(())
    }

    // ==================== Removal ====================

    /// Remove a surface point that no face uses.
    pub fn remove_surface_point(&mut self, id: SurfacePointId<I>) -> Result<SurfacePoint<I>> {
        let sp = self.get_surface_point(id).ok_or_else(|| invalid_id(id))?;
        if !sp.adj_f.is_empty() {
            return Err(MeshError::adjacency(id, sp.adj_f.len()));
        }

        let node = sp.node;
        if let Some(n) = self.get_node_mut(node) {
            exclude(&mut n.verts, id);
        }

        let removed = self.surface_points[id.index()]
            .take()
            .ok_or_else(|| invalid_id(id))?;
        self.num_surface_points -= 1;
        trace!(surface_point = ?id, "surface point removed");
        Ok(removed)
    }

    /// Remove a node that no edge touches.
    ///
    /// Surface points of the node become unlinked but stay in the mesh.
    pub fn remove_node(&mut self, id: NodeId<I>) -> Result<Node<I>> {
        let node = self.get_node(id).ok_or_else(|| invalid_id(id))?;
        if !node.adj_e.is_empty() {
            return Err(MeshError::adjacency(id, node.adj_e.len()));
        }

        let verts = node.verts.clone();
        for v in verts {
            if let Some(sp) = self.get_surface_point_mut(v) {
                if sp.node == id {
                    sp.node = NodeId::invalid();
                }
            }
        }

        let removed = self.nodes[id.index()].take().ok_or_else(|| invalid_id(id))?;
        self.num_nodes -= 1;
        trace!(node = ?id, "node removed");
        Ok(removed)
    }

    /// Remove an edge with no faces on either side.
    pub fn remove_edge(&mut self, id: EdgeId<I>) -> Result<Edge<I>> {
        let edge = *self.get_edge(id).ok_or_else(|| invalid_id(id))?;
        if edge.face_count() > 0 {
            return Err(MeshError::adjacency(id, edge.face_count()));
        }

        for n in edge.nodes {
            if let Some(node) = self.get_node_mut(n) {
                exclude(&mut node.adj_e, id);
            }
        }

        self.edges[id.index()] = None;
        self.num_edges -= 1;
        trace!(edge = ?id, "edge removed");
        Ok(edge)
    }

    /// Remove a face.
    ///
    /// The face is detached from its edges and surface points. Edges left
    /// without faces are kept; remove them with [`Mesh::remove_edge`].
    pub fn remove_face(&mut self, id: FaceId<I>) -> Result<Face<I>> {
        let face = *self.get_face(id).ok_or_else(|| invalid_id(id))?;

        for i in 0..3 {
            if let Some(sp) = self.get_surface_point_mut(face.verts[i]) {
                exclude(&mut sp.adj_f, id);
            }
            if let Some(edge) = self.get_edge_mut(face.adj_e[i]) {
                for slot in edge.adj_f.iter_mut() {
                    if *slot == id {
                        *slot = FaceId::invalid();
                    }
                }
            }
        }

        self.faces[id.index()] = None;
        self.num_faces -= 1;
        trace!(face = ?id, "face removed");
        Ok(face)
    }

    /// Compact all four arenas and renumber every element in storage order.
    ///
    /// After this call ids run densely from zero. Ids obtained earlier must
    /// be translated through the returned remap.
    pub fn set_indices(&mut self) -> IndexRemap<I> {
        let remap = IndexRemap {
            surface_points: dense_remap(&self.surface_points),
            nodes: dense_remap(&self.nodes),
            edges: dense_remap(&self.edges),
            faces: dense_remap(&self.faces),
        };

        self.surface_points.retain(Option::is_some);
        self.nodes.retain(Option::is_some);
        self.edges.retain(Option::is_some);
        self.faces.retain(Option::is_some);

        for sp in self.surface_points.iter_mut().flatten() {
            sp.node = remap.node(sp.node).unwrap_or_default();
            sp.adj_f = sp.adj_f.iter().filter_map(|&f| remap.face(f)).collect();
        }
        for node in self.nodes.iter_mut().flatten() {
            node.verts = node.verts.iter().filter_map(|&v| remap.surface_point(v)).collect();
            node.adj_e = node.adj_e.iter().filter_map(|&e| remap.edge(e)).collect();
        }
        for edge in self.edges.iter_mut().flatten() {
            for n in edge.nodes.iter_mut() {
                *n = remap.node(*n).unwrap_or_default();
            }
            for f in edge.adj_f.iter_mut() {
                *f = remap.face(*f).unwrap_or_default();
            }
        }
        for face in self.faces.iter_mut().flatten() {
            for v in face.verts.iter_mut() {
                *v = remap.surface_point(*v).unwrap_or_default();
            }
            for e in face.adj_e.iter_mut() {
                *e = remap.edge(*e).unwrap_or_default();
            }
        }

        debug!(
            surface_points = self.num_surface_points,
            nodes = self.num_nodes,
            edges = self.num_edges,
            faces = self.num_faces,
            "indices compacted"
        );
        remap
    }

    // ==================== Queries ====================

    /// Find the edge joining two nodes.
    pub fn find_edge(&self, n0: NodeId<I>, n1: NodeId<I>) -> Option<EdgeId<I>> {
        if n0 == n1 {
            return None;
        }
        self.get_node(n0)?
            .adj_e
            .iter()
            .copied()
            .find(|&e| self.get_edge(e).is_some_and(|edge| edge.has_node(n1)))
    }

    /// The nodes of a face's three corners.
    pub fn face_nodes(&self, f: FaceId<I>) -> [NodeId<I>; 3] {
        let [v0, v1, v2] = self.face(f).verts;
        [
            self.surface_point(v0).node,
            self.surface_point(v1).node,
            self.surface_point(v2).node,
        ]
    }

    /// World positions of a face's three corners.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [n0, n1, n2] = self.face_nodes(f);
        [*self.position(n0), *self.position(n1), *self.position(n2)]
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        geometry::triangle_area(&p0, &p1, &p2)
    }

    /// Compute the centroid of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Compute the bounding box of all nodes.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.nodes().map(|(_, n)| n.position);
        let first = positions.next()?;

        Some(positions.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }

    // ==================== Transform ====================

    /// The position/scale transform associated with this mesh.
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the transform. Node positions are not touched.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Set the transform, builder style.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Bake the transform into every node position.
    pub fn apply_transformation(&mut self) {
        if self.transform.is_identity() {
            return;
        }
        let t = self.transform;
        for node in self.nodes.iter_mut().flatten() {
            node.position = t.apply_point(&node.position);
        }
        debug!(nodes = self.num_nodes, "transform applied");
    }

    /// Undo [`Mesh::apply_transformation`].
    ///
    /// A transform with a zero scale factor cannot be undone. Positions are
    /// left as they are and a warning is logged.
    pub fn unapply_transformation(&mut self) {
        if self.transform.is_identity() {
            return;
        }
        if !self.transform.is_invertible() {
            warn!(scale = ?self.transform.scale, "transform has a zero scale factor, positions left baked");
            return;
        }
        let t = self.transform;
        for node in self.nodes.iter_mut().flatten() {
            node.position = t.unapply_point(&node.position);
        }
        debug!(nodes = self.num_nodes, "transform unapplied");
    }

    // ==================== Validation ====================

    /// Check if all adjacency is consistent.
    pub fn is_valid(&self) -> bool {
        for (vid, sp) in self.surface_points() {
            if sp.node.is_valid() {
                match self.get_node(sp.node) {
                    Some(node) if node.verts.contains(&vid) => {}
                    _ => return false,
                }
            }
            for &f in &sp.adj_f {
                match self.get_face(f) {
                    Some(face) if face.verts.contains(&vid) => {}
                    _ => return false,
                }
            }
        }

        for (nid, node) in self.nodes() {
            for &v in &node.verts {
                match self.get_surface_point(v) {
                    Some(sp) if sp.node == nid => {}
                    _ => return false,
                }
            }
            for &e in &node.adj_e {
                match self.get_edge(e) {
                    Some(edge) if edge.has_node(nid) => {}
                    _ => return false,
                }
            }
        }

        for (eid, edge) in self.edges() {
            let [n0, n1] = edge.nodes;
            if n0 == n1 {
                return false;
            }
            for n in [n0, n1] {
                match self.get_node(n) {
                    Some(node) if node.adj_e.contains(&eid) => {}
                    _ => return false,
                }
            }
            for f in edge.adj_f.iter().filter(|f| f.is_valid()) {
                let Some(face) = self.get_face(*f) else {
                    return false;
                };
                let nodes = self.face_nodes(*f);
                if !nodes.contains(&n0) || !nodes.contains(&n1) || !face.adj_e.contains(&eid) {
                    return false;
                }
            }
        }

        for (fid, face) in self.faces() {
            let mut nodes = [NodeId::invalid(); 3];
            for (k, &v) in face.verts.iter().enumerate() {
                match self.get_surface_point(v) {
                    Some(sp) if sp.adj_f.contains(&fid) && sp.node.is_valid() => nodes[k] = sp.node,
                    _ => return false,
                }
            }
            for i in 0..3 {
                let Some(edge) = self.get_edge(face.adj_e[i]) else {
                    return false;
                };
                if !edge.has_node(nodes[(i + 1) % 3])
                    || !edge.has_node(nodes[(i + 2) % 3])
                    || !edge.adj_f.contains(&fid)
                {
                    return false;
                }
            }
        }

        true
    }
}

/// Old-to-new id tables produced by [`Mesh::set_indices`].
#[derive(Debug, Clone)]
pub struct IndexRemap<I: MeshIndex = u32> {
    surface_points: Vec<SurfacePointId<I>>,
    nodes: Vec<NodeId<I>>,
    edges: Vec<EdgeId<I>>,
    faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> IndexRemap<I> {
    /// New id of a surface point, `None` if it had been removed.
    pub fn surface_point(&self, old: SurfacePointId<I>) -> Option<SurfacePointId<I>> {
        self.surface_points.get(old.index()).and_then(|id| id.valid())
    }

    /// New id of a node, `None` if it had been removed.
    pub fn node(&self, old: NodeId<I>) -> Option<NodeId<I>> {
        self.nodes.get(old.index()).and_then(|id| id.valid())
    }

    /// New id of an edge, `None` if it had been removed.
    pub fn edge(&self, old: EdgeId<I>) -> Option<EdgeId<I>> {
        self.edges.get(old.index()).and_then(|id| id.valid())
    }

    /// New id of a face, `None` if it had been removed.
    pub fn face(&self, old: FaceId<I>) -> Option<FaceId<I>> {
        self.faces.get(old.index()).and_then(|id| id.valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    /// Unit square split along the 0-2 diagonal, one surface point per node.
    fn square() -> (Mesh, Vec<SurfacePointId>, [FaceId; 2]) {
        let mut mesh = Mesh::new();
        let mut verts = Vec::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let n = mesh.add_node(Node::from_coords(x, y, 0.0));
            let v = mesh.add_surface_point(SurfacePoint::from_coords(x, y));
            mesh.connect(v, n).unwrap();
            verts.push(v);
        }
        let f0 = mesh.add_face(Face::new(verts[0], verts[1], verts[2])).unwrap();
        let f1 = mesh.add_face(Face::new(verts[0], verts[2], verts[3])).unwrap();
        (mesh, verts, [f0, f1])
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::<u32>::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_edges(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_add_face_creates_edges() {
        let (mesh, _, _) = square();
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_adjacency_symmetry() {
        let (mesh, _, faces) = square();
        for f in faces {
            for e in mesh.face(f).edges() {
                let edge = mesh.edge(e);
                for n in edge.nodes() {
                    assert!(mesh.node(n).adjacent_edges().contains(&e));
                }
                let slots = edge.faces().iter().filter(|&&s| s == f).count();
                assert_eq!(slots, 1, "face {:?} must occupy exactly one side of {:?}", f, e);
            }
        }
    }

    #[test]
    fn test_shared_edge_sides() {
        let (mesh, _, [f0, f1]) = square();
        let diagonal = mesh.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();
        let edge = mesh.edge(diagonal);
        assert_eq!(edge.face_count(), 2);
        assert!(edge.faces().contains(&f0));
        assert!(edge.faces().contains(&f1));
        // adj_e[i] is opposite corner i
        assert_eq!(mesh.face(f0).edges()[1], diagonal);
        assert_eq!(mesh.face(f1).edges()[2], diagonal);
    }

    #[test]
    fn test_remove_face_keeps_shared_edge() {
        let (mut mesh, verts, [f0, f1]) = square();
        let diagonal = mesh.find_edge(NodeId::new(0), NodeId::new(2)).unwrap();

        mesh.remove_face(f0).unwrap();

        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_edges(), 5);
        let edge = mesh.edge(diagonal);
        assert_eq!(edge.face_count(), 1);
        assert!(edge.faces().contains(&f1));
        assert!(!mesh.surface_point(verts[1]).adjacent_faces().contains(&f0));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_remove_with_adjacency_fails() {
        let (mut mesh, verts, _) = square();

        assert!(matches!(
            mesh.remove_surface_point(verts[0]),
            Err(MeshError::AdjacencyNotEmpty { .. })
        ));
        assert!(matches!(
            mesh.remove_node(NodeId::new(0)),
            Err(MeshError::AdjacencyNotEmpty { .. })
        ));
        let e = mesh.find_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        assert!(matches!(mesh.remove_edge(e), Err(MeshError::AdjacencyNotEmpty { .. })));

        assert_eq!(mesh.num_surface_points(), 4);
        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_edges(), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_teardown_in_order() {
        let (mut mesh, verts, faces) = square();
        for f in faces {
            mesh.remove_face(f).unwrap();
        }
        let edges: Vec<_> = mesh.edge_ids().collect();
        for e in edges {
            mesh.remove_edge(e).unwrap();
        }
        for v in verts {
            mesh.remove_surface_point(v).unwrap();
        }
        let nodes: Vec<_> = mesh.node_ids().collect();
        for n in nodes {
            mesh.remove_node(n).unwrap();
        }
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_surface_points(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let (mut mesh, _, _) = square();
        let result = mesh.add_edge(Edge::new(NodeId::new(2), NodeId::new(0)));
        assert!(matches!(result, Err(MeshError::DuplicateEdge { .. })));

        let result = mesh.add_edge(Edge::new(NodeId::new(1), NodeId::new(1)));
        assert!(matches!(result, Err(MeshError::DegenerateEdge { .. })));

        let e = mesh.add_edge(Edge::new(NodeId::new(1), NodeId::new(3))).unwrap();
        assert_eq!(mesh.edge(e).face_count(), 0);
        assert!(mesh.node(NodeId::new(3)).adjacent_edges().contains(&e));
    }

    #[test]
    fn test_third_face_on_edge_rejected() {
        let (mut mesh, verts, _) = square();
        let n = mesh.add_node(Node::from_coords(0.5, 0.5, 1.0));
        let v = mesh.add_surface_point(SurfacePoint::from_coords(0.5, 0.5));
        mesh.connect(v, n).unwrap();

        let edges_before = mesh.num_edges();
        let result = mesh.add_face(Face::new(verts[0], verts[2], v));
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { .. })));
        assert_eq!(mesh.num_edges(), edges_before);
        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_opposite_winding_takes_free_side() {
        let mut mesh = Mesh::<u32>::new();
        let mut verts = Vec::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            let n = mesh.add_node(Node::from_coords(x, y, 0.0));
            let v = mesh.add_surface_point(SurfacePoint::from_coords(x, y));
            mesh.connect(v, n).unwrap();
            verts.push(v);
        }
        // Both faces walk the shared edge from node 1 to node 2.
        let f0 = mesh.add_face(Face::new(verts[0], verts[1], verts[2])).unwrap();
        let f1 = mesh.add_face(Face::new(verts[1], verts[2], verts[3])).unwrap();

        let shared = mesh.find_edge(NodeId::new(1), NodeId::new(2)).unwrap();
        assert_eq!(mesh.edge(shared).faces(), [f0, f1]);
        assert!(mesh.is_valid());

        // A third face on that edge has nowhere to go.
        let n = mesh.add_node(Node::from_coords(0.5, 0.5, 1.0));
        let v = mesh.add_surface_point(SurfacePoint::from_coords(0.5, 0.5));
        mesh.connect(v, n).unwrap();
        let result = mesh.add_face(Face::new(verts[2], verts[1], v));
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { n0: 2, n1: 1 })));
        assert_eq!(mesh.num_faces(), 2);
    }

    #[test]
    fn test_connect_refuses_to_move_used_surface_point() {
        let (mut mesh, verts, _) = square();
        let n = mesh.add_node(Node::from_coords(2.0, 2.0, 0.0));

        let result = mesh.connect(verts[1], n);
        assert!(matches!(
            result,
            Err(MeshError::SurfacePointInUse { surface_point: 1, current: 1, requested: 4 })
        ));
        assert_eq!(mesh.surface_point(verts[1]).node(), NodeId::new(1));

        // Relinking to the same node is fine.
        mesh.connect(verts[1], NodeId::new(1)).unwrap();
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_unlinked_and_degenerate_faces_rejected() {
        let mut mesh = Mesh::<u32>::new();
        let a = mesh.add_surface_point(SurfacePoint::from_coords(0.0, 0.0));
        let b = mesh.add_surface_point(SurfacePoint::from_coords(1.0, 0.0));
        let result = mesh.add_face(Face::new(a, b, a));
        assert!(matches!(result, Err(MeshError::UnlinkedSurfacePoint(_))));

        let n = mesh.add_node(Node::from_coords(0.0, 0.0, 0.0));
        mesh.connect(a, n).unwrap();
        mesh.connect(b, n).unwrap();
        let result = mesh.add_face(Face::new(a, b, a));
        assert!(matches!(result, Err(MeshError::DegenerateFace { .. })));
    }

    #[test]
    fn test_add_node_relinks_surface_points() {
        let mut mesh = Mesh::<u32>::new();
        let v = mesh.add_surface_point(SurfacePoint::from_coords(0.25, 0.75));
        let n = mesh.add_node(Node::from_coords(1.0, 2.0, 3.0).with_surface_points([v]));
        assert_eq!(mesh.surface_point(v).node(), n);
        assert_eq!(mesh.node(n).surface_points(), &[v]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_set_indices_compacts() {
        let (mut mesh, verts, [f0, f1]) = square();
        mesh.remove_face(f0).unwrap();
        let e01 = mesh.find_edge(NodeId::new(0), NodeId::new(1)).unwrap();
        let e12 = mesh.find_edge(NodeId::new(1), NodeId::new(2)).unwrap();
        mesh.remove_edge(e01).unwrap();
        mesh.remove_edge(e12).unwrap();
        mesh.remove_surface_point(verts[1]).unwrap();
        mesh.remove_node(NodeId::new(1)).unwrap();

        let remap = mesh.set_indices();

        assert_eq!(remap.face(f0), None);
        assert_eq!(remap.face(f1), Some(FaceId::new(0)));
        assert_eq!(remap.node(NodeId::new(1)), None);
        assert_eq!(remap.node(NodeId::new(3)), Some(NodeId::new(2)));
        assert_eq!(mesh.num_nodes(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_faces(), 1);

        let ids: Vec<usize> = mesh.node_ids().map(|n| n.index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(mesh.is_valid());
        assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_transform_idempotent() {
        let (mut mesh, _, _) = square();
        let before: Vec<_> = mesh.nodes().map(|(_, n)| n.position).collect();

        mesh.set_transform(Transform::new(Vector3::new(3.0, -1.0, 2.0), Vector3::new(2.0, 0.5, 3.0)));
        mesh.apply_transformation();
        assert!((mesh.position(NodeId::new(2)) - Point3::new(5.0, -0.5, 2.0)).norm() < 1e-12);

        mesh.unapply_transformation();
        for ((_, n), p) in mesh.nodes().zip(&before) {
            assert!((n.position - p).norm() < 1e-12);
        }
    }

    #[test]
    fn test_flattening_transform_not_undone() {
        let (mut mesh, _, _) = square();
        mesh.set_transform(Transform::new(Vector3::zeros(), Vector3::new(2.0, 2.0, 0.0)));
        assert!(!mesh.transform().is_invertible());

        mesh.apply_transformation();
        let baked: Vec<_> = mesh.nodes().map(|(_, n)| n.position).collect();
        mesh.unapply_transformation();

        for ((_, n), p) in mesh.nodes().zip(&baked) {
            assert!(n.position.coords.iter().all(|c| c.is_finite()));
            assert_eq!(n.position, *p);
        }
    }

    #[test]
    fn test_identity_transform_is_noop() {
        let (mut mesh, _, _) = square();
        let before: Vec<_> = mesh.nodes().map(|(_, n)| n.position).collect();
        mesh.apply_transformation();
        let after: Vec<_> = mesh.nodes().map(|(_, n)| n.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_geometry_queries() {
        let (mesh, _, [f0, _]) = square();
        assert!((mesh.surface_area() - 1.0).abs() < 1e-12);
        let c = mesh.face_centroid(f0);
        assert!((c - Point3::new(2.0 / 3.0, 1.0 / 3.0, 0.0)).norm() < 1e-12);
        let (min, max) = mesh.bounding_box().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
    }
}
