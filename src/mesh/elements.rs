//! The four linked record types stored by a [`Mesh`](super::Mesh).
//!
//! # Structure
//!
//! - A [`Node`] is a world-space vertex. It lists every [`SurfacePoint`] that
//!   shares its position (more than one only across a UV seam) and every
//!   [`Edge`] that ends at it.
//! - A [`SurfacePoint`] is a UV-space vertex. It points back at its node and
//!   lists the faces that use it.
//! - An [`Edge`] joins two nodes and records up to two faces, one per side.
//! - A [`Face`] is a triangle of three surface points with its three edges.
//!
//! Adjacency fields are maintained by the mesh and are read-only outside the
//! crate. Geometric fields (`uv`, `position`, `normal`) are public.

use nalgebra::{Point2, Point3, Vector3};

use super::index::{EdgeId, FaceId, MeshIndex, NodeId, SurfacePointId};

/// A UV-space vertex.
#[derive(Debug, Clone)]
pub struct SurfacePoint<I: MeshIndex = u32> {
    /// Texture coordinates.
    pub uv: Point2<f64>,

    /// The node this surface point belongs to.
    pub(crate) node: NodeId<I>,

    /// Faces that use this surface point.
    pub(crate) adj_f: Vec<FaceId<I>>,
}

impl<I: MeshIndex> SurfacePoint<I> {
    /// Create a new, unlinked surface point.
    pub fn new(uv: Point2<f64>) -> Self {
        Self {
            uv,
            node: NodeId::invalid(),
            adj_f: Vec::new(),
        }
    }

    /// Create a surface point from raw coordinates.
    pub fn from_coords(u: f64, v: f64) -> Self {
        Self::new(Point2::new(u, v))
    }

    /// The node this surface point belongs to, invalid if unlinked.
    #[inline]
    pub fn node(&self) -> NodeId<I> {
        self.node
    }

    /// Faces adjacent in UV space.
    #[inline]
    pub fn adjacent_faces(&self) -> &[FaceId<I>] {
        &self.adj_f
    }
}

/// A world-space vertex.
#[derive(Debug, Clone)]
pub struct Node<I: MeshIndex = u32> {
    /// World-space position.
    pub position: Point3<f64>,

    /// Smoothed vertex normal.
    pub normal: Vector3<f64>,

    /// Surface points sharing this position.
    pub(crate) verts: Vec<SurfacePointId<I>>,

    /// Edges ending at this node.
    pub(crate) adj_e: Vec<EdgeId<I>>,
}

impl<I: MeshIndex> Node<I> {
    /// Create a new node at the given position with a zero normal.
    pub fn new(position: Point3<f64>) -> Self {
        Self::with_normal(position, Vector3::zeros())
    }

    /// Create a new node with a position and normal.
    pub fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal,
            verts: Vec::new(),
            adj_e: Vec::new(),
        }
    }

    /// Create a node from raw coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Attach existing surface points; [`Mesh::add_node`](super::Mesh::add_node)
    /// links them back to the new node.
    pub fn with_surface_points(mut self, verts: impl IntoIterator<Item = SurfacePointId<I>>) -> Self {
        for v in verts {
            include(&mut self.verts, v);
        }
        self
    }

    /// Surface points sharing this node's position.
    #[inline]
    pub fn surface_points(&self) -> &[SurfacePointId<I>] {
        &self.verts
    }

    /// Edges incident to this node.
    #[inline]
    pub fn adjacent_edges(&self) -> &[EdgeId<I>] {
        &self.adj_e
    }
}

/// An undirected edge between two nodes.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// Endpoint nodes. Fixed once the edge is created.
    pub(crate) nodes: [NodeId<I>; 2],

    /// Faces on either side, invalid where absent.
    pub(crate) adj_f: [FaceId<I>; 2],
}

impl<I: MeshIndex> Edge<I> {
    /// Create a new edge between two nodes with no faces.
    pub fn new(n0: NodeId<I>, n1: NodeId<I>) -> Self {
        Self {
            nodes: [n0, n1],
            adj_f: [FaceId::invalid(); 2],
        }
    }

    /// The two endpoints.
    #[inline]
    pub fn nodes(&self) -> [NodeId<I>; 2] {
        self.nodes
    }

    /// The face on `side` (0 or 1), if any.
    ///
    /// # Panics
    /// Panics if `side` is greater than 1.
    #[inline]
    #[track_caller]
    pub fn face(&self, side: usize) -> Option<FaceId<I>> {
        self.adj_f[side].valid()
    }

    /// Both face slots.
    #[inline]
    pub fn faces(&self) -> [FaceId<I>; 2] {
        self.adj_f
    }

    /// Number of occupied face slots.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.adj_f.iter().filter(|f| f.is_valid()).count()
    }

    /// Check whether `n` is one of the endpoints.
    #[inline]
    pub fn has_node(&self, n: NodeId<I>) -> bool {
        self.nodes[0] == n || self.nodes[1] == n
    }

    /// The endpoint that is not `n`.
    #[inline]
    pub fn other_node(&self, n: NodeId<I>) -> NodeId<I> {
        if self.nodes[0] == n {
            self.nodes[1]
        } else {
            self.nodes[0]
        }
    }

    /// Slot (0 or 1) of endpoint `n`, if it is an endpoint.
    #[inline]
    pub fn slot_of(&self, n: NodeId<I>) -> Option<usize> {
        self.nodes.iter().position(|&m| m == n)
    }
}

/// A triangle.
///
/// `adj_e[i]` is the edge opposite corner `i`, joining the nodes of
/// `verts[(i + 1) % 3]` and `verts[(i + 2) % 3]`.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// Corners in winding order.
    pub(crate) verts: [SurfacePointId<I>; 3],

    /// Edges opposite each corner.
    pub(crate) adj_e: [EdgeId<I>; 3],

    /// Cached face normal.
    pub normal: Vector3<f64>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face over three surface points.
    pub fn new(v0: SurfacePointId<I>, v1: SurfacePointId<I>, v2: SurfacePointId<I>) -> Self {
        Self {
            verts: [v0, v1, v2],
            adj_e: [EdgeId::invalid(); 3],
            normal: Vector3::zeros(),
        }
    }

    /// The three corners in winding order.
    #[inline]
    pub fn surface_points(&self) -> [SurfacePointId<I>; 3] {
        self.verts
    }

    /// The three edges; `edges()[i]` is opposite corner `i`.
    #[inline]
    pub fn edges(&self) -> [EdgeId<I>; 3] {
        self.adj_e
    }

    /// Corner position of `v` in this face.
    #[inline]
    pub fn corner_of(&self, v: SurfacePointId<I>) -> Option<usize> {
        self.verts.iter().position(|&w| w == v)
    }
}

/// Insert into an unordered set stored as a `Vec`.
#[inline]
pub(crate) fn include<T: PartialEq>(set: &mut Vec<T>, item: T) {
    if !set.contains(&item) {
        set.push(item);
    }
}

/// Remove from an unordered set stored as a `Vec`.
#[inline]
pub(crate) fn exclude<T: PartialEq>(set: &mut Vec<T>, item: T) {
    if let Some(i) = set.iter().position(|x| *x == item) {
        set.swap_remove(i);
    }
}
