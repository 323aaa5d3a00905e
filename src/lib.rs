//! # Quilt
//!
//! A triangle mesh topology library with explicit UV seams.
//!
//! Quilt keeps world-space vertices (nodes) and texture-space vertices
//! (surface points) apart, so one position can carry several UVs where a
//! seam runs through it. Edges and faces are linked both ways and every
//! structural edit keeps that linkage consistent.
//!
//! ## Features
//!
//! - **Linked topology**: nodes, surface points, edges and faces with
//!   type-safe indices
//! - **Seam and boundary queries** on edges, faces and nodes
//! - **Polygon input**: max-min-angle fan triangulation
//! - **Smooth normals** estimated from face geometry
//! - **Surface I/O**: an OBJ dialect with explicit edge records
//! - **Render hand-off**: a flat, `Pod` vertex stream per triangle
//!
//! ## Quick Start
//!
//! ```no_run
//! use quilt::prelude::*;
//!
//! let mut mesh: Mesh = quilt::io::load("model.obj").unwrap();
//! recompute_normals(&mut mesh, &NormalOptions::default());
//!
//! println!("Nodes: {}", mesh.num_nodes());
//! println!("Seam edges: {}", mesh.seam_edges().count());
//!
//! quilt::io::save(&mut mesh, "output.surf").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use quilt::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: Mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_nodes(), 4);
//! assert_eq!(mesh.num_edges(), 6);
//! assert_eq!(mesh.boundary_edges().count(), 0);
//! ```
//!
//! ## Element-by-element Construction
//!
//! ```
//! use quilt::prelude::*;
//!
//! let mut mesh: Mesh = Mesh::new();
//! let mut corners = Vec::new();
//! for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
//!     let n = mesh.add_node(Node::from_coords(x, y, 0.0));
//!     let v = mesh.add_surface_point(SurfacePoint::from_coords(x, y));
//!     mesh.connect(v, n).unwrap();
//!     corners.push(v);
//! }
//! let f = mesh.add_face(Face::new(corners[0], corners[1], corners[2])).unwrap();
//! assert!(mesh.face_is_on_seam_or_boundary(f));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod render;

/// Prelude module for convenient imports.
///
/// ```
/// use quilt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::normals::{recompute_normals, NormalOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::geometry::Transform;
    pub use crate::mesh::{
        build_from_polygons, build_from_triangles, to_face_vertex, Edge, EdgeId, Face, FaceId,
        Mesh, MeshIndex, Node, NodeId, SurfacePoint, SurfacePointId,
    };
    pub use crate::render::{DrawVertex, Drawable};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
