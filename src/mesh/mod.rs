//! Core mesh data structures.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], a triangle mesh with explicit adjacency
//! between four kinds of element:
//!
//! - [`Node`]: a vertex in world space
//! - [`SurfacePoint`]: a vertex in texture space, attached to one node
//! - [`Edge`]: a pair of nodes with up to two faces
//! - [`Face`]: a triangle of three surface points
//!
//! A node has several surface points only where a UV seam passes through it.
//!
//! # Index Types
//!
//! Elements are identified by type-safe index wrappers ([`NodeId`],
//! [`SurfacePointId`], [`EdgeId`], [`FaceId`]) generic over the
//! [`MeshIndex`] trait, so `u16`, `u32` or `u64` can back them.
//!
//! # Construction
//!
//! ```
//! use quilt::mesh::{Mesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: Mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_edges(), 3);
//! ```

mod builder;
mod container;
mod elements;
mod index;
mod topology;

pub use builder::{build_from_polygons, build_from_triangles, to_face_vertex};
pub use container::{IndexRemap, Mesh};
pub use elements::{Edge, Face, Node, SurfacePoint};
pub use index::{EdgeId, FaceId, MeshIndex, NodeId, SurfacePointId};
