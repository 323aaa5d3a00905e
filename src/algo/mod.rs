//! Mesh processing algorithms.
//!
//! - **Triangulation**: max-min-angle fan triangulation of polygons
//! - **Normals**: face normals and smoothed node normals

pub mod normals;
pub mod triangulate;
