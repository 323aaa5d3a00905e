//! Face and node normal estimation.
//!
//! # Example
//!
//! ```
//! use quilt::prelude::*;
//! use quilt::algo::normals::{recompute_normals, NormalOptions};
//! use nalgebra::{Point3, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: Mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
//!
//! recompute_normals(&mut mesh, &NormalOptions::default());
//! let n = mesh.node(NodeId::new(0)).normal;
//! assert!((n - Vector3::z()).norm() < 1e-12);
//! ```

use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::debug;

use crate::geometry::{norm2, normalize_or_zero, triangle_normal};
use crate::mesh::{FaceId, Mesh, MeshIndex, NodeId};

/// Options for normal estimation.
#[derive(Debug, Clone)]
pub struct NormalOptions {
    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for NormalOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl NormalOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Recompute every face normal, then smooth them onto the nodes.
pub fn recompute_normals<I: MeshIndex>(mesh: &mut Mesh<I>, options: &NormalOptions) {
    update_face_normals_with(mesh, options);
    shade_smooth_with(mesh, options);
    debug!(
        faces = mesh.num_faces(),
        nodes = mesh.num_nodes(),
        "normals recomputed"
    );
}

/// Set each face normal to `normalize((x1 - x0) × (x2 - x0))`.
///
/// Degenerate faces get the zero vector.
pub fn update_face_normals<I: MeshIndex>(mesh: &mut Mesh<I>) {
    update_face_normals_with(mesh, &NormalOptions::default().sequential());
}

fn update_face_normals_with<I: MeshIndex>(mesh: &mut Mesh<I>, options: &NormalOptions) {
    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    let compute = |&f: &FaceId<I>| {
        let [x0, x1, x2] = mesh.face_positions(f);
        triangle_normal(&x0, &x1, &x2)
    };

    let normals: Vec<Vector3<f64>> = if options.parallel {
        faces.par_iter().map(compute).collect()
    } else {
        faces.iter().map(compute).collect()
    };

    for (f, normal) in faces.into_iter().zip(normals) {
        mesh.face_mut(f).normal = normal;
    }
}

/// Set each node normal to the normalized, angle- and length-weighted sum of
/// the face normals around it.
///
/// Each face at a node contributes `(e1 × e2) / (2 |e1|² |e2|²)`, with `e1`
/// and `e2` running from the node to the face's other two corners. Nodes
/// with no usable faces get the zero vector.
pub fn shade_smooth<I: MeshIndex>(mesh: &mut Mesh<I>) {
    shade_smooth_with(mesh, &NormalOptions::default().sequential());
}

fn shade_smooth_with<I: MeshIndex>(mesh: &mut Mesh<I>, options: &NormalOptions) {
    let nodes: Vec<NodeId<I>> = mesh.node_ids().collect();
    let compute = |&n: &NodeId<I>| node_normal(mesh, n);

    let normals: Vec<Vector3<f64>> = if options.parallel {
        nodes.par_iter().map(compute).collect()
    } else {
        nodes.iter().map(compute).collect()
    };

    for (n, normal) in nodes.into_iter().zip(normals) {
        mesh.node_mut(n).normal = normal;
    }
}

fn node_normal<I: MeshIndex>(mesh: &Mesh<I>, n: NodeId<I>) -> Vector3<f64> {
    let node = mesh.node(n);
    let mut sum = Vector3::zeros();

    // A face reached through several surface points of the node counts once
    // per surface point; all copies point the same way.
    for &v in node.surface_points() {
        for &f in mesh.surface_point(v).adjacent_faces() {
            let face = mesh.face(f);
            let Some(corner) = face.corner_of(v) else {
                continue;
            };
            let verts = face.surface_points();
            let x0 = node.position;
            let x1 = mesh.node(mesh.surface_point(verts[(corner + 1) % 3]).node()).position;
            let x2 = mesh.node(mesh.surface_point(verts[(corner + 2) % 3]).node()).position;

            let e1 = x1 - x0;
            let e2 = x2 - x0;
            let denom = 2.0 * norm2(&e1) * norm2(&e2);
            if denom > 0.0 {
                sum += e1.cross(&e2) / denom;
            }
        }
    }

    normalize_or_zero(sum)
}
