//! Mesh construction utilities.
//!
//! This module builds meshes from face-vertex lists as commonly found in mesh
//! file formats, and flattens them back.

use nalgebra::Point3;
use tracing::debug;

use super::container::Mesh;
use super::elements::{Node, SurfacePoint};
use super::index::{MeshIndex, SurfacePointId};
use crate::algo::triangulate::triangulate;
use crate::error::{MeshError, Result};

/// Build a mesh from positions and polygons of any size.
///
/// Every position becomes a node with one surface point whose UV is the
/// node's `(x, y)`. Polygons with more than three corners are triangulated.
///
/// # Example
/// ```
/// use quilt::mesh::{build_from_polygons, Mesh};
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let polygons = vec![vec![0, 1, 2, 3]];
///
/// let mesh: Mesh = build_from_polygons(&positions, &polygons).unwrap();
/// assert_eq!(mesh.num_nodes(), 4);
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn build_from_polygons<I: MeshIndex, P: AsRef<[usize]>>(
    positions: &[Point3<f64>],
    polygons: &[P],
) -> Result<Mesh<I>> {
    for (pi, polygon) in polygons.iter().enumerate() {
        if let Some(&vi) = polygon.as_ref().iter().find(|&&vi| vi >= positions.len()) {
            return Err(MeshError::InvalidVertexIndex {
                polygon: pi,
                vertex: vi,
            });
        }
    }

    let mut mesh = Mesh::with_capacity(positions.len(), polygons.len());

    let verts: Vec<SurfacePointId<I>> = positions
        .iter()
        .map(|p| {
            let v = mesh.add_surface_point(SurfacePoint::from_coords(p.x, p.y));
            mesh.add_node(Node::new(*p).with_surface_points([v]));
            v
        })
        .collect();

    for polygon in polygons {
        let corners: Vec<_> = polygon.as_ref().iter().map(|&vi| verts[vi]).collect();
        for face in triangulate(&mesh, &corners)? {
            mesh.add_face(face)?;
        }
    }

    debug!(
        nodes = mesh.num_nodes(),
        edges = mesh.num_edges(),
        faces = mesh.num_faces(),
        "mesh built from polygons"
    );
    Ok(mesh)
}

/// Build a mesh from positions and triangles.
pub fn build_from_triangles<I: MeshIndex>(
    positions: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<Mesh<I>> {
    build_from_polygons(positions, faces)
}

/// Convert a mesh back to a face-vertex representation.
///
/// Returns `(positions, triangles)` with node indices in iteration order.
pub fn to_face_vertex<I: MeshIndex>(mesh: &Mesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut dense = vec![usize::MAX; mesh.nodes.len()];
    let mut positions = Vec::with_capacity(mesh.num_nodes());
    for (n, node) in mesh.nodes() {
        dense[n.index()] = positions.len();
        positions.push(node.position);
    }

    let faces = mesh
        .face_ids()
        .map(|f| {
            let [n0, n1, n2] = mesh.face_nodes(f);
            [dense[n0.index()], dense[n1.index()], dense[n2.index()]]
        })
        .collect();

    (positions, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(1.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 3, 2]];
        (vertices, faces)
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh: Mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_nodes(), 4);
        assert_eq!(mesh.num_surface_points(), 4);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.boundary_edges().count(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh: Mesh = build_from_triangles(&vertices, &faces).unwrap();
        let (v2, f2) = to_face_vertex(&mesh);

        assert_eq!(v2, vertices);
        assert_eq!(f2, faces);
    }

    #[test]
    fn test_mixed_polygons() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ];
        let polygons = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let mesh: Mesh = build_from_polygons(&positions, &polygons).unwrap();

        assert_eq!(mesh.num_faces(), 3);
        assert!((mesh.surface_area() - 1.5).abs() < 1e-12);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]];
        let result: Result<Mesh> = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { polygon: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = two_triangles();
        let faces = vec![[0, 0, 1]];
        let result: Result<Mesh> = build_from_triangles(&vertices, &faces);
        assert!(result.is_err());
    }
}
