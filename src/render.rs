//! Hand-off to an external renderer.
//!
//! The crate does no drawing itself. A [`Drawable`] flattens into a stream
//! of [`DrawVertex`] values, three per triangle, that can be uploaded to a
//! vertex buffer as raw bytes with [`bytemuck::cast_slice`].

use bytemuck::{Pod, Zeroable};

use crate::mesh::{Mesh, MeshIndex};

/// Vertex with position, normal and UV coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Unit normal, zero if unknown.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

/// Something that can be turned into a triangle list for drawing.
pub trait Drawable {
    /// Three vertices per triangle, in face order.
    fn vertex_stream(&self) -> Vec<DrawVertex>;

    /// The vertex stream as bytes.
    fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertex_stream()).to_vec()
    }
}

impl<I: MeshIndex> Drawable for Mesh<I> {
    /// Positions are mapped through the mesh transform and node normals are
    /// corrected for its scale. Node data is left untouched.
    fn vertex_stream(&self) -> Vec<DrawVertex> {
        let t = self.transform();
        let mut out = Vec::with_capacity(self.num_faces() * 3);

        for (_, face) in self.faces() {
            for v in face.surface_points() {
                let sp = self.surface_point(v);
                let node = self.node(sp.node());
                let p = t.apply_point(&node.position);
                let n = t.apply_normal(&node.normal);
                out.push(DrawVertex {
                    position: [p.x as f32, p.y as f32, p.z as f32],
                    normal: [n.x as f32, n.y as f32, n.z as f32],
                    uv: [sp.uv.x as f32, sp.uv.y as f32],
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::normals::{recompute_normals, NormalOptions};
    use crate::geometry::Transform;
    use crate::mesh::build_from_triangles;
    use nalgebra::{Point3, Vector3};

    fn triangle() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh: Mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
        recompute_normals(&mut mesh, &NormalOptions::default());
        mesh
    }

    #[test]
    fn test_stream_layout() {
        assert_eq!(std::mem::size_of::<DrawVertex>(), 32);
        let mesh = triangle();
        let stream = mesh.vertex_stream();
        assert_eq!(stream.len(), 3 * mesh.num_faces());
        assert_eq!(stream[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(stream[1].uv, [1.0, 0.0]);
        assert_eq!(stream[2].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.vertex_bytes().len(), 3 * 32);
    }

    #[test]
    fn test_stream_in_world_space() {
        let mut mesh = triangle();
        mesh.set_transform(Transform::new(Vector3::new(10.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0)));
        let stream = mesh.vertex_stream();

        assert_eq!(stream[1].position, [12.0, 0.0, 0.0]);
        assert_eq!(stream[2].normal, [0.0, 0.0, 1.0]);
        // Node data is not baked.
        assert_eq!(mesh.node(crate::mesh::NodeId::new(1)).position, Point3::new(1.0, 0.0, 0.0));
    }
}
