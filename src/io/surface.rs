//! The plain-text surface format.
//!
//! A Wavefront OBJ dialect with one extra record type. One record per line:
//!
//! | Record | Meaning |
//! |--------|---------|
//! | `v x y z` | node position |
//! | `vt u v` | surface point UV |
//! | `vn x y z` | normal |
//! | `e a b` | edge between nodes `a` and `b` |
//! | `f n[/[t][/m]] ...` | polygon of three or more corners |
//!
//! Indices are 1-based. Blank lines and `#` comments are ignored, as are
//! keywords this format does not use (`o`, `g`, `s`, `usemtl`, ...).
//!
//! Reading happens in two passes. [`parse`] turns the text into a
//! [`SurfaceDocument`] without touching a mesh, then [`build`] resolves the
//! cross-references. A face may therefore use normals declared after it.
//! The first malformed record aborts the read with [`MeshError::Parse`].
//!
//! Some exporters share one `vt` between corners at different positions.
//! A surface point belongs to a single node, so each further node that uses
//! the same `vt` gets its own surface point with that UV. Those copies are
//! appended after the declared ones.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::str::SplitWhitespace;

use nalgebra::{Point2, Point3, Vector3};
use tracing::{debug, trace};

use crate::algo::triangulate::triangulate;
use crate::error::{MeshError, Result};
use crate::mesh::{Edge, Mesh, MeshIndex, Node, NodeId, SurfacePoint, SurfacePointId};

/// One corner of a polygon record, with 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    /// Node (position) index.
    pub node: usize,
    /// Surface point (UV) index, if given.
    pub uv: Option<usize>,
    /// Normal index, if given.
    pub normal: Option<usize>,
}

/// A polygon record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    /// 1-based source line.
    pub line: usize,
    /// Corners in winding order.
    pub corners: Vec<Corner>,
}

/// An explicit edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    /// 1-based source line.
    pub line: usize,
    /// 0-based node indices.
    pub nodes: [usize; 2],
}

/// Every record of a surface file, before any indices are resolved.
#[derive(Debug, Clone, Default)]
pub struct SurfaceDocument {
    /// `v` records.
    pub positions: Vec<Point3<f64>>,
    /// `vt` records.
    pub uvs: Vec<Point2<f64>>,
    /// `vn` records.
    pub normals: Vec<Vector3<f64>>,
    /// `e` records.
    pub edges: Vec<EdgeRecord>,
    /// `f` records.
    pub polygons: Vec<Polygon>,
}

/// Read a mesh from surface-format text.
pub fn read<R: BufRead, I: MeshIndex>(reader: R) -> Result<Mesh<I>> {
    build(&parse(reader)?)
}

/// First pass: parse every record.
pub fn parse<R: BufRead>(reader: R) -> Result<SurfaceDocument> {
    let mut doc = SurfaceDocument::default();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = line.trim_end_matches('\r').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no, "v")?;
                doc.positions.push(Point3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&mut tokens, line_no, "vt")?;
                doc.uvs.push(Point2::new(u, v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut tokens, line_no, "vn")?;
                doc.normals.push(Vector3::new(x, y, z));
            }
            "e" => {
                let mut nodes = [0; 2];
                for node in nodes.iter_mut() {
                    let token = tokens
                        .next()
                        .ok_or_else(|| MeshError::parse(line_no, "e record needs two node indices"))?;
                    *node = parse_index(token, line_no)?;
                }
                doc.edges.push(EdgeRecord {
                    line: line_no,
                    nodes,
                });
            }
            "f" => {
                let corners = tokens
                    .map(|token| parse_corner(token, line_no))
                    .collect::<Result<Vec<_>>>()?;
                if corners.len() < 3 {
                    return Err(MeshError::parse(
                        line_no,
                        format!("face has {} corner(s), expected at least 3", corners.len()),
                    ));
                }
                doc.polygons.push(Polygon {
                    line: line_no,
                    corners,
                });
            }
            other => {
                debug!(line = line_no, keyword = other, "skipping unsupported record");
            }
        }
    }

    debug!(
        positions = doc.positions.len(),
        uvs = doc.uvs.len(),
        normals = doc.normals.len(),
        edges = doc.edges.len(),
        polygons = doc.polygons.len(),
        "surface records parsed"
    );
    Ok(doc)
}

fn parse_floats<const N: usize>(
    tokens: &mut SplitWhitespace<'_>,
    line: usize,
    keyword: &str,
) -> Result<[f64; N]> {
    let mut out = [0.0; N];
    for value in out.iter_mut() {
        let token = tokens
            .next()
            .ok_or_else(|| MeshError::parse(line, format!("{} record needs {} numbers", keyword, N)))?;
        *value = token
            .parse()
            .map_err(|_| MeshError::parse(line, format!("invalid number '{}'", token)))?;
    }
    Ok(out)
}

/// Parse a 1-based index into a 0-based one.
fn parse_index(token: &str, line: usize) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(0) => Err(MeshError::parse(line, "indices start at 1")),
        Ok(k) => Ok(k - 1),
        Err(_) => Err(MeshError::parse(line, format!("invalid index '{}'", token))),
    }
}

fn parse_corner(token: &str, line: usize) -> Result<Corner> {
    let mut parts = token.split('/');
    let node = match parts.next() {
        Some(p) if !p.is_empty() => parse_index(p, line)?,
        _ => return Err(MeshError::parse(line, format!("corner '{}' has no node index", token))),
    };
    let mut optional = || -> Result<Option<usize>> {
        match parts.next() {
            Some(p) if !p.is_empty() => parse_index(p, line).map(Some),
            _ => Ok(None),
        }
    };
    let uv = optional()?;
    let normal = optional()?;
    if parts.next().is_some() {
        return Err(MeshError::parse(line, format!("corner '{}' has too many fields", token)));
    }
    Ok(Corner { node, uv, normal })
}

fn check_range(index: usize, len: usize, what: &str, line: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(MeshError::parse(
            line,
            format!("{} index {} out of range (have {})", what, index + 1, len),
        ))
    }
}

/// Second pass: resolve a parsed document into a fresh mesh.
///
/// Corners without a UV reuse their node's first surface point, or get a new
/// one at the node's `(x, y)`. A corner's normal, if given, is written onto
/// its node.
pub fn build<I: MeshIndex>(doc: &SurfaceDocument) -> Result<Mesh<I>> {
    let mut mesh = Mesh::with_capacity(doc.positions.len(), doc.polygons.len());

    let nodes: Vec<NodeId<I>> = doc
        .positions
        .iter()
        .map(|&p| mesh.add_node(Node::new(p)))
        .collect();
    let verts: Vec<SurfacePointId<I>> = doc
        .uvs
        .iter()
        .map(|&uv| mesh.add_surface_point(SurfacePoint::new(uv)))
        .collect();
    let mut copies: HashMap<(usize, usize), SurfacePointId<I>> = HashMap::new();

    for record in &doc.edges {
        for &n in &record.nodes {
            check_range(n, nodes.len(), "node", record.line)?;
        }
        mesh.add_edge(Edge::new(nodes[record.nodes[0]], nodes[record.nodes[1]]))
            .map_err(|e| MeshError::parse(record.line, e))?;
    }

    for polygon in &doc.polygons {
        let line = polygon.line;
        let mut corners = Vec::with_capacity(polygon.corners.len());

        for corner in &polygon.corners {
            check_range(corner.node, nodes.len(), "node", line)?;
            let node = nodes[corner.node];

            if let Some(k) = corner.normal {
                check_range(k, doc.normals.len(), "normal", line)?;
                mesh.node_mut(node).normal = doc.normals[k];
            }

            let sp = match corner.uv {
                Some(k) => {
                    check_range(k, verts.len(), "uv", line)?;
                    let owner = mesh.surface_point(verts[k]).node();
                    if !owner.is_valid() || owner == node {
                        verts[k]
                    } else {
                        *copies.entry((k, corner.node)).or_insert_with(|| {
                            let uv = doc.uvs[k];
                            let v = mesh.add_surface_point(SurfacePoint::new(uv));
                            trace!(line, uv = k + 1, surface_point = ?v, "copied shared uv");
                            v
                        })
                    }
                }
                None => match mesh.node(node).surface_points().first().copied() {
                    Some(v) => v,
                    None => {
                        let p = mesh.node(node).position;
                        let v = mesh.add_surface_point(SurfacePoint::from_coords(p.x, p.y));
                        trace!(line, surface_point = ?v, "synthesized surface point");
                        v
                    }
                },
            };
            mesh.connect(sp, node).map_err(|e| MeshError::parse(line, e))?;
            corners.push(sp);
        }

        for face in triangulate(&mesh, &corners).map_err(|e| MeshError::parse(line, e))? {
            mesh.add_face(face).map_err(|e| MeshError::parse(line, e))?;
        }
    }

    debug!(
        nodes = mesh.num_nodes(),
        surface_points = mesh.num_surface_points(),
        edges = mesh.num_edges(),
        faces = mesh.num_faces(),
        "surface resolved"
    );
    Ok(mesh)
}

/// Write a mesh as surface-format text.
///
/// The mesh is compacted with [`Mesh::set_indices`] first. Each corner's
/// normal index is that of the face's first node, and edges without faces
/// are written as `e` records.
pub fn write<W: Write, I: MeshIndex>(mesh: &mut Mesh<I>, mut writer: W) -> Result<()> {
    mesh.set_indices();

    writeln!(writer, "# quilt surface")?;
    for (_, node) in mesh.nodes() {
        let p = node.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for (_, sp) in mesh.surface_points() {
        writeln!(writer, "vt {} {}", sp.uv.x, sp.uv.y)?;
    }
    for (_, node) in mesh.nodes() {
        let n = node.normal;
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for (_, edge) in mesh.edges().filter(|(_, e)| e.face_count() == 0) {
        let [n0, n1] = edge.nodes();
        writeln!(writer, "e {} {}", n0.index() + 1, n1.index() + 1)?;
    }
    for f in mesh.face_ids() {
        let verts = mesh.face(f).surface_points();
        let nodes = mesh.face_nodes(f);
        let normal = nodes[0].index() + 1;
        write!(writer, "f")?;
        for (v, n) in verts.iter().zip(nodes.iter()) {
            write!(writer, " {}/{}/{}", n.index() + 1, v.index() + 1, normal)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
