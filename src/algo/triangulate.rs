//! Max-min-angle fan triangulation.
//!
//! A polygon with `n` corners is split into the `n - 2` triangles of a fan
//! rooted at one corner: `(r, r + j - 1, r + j)` for `j = 2..n`, indices
//! modulo `n`. Every corner is tried as the root. A root's score is the
//! smallest interior angle over its fan, and the root with the largest score
//! wins. Ties keep the earliest root.
//!
//! # Example
//!
//! ```
//! use quilt::algo::triangulate::best_fan_root;
//! use nalgebra::Point3;
//!
//! let square = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let (root, score) = best_fan_root(&square).unwrap();
//! assert_eq!(root, 0);
//! assert!((score - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
//! ```

use nalgebra::Point3;
use tracing::warn;

use crate::error::{MeshError, Result};
use crate::geometry::min_triangle_angle;
use crate::mesh::{Face, Mesh, MeshIndex, SurfacePointId};

/// Pick the fan root with the largest minimum angle.
///
/// Returns the root index and its score in radians, or `None` when the loop
/// has fewer than three corners or no root scores above zero.
pub fn best_fan_root(points: &[Point3<f64>]) -> Option<(usize, f64)> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for root in 0..n {
        let score = (2..n)
            .map(|j| {
                min_triangle_angle(
                    &points[root],
                    &points[(root + j - 1) % n],
                    &points[(root + j) % n],
                )
            })
            .fold(f64::INFINITY, f64::min);

        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((root, score));
        }
    }
    best
}

/// Corner triples of the fan rooted at `root` over `n` corners.
pub fn fan(root: usize, n: usize) -> Vec<[usize; 3]> {
    (2..n)
        .map(|j| [root % n, (root + j - 1) % n, (root + j) % n])
        .collect()
}

/// Triangulate a polygon given by its corner positions.
///
/// Returns corner triples indexing into `points`. A triangle has a single
/// fan and is returned as is, even when its corners are collinear.
pub fn triangulate_points(points: &[Point3<f64>]) -> Result<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Err(MeshError::DegeneratePolygon {
            corners: n,
            reason: "fewer than three corners",
        });
    }
    if n == 3 {
        return Ok(vec![[0, 1, 2]]);
    }
    match best_fan_root(points) {
        Some((root, _)) => Ok(fan(root, n)),
        None => {
            warn!(corners = n, "polygon has no non-degenerate fan");
            Err(MeshError::DegeneratePolygon {
                corners: n,
                reason: "every fan contains a zero-angle triangle",
            })
        }
    }
}

/// Triangulate a loop of linked surface points into unregistered faces.
///
/// The faces still have to be added with [`Mesh::add_face`].
pub fn triangulate<I: MeshIndex>(mesh: &Mesh<I>, corners: &[SurfacePointId<I>]) -> Result<Vec<Face<I>>> {
    let mut points = Vec::with_capacity(corners.len());
    for &v in corners {
        let sp = mesh
            .get_surface_point(v)
            .ok_or_else(|| MeshError::InvalidId(format!("{:?}", v)))?;
        let node = mesh
            .get_node(sp.node())
            .ok_or(MeshError::UnlinkedSurfacePoint(v.index()))?;
        points.push(node.position);
    }

    Ok(triangulate_points(&points)?
        .into_iter()
        .map(|[a, b, c]| Face::new(corners[a], corners[b], corners[c]))
        .collect())
}
