//! Error types for quilt.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// An entity was removed while other entities still refer to it.
    #[error("cannot remove {entity}: {count} adjacent element(s) still attached")]
    AdjacencyNotEmpty {
        /// Debug name of the entity (e.g. `N(3)`).
        entity: String,
        /// Number of adjacent elements still attached.
        count: usize,
    },

    /// An edge between the two nodes already exists.
    #[error("an edge between nodes {n0} and {n1} already exists")]
    DuplicateEdge {
        /// First node index.
        n0: usize,
        /// Second node index.
        n1: usize,
    },

    /// An edge connects a node to itself.
    #[error("edge endpoints are the same node {node}")]
    DegenerateEdge {
        /// The repeated node index.
        node: usize,
    },

    /// A face uses the same node for more than one corner.
    #[error("face uses node {node} more than once")]
    DegenerateFace {
        /// The repeated node index.
        node: usize,
    },

    /// The face would be a third face on an edge.
    #[error("edge ({n0}, {n1}) already has two faces")]
    NonManifoldEdge {
        /// First node of the edge.
        n0: usize,
        /// Second node of the edge.
        n1: usize,
    },

    /// A surface point with faces cannot be moved to another node.
    #[error("surface point {surface_point} is used by faces of node {current} and cannot move to node {requested}")]
    SurfacePointInUse {
        /// The surface point index.
        surface_point: usize,
        /// Node it is linked to now.
        current: usize,
        /// Node it was asked to move to.
        requested: usize,
    },

    /// A polygon references a vertex that does not exist.
    #[error("polygon {polygon} references invalid vertex {vertex}")]
    InvalidVertexIndex {
        /// The polygon index.
        polygon: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A surface point is not attached to any node.
    #[error("surface point {0} is not linked to a node")]
    UnlinkedSurfacePoint(usize),

    /// An id does not name a live entity.
    #[error("{0} does not refer to a live element")]
    InvalidId(String),

    /// A polygon cannot be triangulated.
    #[error("polygon with {corners} corner(s) cannot be triangulated: {reason}")]
    DegeneratePolygon {
        /// Number of corners in the input loop.
        corners: usize,
        /// Why triangulation failed.
        reason: &'static str,
    },

    /// A record in a surface file is malformed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the record.
        message: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl MeshError {
    /// Create a parse error for the given 1-based line.
    pub fn parse<T: std::fmt::Display>(line: usize, message: T) -> Self {
        MeshError::Parse {
            line,
            message: message.to_string(),
        }
    }

    /// Create an adjacency error for an entity that still has neighbors.
    pub(crate) fn adjacency<T: std::fmt::Debug>(entity: T, count: usize) -> Self {
        MeshError::AdjacencyNotEmpty {
            entity: format!("{:?}", entity),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = MeshError::parse(12, "expected 3 coordinates");
        assert_eq!(err.to_string(), "line 12: expected 3 coordinates");
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MeshError = io.into();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
