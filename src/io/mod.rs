//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Read and written with the `e` record extension |
//! | Surface | `.surf` | ✓ | ✓ | Same text format under its own extension |
//!
//! # Usage
//!
//! ```no_run
//! use quilt::io::{load, save};
//! use quilt::mesh::Mesh;
//!
//! let mut mesh: Mesh = load("model.obj").unwrap();
//! save(&mut mesh, "output.surf").unwrap();
//! ```
//!
//! Use [`surface::read`] and [`surface::write`] to work with any reader or
//! writer instead of a path.

pub mod surface;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use crate::algo::normals::{recompute_normals, NormalOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, MeshIndex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ.
    Obj,
    /// Native surface extension.
    Surf,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "surf" => Some(Format::Surf),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Options applied while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Recompute face and node normals after loading (default: false).
    pub recompute_normals: bool,

    /// Options for the normal pass when `recompute_normals` is set.
    pub normals: NormalOptions,
}

impl LoadOptions {
    /// Set whether to recompute normals after loading.
    pub fn with_recompute_normals(mut self, recompute: bool) -> Self {
        self.recompute_normals = recompute;
        self
    }

    /// Set the options for the normal pass.
    pub fn with_normal_options(mut self, normals: NormalOptions) -> Self {
        self.normals = normals;
        self
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<Mesh<I>> {
    load_with_options(path, &LoadOptions::default())
}

/// Load a mesh from a file, then apply `options`.
///
/// The returned mesh is always new; nothing is returned on error.
pub fn load_with_options<P: AsRef<Path>, I: MeshIndex>(path: P, options: &LoadOptions) -> Result<Mesh<I>> {
    let path = path.as_ref();
    let format = detect(path)?;
    info!("Loading mesh from {:?} (format: {:?})", path, format);

    let file = File::open(path).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut mesh = match surface::read(BufReader::new(file)) {
        Ok(mesh) => mesh,
        Err(MeshError::Io(e)) => {
            return Err(MeshError::LoadError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
        Err(e) => return Err(e),
    };

    if options.recompute_normals {
        recompute_normals(&mut mesh, &options.normals);
    }

    info!(
        "Loaded mesh: {} nodes, {} surface points, {} faces",
        mesh.num_nodes(),
        mesh.num_surface_points(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Save a mesh to a file with automatic format detection.
///
/// Saving compacts the mesh's indices.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &mut Mesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = detect(path)?;
    info!("Saving mesh to {:?} (format: {:?})", path, format);

    let file = File::create(path).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    surface::write(mesh, BufWriter::new(file))?;

    info!(
        "Saved mesh: {} nodes, {} faces",
        mesh.num_nodes(),
        mesh.num_faces()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b.OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_path("mesh.surf"), Some(Format::Surf));
        assert_eq!(Format::from_path("mesh.stl"), None);
        assert_eq!(Format::from_path("mesh"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let result: Result<Mesh> = load("model.stl");
        assert!(matches!(result, Err(MeshError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result: Result<Mesh> = load("/nonexistent/definitely/missing.obj");
        match result {
            Err(MeshError::LoadError { path, .. }) => assert!(path.ends_with("missing.obj")),
            other => panic!("expected LoadError, got {:?}", other.map(|m| m.num_nodes())),
        }
    }
}
