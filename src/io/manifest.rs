//! Run manifest listing every rank's artifacts.

use crate::mesh_error::MeshPartitionError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// JSON manifest written next to the partition directory.
///
/// `meshes[i]` and `parameters[i]` belong to the same rank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub ranks: usize,
    pub max_ghost_distance: f64,
    pub num_global_faces: usize,
    pub meshes: Vec<PathBuf>,
    pub parameters: Vec<PathBuf>,
}

impl Manifest {
    pub fn new(ranks: usize, max_ghost_distance: f64, num_global_faces: usize) -> Self {
        Self {
            ranks,
            max_ghost_distance,
            num_global_faces,
            meshes: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Record one rank's artifact pair.
    pub fn push(&mut self, mesh: PathBuf, parameters: PathBuf) {
        self.meshes.push(mesh);
        self.parameters.push(parameters);
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), MeshPartitionError> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| MeshPartitionError::Manifest(e.to_string()))?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, MeshPartitionError> {
        let bytes = fs::read(path)?;
        let manifest: Manifest = serde_json::from_slice(&bytes)
            .map_err(|e| MeshPartitionError::Manifest(e.to_string()))?;
        if manifest.meshes.len() != manifest.parameters.len() {
            return Err(MeshPartitionError::Manifest(format!(
                "{} mesh artifacts but {} parameter artifacts",
                manifest.meshes.len(),
                manifest.parameters.len()
            )));
        }
        Ok(manifest)
    }
}
