//! JSON exchange format and its one-time conversion into store files.
//!
//! A `.mesh` exchange file looks like
//!
//! ```json
//! {"mesh": {"vertex": [[x, y, z], ...],
//!           "elem":   [[v0, v1, v2], ...],
//!           "neigh":  [[f0, f1, f2], ...],
//!           "is_geographic": false,
//!           "proj4": "+proj=utm ..."}}
//! ```
//!
//! and each parameter exchange file is an object mapping field names to one
//! value per face. Partitioning only runs on store files, so exchange inputs
//! are converted first.

use crate::io::mesh_store::write_global_mesh;
use crate::io::param_store::{write_parameter_file, ParameterSet, TRIANGLE_AREA};
use crate::mesh_error::MeshPartitionError;
use crate::topology::mesh::GlobalMesh;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeMesh {
    pub mesh: ExchangeMeshBody,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeMeshBody {
    pub vertex: Vec<[f64; 3]>,
    pub elem: Vec<[i32; 3]>,
    pub neigh: Vec<[i32; 3]>,
    #[serde(default)]
    pub is_geographic: bool,
    #[serde(default)]
    pub proj4: String,
}

/// Store files produced by [`convert_exchange`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedStores {
    pub mesh_path: PathBuf,
    pub param_path: PathBuf,
}

fn exchange_error(path: &Path, e: impl std::fmt::Display) -> MeshPartitionError {
    MeshPartitionError::Exchange(format!("{}: {e}", path.display()))
}

/// Parse and validate a `.mesh` exchange file.
pub fn read_exchange_mesh(path: impl AsRef<Path>) -> Result<GlobalMesh, MeshPartitionError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let doc: ExchangeMesh =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| exchange_error(path, e))?;
    let body = doc.mesh;
    GlobalMesh::from_raw(body.vertex, &body.elem, &body.neigh, body.proj4, body.is_geographic)
}

/// Merge parameter exchange files into one set.
///
/// Every field must have `n_faces` values and a name may appear in only one
/// file.
pub fn read_exchange_parameters(
    paths: &[PathBuf],
    n_faces: usize,
) -> Result<ParameterSet, MeshPartitionError> {
    let mut params = ParameterSet::new();
    let mut origin: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in paths {
        let file = File::open(path)?;
        let fields: BTreeMap<String, Vec<f64>> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| exchange_error(path, e))?;
        for (name, values) in fields {
            if values.len() != n_faces {
                return Err(MeshPartitionError::ParameterLength {
                    name,
                    expected: n_faces,
                    found: values.len(),
                });
            }
            if let Some(first) = origin.get(&name) {
                return Err(MeshPartitionError::DuplicateParameter {
                    name,
                    first: first.clone(),
                    second: path.clone(),
                });
            }
            log::debug!("Inserted parameter {name} from {}", path.display());
            origin.insert(name.clone(), path.clone());
            params.insert(name, values);
        }
    }
    Ok(params)
}

/// Convert an exchange mesh and its parameter files into store files written
/// next to the mesh as `<stem>_mesh.mstore` and `<stem>_param.mstore`.
pub fn convert_exchange(
    mesh_path: impl AsRef<Path>,
    param_paths: &[PathBuf],
) -> Result<ConvertedStores, MeshPartitionError> {
    let mesh_path = mesh_path.as_ref();
    let mesh = read_exchange_mesh(mesh_path)?;
    let params = read_exchange_parameters(param_paths, mesh.n_faces())?;

    if mesh.is_geographic() && !params.contains(TRIANGLE_AREA) {
        return Err(MeshPartitionError::MissingTriangleArea(TRIANGLE_AREA));
    }

    let stem = mesh_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    let dir = mesh_path.parent().unwrap_or_else(|| Path::new(""));
    let out = ConvertedStores {
        mesh_path: dir.join(format!("{stem}_mesh.mstore")),
        param_path: dir.join(format!("{stem}_param.mstore")),
    };

    log::info!("Converting mesh {} to store format", mesh_path.display());
    write_global_mesh(&out.mesh_path, &mesh)?;
    write_parameter_file(&out.param_path, &params)?;
    log::info!(
        "Wrote {} and {}",
        out.mesh_path.display(),
        out.param_path.display()
    );
    Ok(out)
}
