//! MeshStore: global meshes and per-rank partition mesh artifacts.
//!
//! Both use the same entry layout; partition artifacts additionally carry
//! `mesh/is_partition` and `mesh/ghost_type`. In a partition artifact the
//! element connectivity uses partition-local vertex ids and the neighbour
//! table holds global face ids, `-1` where the neighbour is absent from the
//! artifact.

use crate::io::store::{StoreReader, StoreWriter};
use crate::io::wire::StoreKind;
use crate::mesh_error::MeshPartitionError;
use crate::topology::mesh::{GlobalMesh, ensure_addressable};
use std::path::Path;

/// Fixed on-disk width of the projection attribute, terminator included.
pub const PROJECTION_WIDTH: usize = 256;

/// Sentinel for "no neighbour" in the neighbour dataset.
pub const NO_NEIGHBOR: i32 = -1;

pub const PROJ4: &str = "mesh/proj4";
pub const IS_GEOGRAPHIC: &str = "mesh/is_geographic";
pub const IS_PARTITION: &str = "mesh/is_partition";
pub const CELL_GLOBAL_ID: &str = "mesh/cell_global_id";
pub const ELEM: &str = "mesh/elem";
pub const NEIGHBOR: &str = "mesh/neighbor";
pub const VERTEX: &str = "mesh/vertex";
pub const GHOST_TYPE: &str = "mesh/ghost_type";

/// In-memory image of a mesh store file.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshFile {
    pub projection: String,
    pub is_geographic: bool,
    /// Present on partition artifacts only; `false` for standalone output.
    pub is_partition: Option<bool>,
    pub global_ids: Vec<i32>,
    pub elements: Vec<[i32; 3]>,
    pub neighbors: Vec<[i32; 3]>,
    /// Present on partition artifacts only.
    pub ghost_types: Option<Vec<i32>>,
    pub vertices: Vec<[f64; 3]>,
}

impl MeshFile {
    /// Image of an unpartitioned mesh.
    pub fn from_global_mesh(mesh: &GlobalMesh) -> Self {
        let faces = mesh.faces();
        Self {
            projection: mesh.projection().to_string(),
            is_geographic: mesh.is_geographic(),
            is_partition: None,
            global_ids: faces.iter().map(|f| f.id as i32).collect(),
            elements: faces
                .iter()
                .map(|f| f.vertices.map(|v| v as i32))
                .collect(),
            neighbors: faces
                .iter()
                .map(|f| f.neighbors.map(|n| n.map_or(NO_NEIGHBOR, |n| n as i32)))
                .collect(),
            ghost_types: None,
            vertices: mesh.vertices().iter().map(|v| v.point).collect(),
        }
    }

    /// Validate and convert into the global mesh arena.
    ///
    /// Global ids must equal row positions.
    pub fn into_global_mesh(self) -> Result<GlobalMesh, MeshPartitionError> {
        if self.global_ids.len() != self.elements.len() {
            return Err(MeshPartitionError::DatasetLayout {
                name: CELL_GLOBAL_ID.to_string(),
                expected: format!("{} rows", self.elements.len()),
                found: format!("{} rows", self.global_ids.len()),
            });
        }
        if let Some((row, &found)) = self
            .global_ids
            .iter()
            .enumerate()
            .find(|&(row, &id)| id as i64 != row as i64)
        {
            return Err(MeshPartitionError::GlobalIdOrder {
                row,
                found: found as i64,
            });
        }
        GlobalMesh::from_raw(
            self.vertices,
            &self.elements,
            &self.neighbors,
            self.projection,
            self.is_geographic,
        )
    }
}

/// Write a mesh store file.
///
/// Fails without touching `path` if the projection does not fit
/// [`PROJECTION_WIDTH`].
pub fn write_mesh_file(path: impl AsRef<Path>, mesh: &MeshFile) -> Result<(), MeshPartitionError> {
    if mesh.projection.len() >= PROJECTION_WIDTH {
        return Err(MeshPartitionError::ProjectionTooLong {
            len: mesh.projection.len(),
            max: PROJECTION_WIDTH,
        });
    }
    let mut w = StoreWriter::new(StoreKind::Mesh);
    w.attr_fixed_str(PROJ4, &mesh.projection, PROJECTION_WIDTH)?;
    w.attr_bool(IS_GEOGRAPHIC, mesh.is_geographic);
    if let Some(flag) = mesh.is_partition {
        w.attr_bool(IS_PARTITION, flag);
    }
    w.dataset_i32(CELL_GLOBAL_ID, 1, &mesh.global_ids);
    w.dataset_i32(ELEM, 3, bytemuck::cast_slice(&mesh.elements));
    w.dataset_i32(NEIGHBOR, 3, bytemuck::cast_slice(&mesh.neighbors));
    if let Some(ghosts) = &mesh.ghost_types {
        w.dataset_i32(GHOST_TYPE, 1, ghosts);
    }
    w.dataset_f64(VERTEX, 3, bytemuck::cast_slice(&mesh.vertices));
    w.write_to_path(path)
}

/// Read a mesh store file (global or partition).
pub fn read_mesh_file(path: impl AsRef<Path>) -> Result<MeshFile, MeshPartitionError> {
    let path = path.as_ref();
    let mut r = StoreReader::open(path)?;
    if r.kind() != StoreKind::Mesh {
        return Err(MeshPartitionError::StoreFormat(format!(
            "{} is not a mesh store",
            path.display()
        )));
    }

    let projection = r.read_str_attribute(PROJ4)?;
    let is_geographic = r.read_bool_attribute(IS_GEOGRAPHIC)?;
    let is_partition = if r.contains(IS_PARTITION) {
        Some(r.read_bool_attribute(IS_PARTITION)?)
    } else {
        None
    };
    // Partition artifacts always carry global ids; a global mesh may omit
    // them, in which case they are the row positions.
    let stored_ids = if r.contains(CELL_GLOBAL_ID) || is_partition.is_some() {
        Some(r.read_i32_dataset(CELL_GLOBAL_ID, 1)?)
    } else {
        None
    };
    let vertices = r.read_f64_rows::<3>(VERTEX)?;
    let elements = r.read_i32_rows::<3>(ELEM)?;
    let global_ids = match stored_ids {
        Some(ids) => ids,
        None => {
            ensure_addressable("faces", elements.len())?;
            (0..elements.len() as i32).collect()
        }
    };
    let neighbors = r.read_i32_rows::<3>(NEIGHBOR)?;
    let ghost_types = if r.contains(GHOST_TYPE) {
        Some(r.read_i32_dataset(GHOST_TYPE, 1)?)
    } else {
        None
    };

    log::debug!(
        "Read {}: {} faces, {} vertices",
        path.display(),
        elements.len(),
        vertices.len()
    );

    Ok(MeshFile {
        projection,
        is_geographic,
        is_partition,
        global_ids,
        elements,
        neighbors,
        ghost_types,
        vertices,
    })
}

/// Load and validate the unpartitioned mesh.
pub fn read_global_mesh(path: impl AsRef<Path>) -> Result<GlobalMesh, MeshPartitionError> {
    read_mesh_file(path)?.into_global_mesh()
}

/// Write the unpartitioned mesh.
pub fn write_global_mesh(
    path: impl AsRef<Path>,
    mesh: &GlobalMesh,
) -> Result<(), MeshPartitionError> {
    write_mesh_file(path, &MeshFile::from_global_mesh(mesh))
}

/// Read only the geographic flag of a mesh store.
pub fn check_is_geographic(path: impl AsRef<Path>) -> Result<bool, MeshPartitionError> {
    StoreReader::open(path)?.read_bool_attribute(IS_GEOGRAPHIC)
}
