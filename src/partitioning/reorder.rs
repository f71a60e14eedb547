//! Final ordering and serialization of a partition.
//!
//! Owned faces and, in distributed mode, ghosts are merged and sorted by
//! global id. The same permutation is applied to every parameter array, so
//! face `k` of the mesh artifact and value `k` of each parameter always
//! describe the same face. Vertices are renumbered into a compact local id
//! space in ascending global-id order.

use crate::io::mesh_store::{write_mesh_file, MeshFile, NO_NEIGHBOR};
use crate::io::param_store::{write_parameter_file, ParameterSet};
use crate::mesh_error::MeshPartitionError;
use crate::partitioning::context::Partition;
use crate::partitioning::PartitionMode;
use crate::topology::face_meta::GhostType;
use crate::topology::mesh::GlobalMesh;
use hashbrown::{HashMap, HashSet};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Indices that would sort `values` under `compare`.
pub fn sort_permutation<T, F>(values: &[T], mut compare: F) -> Vec<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut perm: Vec<usize> = (0..values.len()).collect();
    perm.sort_by(|&i, &j| compare(&values[i], &values[j]));
    perm
}

/// Reorder `values` so that `values[k]` becomes the old `values[perm[k]]`.
///
/// Follows the cycles of `perm` with one swap per moved element.
pub fn apply_permutation_in_place<T>(values: &mut [T], perm: &[usize]) {
    debug_assert_eq!(values.len(), perm.len());
    let mut done = vec![false; values.len()];
    for i in 0..values.len() {
        if done[i] {
            continue;
        }
        done[i] = true;
        let mut prev = i;
        let mut j = perm[i];
        while j != i {
            values.swap(prev, j);
            done[j] = true;
            prev = j;
            j = perm[j];
        }
    }
}

/// A partition ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionArtifact {
    pub rank: usize,
    pub mesh: MeshFile,
    pub parameters: ParameterSet,
}

/// Merge, sort and relabel one partition.
///
/// `params` must be laid out as produced by
/// [`ParameterSources::load_for_partition`](crate::partitioning::parameters::ParameterSources::load_for_partition)
/// for the same `mode`: owned values followed by ghost values.
pub fn assemble_partition(
    mesh: &GlobalMesh,
    partition: &Partition,
    mut params: ParameterSet,
    mode: PartitionMode,
) -> Result<PartitionArtifact, MeshPartitionError> {
    let mut faces = partition.local_faces.clone();
    if mode == PartitionMode::Distributed {
        faces.extend_from_slice(partition.ghosts());
    }

    let perm = sort_permutation(&faces, |a, b| a.cmp(b));
    apply_permutation_in_place(&mut faces, &perm);
    for (name, values) in params.iter_mut() {
        if values.len() != faces.len() {
            return Err(MeshPartitionError::ParameterLength {
                name: name.to_string(),
                expected: faces.len(),
                found: values.len(),
            });
        }
        apply_permutation_in_place(values, &perm);
    }

    let vertex_ids: BTreeSet<usize> = faces
        .iter()
        .flat_map(|&f| mesh.face(f).vertices)
        .collect();
    let local_vertex: HashMap<usize, i32> = vertex_ids
        .iter()
        .enumerate()
        .map(|(local, &global)| (global, local as i32))
        .collect();
    log::debug!(
        "Rank {}: {} faces, unique vertex count: {}",
        partition.rank,
        faces.len(),
        vertex_ids.len()
    );

    let present: HashSet<usize> = faces.iter().copied().collect();
    let mut global_ids = Vec::with_capacity(faces.len());
    let mut elements = Vec::with_capacity(faces.len());
    let mut neighbors = Vec::with_capacity(faces.len());
    let mut ghost_types = Vec::with_capacity(faces.len());
    for &f in &faces {
        let face = mesh.face(f);
        global_ids.push(f as i32);
        elements.push(face.vertices.map(|v| local_vertex[&v]));
        neighbors.push(face.neighbors.map(|n| match n {
            Some(n) if present.contains(&n) => n as i32,
            _ => NO_NEIGHBOR,
        }));
        let ghost_type = partition.ghost_type(f).unwrap_or(GhostType::None);
        ghost_types.push(ghost_type.code());
    }

    let vertices = vertex_ids.iter().map(|&v| mesh.vertex(v).point).collect();

    Ok(PartitionArtifact {
        rank: partition.rank,
        mesh: MeshFile {
            projection: mesh.projection().to_string(),
            is_geographic: mesh.is_geographic(),
            is_partition: Some(mode == PartitionMode::Distributed),
            global_ids,
            elements,
            neighbors,
            ghost_types: Some(ghost_types),
            vertices,
        },
        parameters: params,
    })
}

/// File names of one rank's mesh and parameter artifacts.
pub fn artifact_file_names(stem: &str, rank: usize, mode: PartitionMode) -> (String, String) {
    let tag = match mode {
        PartitionMode::Distributed => "",
        PartitionMode::Standalone => "standalone.",
    };
    (
        format!("{stem}.partition.{tag}{rank}_mesh.mstore"),
        format!("{stem}.partition.{tag}{rank}_param.mstore"),
    )
}

/// Write both artifacts of one rank into `dir`, returning their paths.
pub fn write_partition_artifact(
    dir: &Path,
    stem: &str,
    mode: PartitionMode,
    artifact: &PartitionArtifact,
) -> Result<(PathBuf, PathBuf), MeshPartitionError> {
    let (mesh_name, param_name) = artifact_file_names(stem, artifact.rank, mode);
    let mesh_path = dir.join(mesh_name);
    let param_path = dir.join(param_name);

    write_mesh_file(&mesh_path, &artifact.mesh)?;
    log::debug!("Wrote {}", mesh_path.display());
    write_parameter_file(&param_path, &artifact.parameters)?;
    log::debug!("Wrote {}", param_path.display());

    Ok((mesh_path, param_path))
}
