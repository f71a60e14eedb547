//! Run configuration and the sequential per-rank pipeline.
//!
//! For each rank the driver builds a fresh [`RankContext`], classifies the
//! boundary, resolves the NEIGH then DIST ghosts, plans communication, loads
//! the parameters and writes the sorted artifacts. Ranks are processed one
//! after the other; the manifest is written only once every rank succeeded.

use crate::geometry::locator::FaceLocator;
use crate::io::manifest::Manifest;
use crate::io::mesh_store::read_global_mesh;
use crate::io::param_store::TRIANGLE_AREA;
use crate::mesh_error::MeshPartitionError;
use crate::partitioning::assign::PartitionLayout;
use crate::partitioning::boundary::classify_local_boundary;
use crate::partitioning::comm_plan::CommunicationPlan;
use crate::partitioning::context::{Partition, RankContext};
use crate::partitioning::ghost::{resolve_distance_ghosts, resolve_neighbor_ghosts};
use crate::partitioning::parameters::ParameterSources;
use crate::partitioning::reorder::{assemble_partition, write_partition_artifact};
use crate::partitioning::{DuplicatePolicy, PartitionMode};
use crate::topology::mesh::GlobalMesh;
use std::fs;
use std::path::{Path, PathBuf};

/// Ghost search radius used when none is configured.
pub const DEFAULT_MAX_GHOST_DISTANCE: f64 = 100.0;

/// Extension of mesh and parameter store files.
pub const STORE_EXTENSION: &str = "mstore";
/// Extension of JSON exchange meshes.
pub const EXCHANGE_EXTENSION: &str = "mesh";
/// Extension of partition manifests.
pub const MANIFEST_EXTENSION: &str = "partition";

#[derive(Clone, Debug)]
pub struct PartitionConfig {
    pub mesh_path: PathBuf,
    pub param_paths: Vec<PathBuf>,
    pub ranks: usize,
    pub max_ghost_distance: f64,
    /// Build only this rank, owned faces only.
    pub standalone_rank: Option<usize>,
    pub duplicate_policy: DuplicatePolicy,
    /// Directory for the manifest and partition directory; defaults to the
    /// mesh's directory.
    pub output_dir: Option<PathBuf>,
}

impl PartitionConfig {
    pub fn new(mesh_path: impl Into<PathBuf>, ranks: usize) -> Self {
        Self {
            mesh_path: mesh_path.into(),
            param_paths: Vec::new(),
            ranks,
            max_ghost_distance: DEFAULT_MAX_GHOST_DISTANCE,
            standalone_rank: None,
            duplicate_policy: DuplicatePolicy::default(),
            output_dir: None,
        }
    }

    pub fn validate(&self) -> Result<(), MeshPartitionError> {
        if self.ranks <= 1 {
            return Err(MeshPartitionError::InvalidRankCount(self.ranks));
        }
        if !self.max_ghost_distance.is_finite() || self.max_ghost_distance < 0.0 {
            return Err(MeshPartitionError::InvalidArgument {
                arg: "max-ghost-distance".into(),
                reason: format!(
                    "must be a finite, non-negative distance, got {}",
                    self.max_ghost_distance
                ),
            });
        }
        if let Some(rank) = self.standalone_rank {
            if rank >= self.ranks {
                return Err(MeshPartitionError::RankOutOfRange {
                    rank,
                    ranks: self.ranks,
                });
            }
        }
        for p in &self.param_paths {
            if !p.is_file() {
                return Err(MeshPartitionError::InvalidArgument {
                    arg: "param-file".into(),
                    reason: format!("{} does not exist", p.display()),
                });
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> PartitionMode {
        match self.standalone_rank {
            Some(_) => PartitionMode::Standalone,
            None => PartitionMode::Distributed,
        }
    }
}

/// Kind of mesh input, decided from the file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshInput {
    Store(PathBuf),
    Exchange(PathBuf),
}

impl MeshInput {
    pub fn classify(path: &Path) -> Result<Self, MeshPartitionError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(MANIFEST_EXTENSION) => Err(MeshPartitionError::PartitionedInput(path.to_path_buf())),
            Some(EXCHANGE_EXTENSION) => Ok(MeshInput::Exchange(path.to_path_buf())),
            Some(STORE_EXTENSION) => Ok(MeshInput::Store(path.to_path_buf())),
            _ => Err(MeshPartitionError::UnsupportedInput(path.to_path_buf())),
        }
    }
}

/// Topology part of one rank build: boundary, ghost halo and communication
/// plan. `radius <= 0` keeps the halo to NEIGH ghosts.
pub fn build_partition(
    mesh: &GlobalMesh,
    layout: &PartitionLayout,
    locator: &FaceLocator,
    rank: usize,
    radius: f64,
) -> Result<Partition, MeshPartitionError> {
    let mut ctx = RankContext::new(mesh, layout, rank)?;
    let boundary = classify_local_boundary(&ctx);
    let neigh = resolve_neighbor_ghosts(&mut ctx, &boundary);
    let dist = resolve_distance_ghosts(&mut ctx, locator, &boundary, radius);
    let plan = CommunicationPlan::build(&neigh, &dist, layout);

    log::info!(
        "Rank {rank}: {} owned, {} boundary, {} ghosts ({} NEIGH, {} DIST), {} partners",
        ctx.local_faces().len(),
        boundary.len(),
        plan.ghosts().len(),
        neigh.len(),
        dist.len(),
        plan.num_partners()
    );
    Ok(ctx.finish(boundary, plan))
}

/// Outcome of [`partition_mesh`].
#[derive(Clone, Debug)]
pub struct PartitionRun {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    /// Directory holding the artifacts; manifest entries are relative to the
    /// manifest's directory.
    pub partition_dir: PathBuf,
}

impl PartitionRun {
    /// Absolute paths of the `(mesh, parameters)` artifacts of manifest entry `i`.
    pub fn artifact_paths(&self, i: usize) -> (PathBuf, PathBuf) {
        let base = self.manifest_path.parent().unwrap_or_else(|| Path::new(""));
        (
            base.join(&self.manifest.meshes[i]),
            base.join(&self.manifest.parameters[i]),
        )
    }
}

fn log_failure<T>(
    result: Result<T, MeshPartitionError>,
    what: impl FnOnce() -> String,
) -> Result<T, MeshPartitionError> {
    result.inspect_err(|e| log::error!("{}: {e}", what()))
}

/// Partition a mesh store and its parameter stores.
pub fn partition_mesh(config: &PartitionConfig) -> Result<PartitionRun, MeshPartitionError> {
    config.validate()?;
    let mode = config.mode();
    let ranks = config.ranks;

    let store_path = match MeshInput::classify(&config.mesh_path)? {
        MeshInput::Store(p) => p,
        MeshInput::Exchange(p) => {
            return Err(MeshPartitionError::InvalidArgument {
                arg: "mesh-file".into(),
                reason: format!("{} must be converted to a store first", p.display()),
            });
        }
    };

    let mesh = log_failure(read_global_mesh(&store_path), || {
        format!("Failed to read mesh {}", store_path.display())
    })?;
    let mut sources = log_failure(
        ParameterSources::open(&config.param_paths, config.duplicate_policy, mesh.n_faces()),
        || "Failed to open parameter files".to_string(),
    )?;
    if mesh.is_geographic() && !sources.contains(TRIANGLE_AREA) {
        return Err(MeshPartitionError::MissingTriangleArea(TRIANGLE_AREA));
    }

    let layout = PartitionLayout::new(mesh.n_faces(), ranks)?;
    let locator = FaceLocator::new(&mesh);

    let stem = store_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    let out_dir = match &config.output_dir {
        Some(d) => d.clone(),
        None => store_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let dir_name = format!("{stem}.np{ranks}.{MANIFEST_EXTENSION}.meshes");
    let partition_dir = out_dir.join(&dir_name);
    fs::create_dir_all(&partition_dir)?;

    let rank_range = match config.standalone_rank {
        Some(r) => r..r + 1,
        None => 0..ranks,
    };

    let mut manifest = Manifest::new(ranks, config.max_ghost_distance, mesh.n_faces());
    for rank in rank_range {
        let partition = build_partition(&mesh, &layout, &locator, rank, config.max_ghost_distance)?;
        let ghosts: &[usize] = match mode {
            PartitionMode::Distributed => partition.ghosts(),
            PartitionMode::Standalone => &[],
        };
        let params = log_failure(
            sources.load_for_partition(partition.owned.clone(), ghosts, mode),
            || format!("Failed to load parameters for rank {rank}"),
        )?;
        let artifact = assemble_partition(&mesh, &partition, params, mode)?;
        let (mesh_out, param_out) = log_failure(
            write_partition_artifact(&partition_dir, &stem, mode, &artifact),
            || format!("Failed to write artifacts of rank {rank} to {}", partition_dir.display()),
        )?;

        let relative = |p: &Path| match p.file_name() {
            Some(name) => Path::new(&dir_name).join(name),
            None => p.to_path_buf(),
        };
        manifest.push(relative(&mesh_out), relative(&param_out));
    }

    let manifest_path = out_dir.join(format!("{stem}.np{ranks}.{MANIFEST_EXTENSION}"));
    log_failure(manifest.write(&manifest_path), || {
        format!("Failed to write manifest {}", manifest_path.display())
    })?;
    log::info!("Wrote manifest {}", manifest_path.display());

    Ok(PartitionRun {
        manifest,
        manifest_path,
        partition_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_kinds() {
        assert_eq!(
            MeshInput::classify(Path::new("a/basin.mstore")).unwrap(),
            MeshInput::Store("a/basin.mstore".into())
        );
        assert_eq!(
            MeshInput::classify(Path::new("basin.mesh")).unwrap(),
            MeshInput::Exchange("basin.mesh".into())
        );
        assert!(matches!(
            MeshInput::classify(Path::new("basin.np4.partition")),
            Err(MeshPartitionError::PartitionedInput(_))
        ));
        assert!(matches!(
            MeshInput::classify(Path::new("basin.vtu")),
            Err(MeshPartitionError::UnsupportedInput(_))
        ));
    }

    #[test]
    fn config_validation() {
        let mut cfg = PartitionConfig::new("basin.mstore", 1);
        assert!(matches!(cfg.validate(), Err(MeshPartitionError::InvalidRankCount(1))));

        cfg.ranks = 4;
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.mode(), PartitionMode::Distributed);

        cfg.standalone_rank = Some(4);
        assert!(matches!(
            cfg.validate(),
            Err(MeshPartitionError::RankOutOfRange { rank: 4, ranks: 4 })
        ));
        cfg.standalone_rank = Some(3);
        assert_eq!(cfg.mode(), PartitionMode::Standalone);

        cfg.max_ghost_distance = f64::NAN;
        assert!(cfg.validate().is_err());
        cfg.max_ghost_distance = 0.0;
        assert!(cfg.validate().is_ok());

        cfg.param_paths.push("definitely/missing.mstore".into());
        assert!(cfg.validate().is_err());
    }
}
