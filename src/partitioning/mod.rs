//! Domain decomposition of a global triangle mesh into per-rank partitions
//! with ghost halos.
//!
//! The stages of one rank build, in order:
//! [`assign`] (owned ranges), [`boundary`], [`ghost`] (NEIGH then DIST),
//! [`comm_plan`], [`parameters`] and [`reorder`]. [`driver`] runs them for
//! every rank and writes the manifest.

pub mod assign;
pub mod boundary;
pub mod comm_plan;
pub mod context;
pub mod driver;
pub mod ghost;
pub mod parameters;
pub mod reorder;

pub use assign::PartitionLayout;
pub use boundary::{classify_local_boundary, BoundaryFace};
pub use comm_plan::{CommunicationPlan, PartnerRange};
pub use context::{Partition, RankContext};
pub use driver::{
    build_partition, partition_mesh, MeshInput, PartitionConfig, PartitionRun,
    DEFAULT_MAX_GHOST_DISTANCE,
};
pub use ghost::{resolve_distance_ghosts, resolve_neighbor_ghosts};
pub use parameters::ParameterSources;
pub use reorder::{assemble_partition, write_partition_artifact, PartitionArtifact};

/// Whether partitions carry their ghost halo.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PartitionMode {
    /// Owned faces plus ghosts; artifacts are flagged as partitions.
    #[default]
    Distributed,
    /// Owned faces of a single rank, for debugging. Not usable for
    /// distributed runs.
    Standalone,
}

/// What to do when two parameter sources provide the same field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Abort the run.
    #[default]
    Reject,
    /// Log the replacement and let the later source win.
    KeepLast,
}
