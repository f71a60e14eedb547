//! # halo-partition
//!
//! halo-partition splits an unstructured triangular mesh into per-rank
//! partitions for distributed simulation codes. Each rank receives a
//! contiguous block of faces, a halo of ghost faces discovered by adjacency
//! and by distance, a communication plan grouping the ghosts by owning rank,
//! and its share of every per-face parameter field.
//!
//! ## Features
//! - Index-arena mesh topology with typed per-face partition metadata
//! - Parallel boundary classification, NEIGH and DIST ghost discovery
//! - Planar and geodesic distance metrics chosen once per mesh
//! - A binary store container for meshes and parameters with hyperslab reads
//! - JSON exchange-format conversion and a JSON run manifest
//!
//! ## Usage
//!
//! ```no_run
//! use halo_partition::prelude::*;
//!
//! let mut config = PartitionConfig::new("basin.mstore", 8);
//! config.param_paths.push("basin_param.mstore".into());
//! let run = partition_mesh(&config)?;
//! println!("manifest at {}", run.manifest_path.display());
//! # Ok::<(), MeshPartitionError>(())
//! ```
//!
//! Ranks are built one after the other from a fresh per-rank context; only
//! boundary classification runs on the rayon pool.

pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod mesh_generation;
pub mod partitioning;
pub mod topology;

/// A convenient prelude to import the most-used types:
pub mod prelude {
    pub use crate::geometry::locator::FaceLocator;
    pub use crate::geometry::metric::DistanceMetric;
    pub use crate::io::manifest::Manifest;
    pub use crate::io::mesh_store::{read_global_mesh, read_mesh_file, MeshFile};
    pub use crate::io::param_store::{read_parameter_file, ParameterSet};
    pub use crate::mesh_error::MeshPartitionError;
    pub use crate::partitioning::{
        build_partition, partition_mesh, DuplicatePolicy, Partition, PartitionConfig,
        PartitionLayout, PartitionMode,
    };
    pub use crate::topology::face_meta::{FaceMeta, GhostType};
    pub use crate::topology::mesh::{Face, GlobalMesh, Vertex};
}
