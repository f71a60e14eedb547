//! MeshPartitionError: Unified error type for halo-partition public APIs
//!
//! Every fallible operation in the crate (store I/O, mesh validation,
//! partitioning, configuration) reports through this enum. All variants are
//! fatal for the run that produced them: the driver logs them and aborts
//! without writing a manifest.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for halo-partition operations.
#[derive(Debug, Error)]
pub enum MeshPartitionError {
    /// Underlying filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The store container bytes are not a valid store (bad magic, truncated directory, ...).
    #[error("Malformed store: {0}")]
    StoreFormat(String),
    /// A required dataset is absent from a store.
    #[error("Missing required dataset `{0}`")]
    MissingDataset(String),
    /// A required attribute is absent from a store.
    #[error("Missing required attribute `{0}`")]
    MissingAttribute(String),
    /// A dataset exists but has the wrong element type or row width.
    #[error("Dataset `{name}` has unexpected layout: expected {expected}, found {found}")]
    DatasetLayout {
        name: String,
        expected: String,
        found: String,
    },
    /// A hyperslab or single-element read went past the end of a dataset.
    #[error("Read of `{name}` rows {offset}..{end} exceeds dataset length {len}")]
    SelectionOutOfBounds {
        name: String,
        offset: usize,
        end: usize,
        len: usize,
    },
    /// A face references a neighbour index outside the element table.
    #[error("Face {face} has out of bound neighbor {neighbor} (element count {n_faces})")]
    NeighborOutOfBounds {
        face: usize,
        neighbor: i64,
        n_faces: usize,
    },
    /// The neighbour table length differs from the element table length.
    #[error("Expected {expected} neighbor lists, got {found}")]
    NeighborCountMismatch { expected: usize, found: usize },
    /// A face references a vertex outside the vertex table.
    #[error("Face {face} references vertex {vertex} but only {n_vertices} vertices exist")]
    VertexOutOfBounds {
        face: usize,
        vertex: i64,
        n_vertices: usize,
    },
    /// Face or vertex count exceeds what the `i32` on-disk ids can address.
    #[error("Mesh has {count} {what}; at most {max} are supported")]
    MeshTooLarge {
        what: &'static str,
        count: usize,
        max: usize,
    },
    /// The stored global id of a face does not match its position.
    #[error("Face at row {row} carries global id {found}; global ids must match row order")]
    GlobalIdOrder { row: usize, found: i64 },
    /// The projection string does not fit the fixed on-disk width.
    #[error("Projection string needs to be < {max} bytes. Length: {len}")]
    ProjectionTooLong { len: usize, max: usize },
    /// Partitioning needs more than one rank.
    #[error("Requires ranks > 1, got {0}")]
    InvalidRankCount(usize),
    /// A requested rank is not part of the decomposition.
    #[error("Rank {rank} is out of range for {ranks} ranks")]
    RankOutOfRange { rank: usize, ranks: usize },
    /// A required input was not supplied.
    #[error("{0} required")]
    MissingInput(&'static str),
    /// A command line or configuration value could not be used.
    #[error("Invalid argument `{arg}`: {reason}")]
    InvalidArgument { arg: String, reason: String },
    /// Geographic meshes need per-face triangle areas.
    #[error(
        "Geographic meshes require the triangle area be present in a parameter file. Please include `{0}`."
    )]
    MissingTriangleArea(&'static str),
    /// The same parameter name was provided by more than one source.
    #[error("Parameter `{name}` is provided by both {first} and {second}")]
    DuplicateParameter {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// A parameter field does not have one value per global face.
    #[error("Parameter `{name}` has {found} values, expected {expected}")]
    ParameterLength {
        name: String,
        expected: usize,
        found: usize,
    },
    /// The JSON exchange format could not be parsed or is inconsistent.
    #[error("Exchange format error: {0}")]
    Exchange(String),
    /// The manifest could not be written or parsed.
    #[error("Manifest error: {0}")]
    Manifest(String),
    /// A partition manifest was given where a mesh was expected.
    #[error("Cannot run this tool with a .partition mesh input: {0}")]
    PartitionedInput(PathBuf),
    /// The mesh input extension is not recognised.
    #[error("Unsupported mesh input {0}; expected a .mstore store or a .mesh exchange file")]
    UnsupportedInput(PathBuf),
}
