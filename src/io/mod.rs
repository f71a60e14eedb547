//! Mesh and parameter I/O.
//!
//! - [`store`]: the self-describing binary container, built on the fixed
//!   records in [`wire`].
//! - [`mesh_store`] and [`param_store`]: mesh and parameter files on top of
//!   the container.
//! - [`exchange`]: the JSON exchange format and its conversion to stores.
//! - [`manifest`]: the per-run JSON index of partition artifacts.

pub mod exchange;
pub mod manifest;
pub mod mesh_store;
pub mod param_store;
pub mod store;
pub mod wire;

pub use exchange::{convert_exchange, ConvertedStores};
pub use manifest::Manifest;
pub use mesh_store::{read_global_mesh, read_mesh_file, write_global_mesh, write_mesh_file, MeshFile};
pub use param_store::{read_parameter_file, write_parameter_file, ParameterReader, ParameterSet};
