//! Mesh topology: the immutable global mesh arena and per-rank face metadata.

pub mod face_meta;
pub mod mesh;

pub use face_meta::{FaceMeta, GhostType};
pub use mesh::{Face, GlobalMesh, Vertex};
