//! Typed per-face partition metadata.
//!
//! Each rank build carries one [`FaceMeta`] per global face: the owning rank,
//! whether the face is a ghost on the rank being built, and how the ghost was
//! discovered. The record is rebuilt from scratch for every rank.

/// How a face entered a rank's halo.
///
/// The discriminants are the on-disk codes of the `ghost_type` dataset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum GhostType {
    /// Owned by the rank (not a ghost).
    #[default]
    None = 0,
    /// Direct neighbour of a boundary face.
    Neigh = 1,
    /// Found only by the distance search.
    Dist = 2,
}

impl GhostType {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(GhostType::None),
            1 => Some(GhostType::Neigh),
            2 => Some(GhostType::Dist),
            _ => None,
        }
    }
}

/// Partition metadata attached to a face for the duration of one rank build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceMeta {
    pub owner: usize,
    pub is_ghost: bool,
    pub ghost_type: GhostType,
}

impl FaceMeta {
    pub fn for_rank(owner: usize, rank: usize) -> Self {
        Self {
            owner,
            is_ghost: owner != rank,
            ghost_type: GhostType::None,
        }
    }
}
