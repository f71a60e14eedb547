//! Per-rank build state.
//!
//! A [`RankContext`] is created fresh from the immutable global mesh for each
//! rank and consumed by [`RankContext::finish`]. Nothing is shared between
//! rank builds, so no tag state needs resetting.

use crate::mesh_error::MeshPartitionError;
use crate::partitioning::assign::PartitionLayout;
use crate::partitioning::boundary::BoundaryFace;
use crate::partitioning::comm_plan::CommunicationPlan;
use crate::topology::face_meta::{FaceMeta, GhostType};
use crate::topology::mesh::GlobalMesh;
use hashbrown::HashMap;
use std::ops::Range;

pub struct RankContext<'m> {
    mesh: &'m GlobalMesh,
    layout: &'m PartitionLayout,
    rank: usize,
    owned: Range<usize>,
    /// Owned global ids in ascending order.
    local_faces: Vec<usize>,
    /// Owned global id -> index into `local_faces`.
    global_to_local: HashMap<usize, usize>,
    /// One record per global face.
    meta: Vec<FaceMeta>,
}

impl<'m> RankContext<'m> {
    pub fn new(
        mesh: &'m GlobalMesh,
        layout: &'m PartitionLayout,
        rank: usize,
    ) -> Result<Self, MeshPartitionError> {
        if rank >= layout.n_ranks() {
            return Err(MeshPartitionError::RankOutOfRange {
                rank,
                ranks: layout.n_ranks(),
            });
        }
        if layout.n_faces() != mesh.n_faces() {
            return Err(MeshPartitionError::InvalidArgument {
                arg: "layout".into(),
                reason: format!(
                    "layout covers {} faces, mesh has {}",
                    layout.n_faces(),
                    mesh.n_faces()
                ),
            });
        }
        let owned = layout.range(rank);
        let local_faces: Vec<usize> = owned.clone().collect();
        let global_to_local = local_faces
            .iter()
            .enumerate()
            .map(|(local, &global)| (global, local))
            .collect();

        let mut meta = Vec::with_capacity(mesh.n_faces());
        for r in 0..layout.n_ranks() {
            meta.extend(layout.range(r).map(|_| FaceMeta::for_rank(r, rank)));
        }

        log::debug!(
            "Rank {rank}: start = {}, end = {}, number = {}",
            owned.start,
            owned.end,
            owned.len()
        );

        Ok(Self {
            mesh,
            layout,
            rank,
            owned,
            local_faces,
            global_to_local,
            meta,
        })
    }

    #[inline]
    pub fn mesh(&self) -> &'m GlobalMesh {
        self.mesh
    }

    #[inline]
    pub fn layout(&self) -> &'m PartitionLayout {
        self.layout
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn owned(&self) -> Range<usize> {
        self.owned.clone()
    }

    pub fn local_faces(&self) -> &[usize] {
        &self.local_faces
    }

    /// Local index of an owned face.
    pub fn local_index(&self, global_id: usize) -> Option<usize> {
        self.global_to_local.get(&global_id).copied()
    }

    #[inline]
    pub fn is_owned(&self, global_id: usize) -> bool {
        self.owned.contains(&global_id)
    }

    #[inline]
    pub fn meta(&self, global_id: usize) -> &FaceMeta {
        &self.meta[global_id]
    }

    /// Record how a non-owned face entered the halo. Tags are sticky: a face
    /// already tagged keeps its first tag.
    pub(crate) fn tag_ghost(&mut self, global_id: usize, ghost_type: GhostType) -> bool {
        let m = &mut self.meta[global_id];
        debug_assert!(m.is_ghost);
        if m.ghost_type == GhostType::None {
            m.ghost_type = ghost_type;
            true
        } else {
            false
        }
    }

    /// Close the build, keeping the metadata of the faces in the partition.
    pub fn finish(self, boundary_faces: Vec<BoundaryFace>, plan: CommunicationPlan) -> Partition {
        let meta = self
            .local_faces
            .iter()
            .chain(plan.ghosts())
            .map(|&g| (g, self.meta[g]))
            .collect();
        Partition {
            rank: self.rank,
            owned: self.owned,
            local_faces: self.local_faces,
            boundary_faces,
            plan,
            meta,
        }
    }
}

/// Result of one rank build.
#[derive(Clone, Debug)]
pub struct Partition {
    pub rank: usize,
    pub owned: Range<usize>,
    /// Owned global ids, ascending.
    pub local_faces: Vec<usize>,
    pub boundary_faces: Vec<BoundaryFace>,
    pub plan: CommunicationPlan,
    /// Metadata of owned and ghost faces, keyed by global id.
    pub meta: HashMap<usize, FaceMeta>,
}

impl Partition {
    #[inline]
    pub fn ghosts(&self) -> &[usize] {
        self.plan.ghosts()
    }

    pub fn ghost_type(&self, global_id: usize) -> Option<GhostType> {
        self.meta.get(&global_id).map(|m| m.ghost_type)
    }

    pub fn owner(&self, global_id: usize) -> Option<usize> {
        self.meta.get(&global_id).map(|m| m.owner)
    }
}
