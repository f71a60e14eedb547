//! Boundary classification of owned faces.
//!
//! An owned face is a boundary face when one of its neighbour slots is empty
//! (a true mesh edge, `is_global_boundary = true`) or when one of its
//! neighbours belongs to another rank (a partition seam,
//! `is_global_boundary = false`).

use crate::partitioning::context::RankContext;
use crate::topology::mesh::Face;
use rayon::prelude::*;

/// Owned faces per worker chunk.
const CHUNK_SIZE: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryFace {
    pub face: usize,
    /// True when the face touches a real mesh edge rather than only a
    /// partition seam.
    pub is_global_boundary: bool,
}

#[inline]
fn classify(ctx: &RankContext<'_>, face: &Face) -> Option<BoundaryFace> {
    if face.touches_mesh_boundary() {
        return Some(BoundaryFace {
            face: face.id,
            is_global_boundary: true,
        });
    }
    let owned_neighbors = face
        .neighbors
        .iter()
        .flatten()
        .filter(|&&n| ctx.is_owned(n))
        .count();
    (owned_neighbors < 3).then_some(BoundaryFace {
        face: face.id,
        is_global_boundary: false,
    })
}

/// Classify the owned faces of `ctx` in parallel.
///
/// Workers scan disjoint chunks of the owned face list into private buffers
/// that are merged once all chunks are done. The returned set is
/// deterministic; its order is unspecified.
pub fn classify_local_boundary(ctx: &RankContext<'_>) -> Vec<BoundaryFace> {
    let mesh = ctx.mesh();
    let buffers: Vec<Vec<BoundaryFace>> = ctx
        .local_faces()
        .par_chunks(CHUNK_SIZE)
        .map(|chunk| {
            chunk
                .iter()
                .filter_map(|&f| classify(ctx, mesh.face(f)))
                .collect()
        })
        .collect();

    let mut boundary = Vec::with_capacity(buffers.iter().map(Vec::len).sum());
    for buf in buffers {
        boundary.extend(buf);
    }

    log::debug!(
        "Rank {}: {} boundary faces ({} on the mesh edge)",
        ctx.rank(),
        boundary.len(),
        boundary.iter().filter(|b| b.is_global_boundary).count()
    );
    boundary
}
