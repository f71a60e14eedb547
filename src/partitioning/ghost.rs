//! Ghost halo discovery.
//!
//! The adjacency phase adds every non-owned neighbour of a boundary face and
//! tags it [`GhostType::Neigh`]. The distance phase then searches around the
//! centroid of every boundary face and adds each non-owned face whose
//! centroid is strictly closer than the radius; faces not already NEIGH are
//! tagged [`GhostType::Dist`]. Both phases run on one thread.

use crate::geometry::locator::FaceLocator;
use crate::partitioning::boundary::BoundaryFace;
use crate::partitioning::context::RankContext;
use crate::topology::face_meta::GhostType;
use std::collections::BTreeSet;

/// Adjacency phase. Returns the NEIGH ghosts sorted by global id.
pub fn resolve_neighbor_ghosts(ctx: &mut RankContext<'_>, boundary: &[BoundaryFace]) -> Vec<usize> {
    let mesh = ctx.mesh();
    let mut ghosts = BTreeSet::new();
    for b in boundary {
        for &n in mesh.face(b.face).neighbors.iter().flatten() {
            if ctx.meta(n).is_ghost && ghosts.insert(n) {
                ctx.tag_ghost(n, GhostType::Neigh);
            }
        }
    }
    log::debug!("Rank {}: {} NEIGH ghosts", ctx.rank(), ghosts.len());
    ghosts.into_iter().collect()
}

/// Distance phase. Returns the faces tagged DIST, sorted by global id.
///
/// Must run after [`resolve_neighbor_ghosts`]. A non-positive `radius`
/// disables the phase.
pub fn resolve_distance_ghosts(
    ctx: &mut RankContext<'_>,
    locator: &FaceLocator,
    boundary: &[BoundaryFace],
    radius: f64,
) -> Vec<usize> {
    let mut ghosts = BTreeSet::new();
    if radius > 0.0 {
        for b in boundary {
            let origin = locator.centroid(b.face);
            for f in locator.faces_within(origin, radius) {
                if !ctx.meta(f).is_ghost || ghosts.contains(&f) {
                    continue;
                }
                if ctx.tag_ghost(f, GhostType::Dist) {
                    ghosts.insert(f);
                }
            }
        }
    }
    log::debug!(
        "Rank {}: {} DIST ghosts within {radius}",
        ctx.rank(),
        ghosts.len()
    );
    ghosts.into_iter().collect()
}
