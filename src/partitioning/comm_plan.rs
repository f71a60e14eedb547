//! Communication plan of a rank: which remote ranks own which ghosts.
//!
//! Ghosts are kept sorted by global id. Since every rank owns one contiguous
//! global-id range, the ghosts of one owner form one contiguous run of the
//! sorted list, described by a [`PartnerRange`].

use crate::partitioning::assign::PartitionLayout;
use hashbrown::HashMap;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Contiguous run of ghosts in the sorted ghost list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PartnerRange {
    pub offset: usize,
    pub count: usize,
}

impl PartnerRange {
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.count
    }
}

#[derive(Clone, Debug, Default)]
pub struct CommunicationPlan {
    ghosts: Vec<usize>,
    ghost_owners: Vec<usize>,
    partners: BTreeMap<usize, PartnerRange>,
    global_to_ghost: HashMap<usize, usize>,
}

impl CommunicationPlan {
    /// Merge the NEIGH and DIST ghost sets and group them by owner.
    pub fn build(neigh: &[usize], dist: &[usize], layout: &PartitionLayout) -> Self {
        let ghosts: Vec<usize> = neigh.iter().chain(dist).copied().sorted_unstable().dedup().collect();
        let ghost_owners: Vec<usize> = ghosts.iter().map(|&g| layout.owner_of(g)).collect();

        let mut partners = BTreeMap::new();
        let mut start = 0;
        for i in 1..=ghost_owners.len() {
            if i == ghost_owners.len() || ghost_owners[i] != ghost_owners[start] {
                partners.insert(
                    ghost_owners[start],
                    PartnerRange {
                        offset: start,
                        count: i - start,
                    },
                );
                start = i;
            }
        }

        let global_to_ghost = ghosts.iter().enumerate().map(|(i, &g)| (g, i)).collect();

        for (rank, r) in &partners {
            log::debug!(
                "Partner rank {rank}: ghost index {}..{} ({} faces)",
                r.offset,
                r.offset + r.count,
                r.count
            );
        }

        Self {
            ghosts,
            ghost_owners,
            partners,
            global_to_ghost,
        }
    }

    /// Ghost global ids, ascending.
    pub fn ghosts(&self) -> &[usize] {
        &self.ghosts
    }

    /// Owner rank of each entry of [`Self::ghosts`].
    pub fn ghost_owners(&self) -> &[usize] {
        &self.ghost_owners
    }

    pub fn partners(&self) -> &BTreeMap<usize, PartnerRange> {
        &self.partners
    }

    #[inline]
    pub fn num_partners(&self) -> usize {
        self.partners.len()
    }

    /// Index of `global_id` in the ghost list.
    pub fn ghost_index(&self, global_id: usize) -> Option<usize> {
        self.global_to_ghost.get(&global_id).copied()
    }

    /// Ghosts owned by `rank`.
    pub fn partner_slice(&self, rank: usize) -> &[usize] {
        self.partners
            .get(&rank)
            .map_or(&[][..], |r| &self.ghosts[r.range()])
    }
}
