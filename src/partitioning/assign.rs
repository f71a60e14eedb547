//! Contiguous block assignment of global face ids to ranks.
//!
//! With `N` faces and `P` ranks every rank receives `N / P` faces and the
//! first `N % P` ranks one extra. Rank `r` owns the half-open range starting
//! at the prefix sum of the counts before it, so ownership of any face is a
//! binary search over the offsets.

use crate::mesh_error::MeshPartitionError;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionLayout {
    counts: Vec<usize>,
    /// `offsets[r]..offsets[r + 1]` is the range owned by rank `r`.
    offsets: Vec<usize>,
}

impl PartitionLayout {
    pub fn new(n_faces: usize, n_ranks: usize) -> Result<Self, MeshPartitionError> {
        if n_ranks == 0 {
            return Err(MeshPartitionError::InvalidRankCount(n_ranks));
        }
        let base = n_faces / n_ranks;
        let extra = n_faces % n_ranks;
        let counts: Vec<usize> = (0..n_ranks)
            .map(|r| base + usize::from(r < extra))
            .collect();

        let mut offsets = Vec::with_capacity(n_ranks + 1);
        offsets.push(0);
        let mut acc = 0;
        for &c in &counts {
            acc += c;
            offsets.push(acc);
        }
        debug_assert_eq!(acc, n_faces);

        Ok(Self { counts, offsets })
    }

    #[inline]
    pub fn n_ranks(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.offsets[self.counts.len()]
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Number of faces owned by `rank`.
    #[inline]
    pub fn count(&self, rank: usize) -> usize {
        self.counts[rank]
    }

    /// Owned global-id range of `rank`.
    #[inline]
    pub fn range(&self, rank: usize) -> Range<usize> {
        self.offsets[rank]..self.offsets[rank + 1]
    }

    /// Rank owning `global_id`.
    ///
    /// Empty ranks share an offset with their successor; the partition point
    /// skips them.
    pub fn owner_of(&self, global_id: usize) -> usize {
        debug_assert!(global_id < self.n_faces());
        self.offsets[1..].partition_point(|&end| end <= global_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_faces_two_ranks() {
        let layout = PartitionLayout::new(10, 2).unwrap();
        assert_eq!(layout.counts(), &[5, 5]);
        assert_eq!(layout.range(1), 5..10);
        assert_eq!(layout.owner_of(4), 0);
        assert_eq!(layout.owner_of(5), 1);
    }

    #[test]
    fn remainder_goes_to_first_ranks() {
        let layout = PartitionLayout::new(11, 4).unwrap();
        assert_eq!(layout.counts(), &[3, 3, 3, 2]);
        assert_eq!(layout.range(2), 6..9);
        assert_eq!(layout.owner_of(10), 3);
    }

    #[test]
    fn more_ranks_than_faces() {
        let layout = PartitionLayout::new(2, 4).unwrap();
        assert_eq!(layout.counts(), &[1, 1, 0, 0]);
        assert!(layout.range(3).is_empty());
        assert_eq!(layout.owner_of(1), 1);
    }

    #[test]
    fn zero_ranks_is_rejected() {
        assert!(matches!(
            PartitionLayout::new(3, 0),
            Err(MeshPartitionError::InvalidRankCount(0))
        ));
    }
}
