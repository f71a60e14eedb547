mod util;
use util::*;

use halo_partition::geometry::locator::FaceLocator;
use halo_partition::partitioning::boundary::{classify_local_boundary, BoundaryFace};
use halo_partition::partitioning::context::RankContext;
use halo_partition::partitioning::ghost::resolve_neighbor_ghosts;
use halo_partition::partitioning::{build_partition, PartitionLayout};
use halo_partition::topology::face_meta::GhostType;

fn bf(face: usize, is_global_boundary: bool) -> BoundaryFace {
    BoundaryFace {
        face,
        is_global_boundary,
    }
}

#[test]
fn ten_faces_split_evenly() {
    let mesh = hexagon_fan();
    assert_eq!(mesh.n_faces(), 10);
    let layout = PartitionLayout::new(mesh.n_faces(), 2).unwrap();
    assert_eq!(layout.counts(), &[5, 5]);
}

#[test]
fn boundary_faces_of_rank_zero() {
    let mesh = hexagon_fan();
    let layout = PartitionLayout::new(mesh.n_faces(), 2).unwrap();
    let ctx = RankContext::new(&mesh, &layout, 0).unwrap();
    let boundary = classify_local_boundary(&ctx);

    // T1 has all three neighbours on rank 0
    assert_permutation(
        &boundary,
        &[bf(0, false), bf(2, false), bf(3, true), bf(4, true)],
    );
}

#[test]
fn seam_face_is_neigh_ghost_of_other_rank() {
    let mesh = hexagon_fan();
    let layout = PartitionLayout::new(mesh.n_faces(), 2).unwrap();

    let mut ctx0 = RankContext::new(&mesh, &layout, 0).unwrap();
    let b0 = classify_local_boundary(&ctx0);
    assert_eq!(resolve_neighbor_ghosts(&mut ctx0, &b0), vec![5, 7, 8]);

    let mut ctx1 = RankContext::new(&mesh, &layout, 1).unwrap();
    let b1 = classify_local_boundary(&ctx1);
    assert_permutation(
        &b1,
        &[bf(5, false), bf(6, true), bf(7, true), bf(8, true), bf(9, true)],
    );
    let neigh1 = resolve_neighbor_ghosts(&mut ctx1, &b1);
    // T0 neighbours T5 across the seam
    assert!(neigh1.contains(&0));
    assert!(b0.contains(&bf(0, false)));
    assert_eq!(neigh1, vec![0, 2]);
    assert_eq!(ctx1.meta(0).ghost_type, GhostType::Neigh);
}

#[test]
fn zero_distance_keeps_neigh_only() {
    let mesh = hexagon_fan();
    let layout = PartitionLayout::new(mesh.n_faces(), 2).unwrap();
    let locator = FaceLocator::new(&mesh);
    for rank in 0..2 {
        let p = build_partition(&mesh, &layout, &locator, rank, 0.0).unwrap();
        let mut ctx = RankContext::new(&mesh, &layout, rank).unwrap();
        let b = classify_local_boundary(&ctx);
        let neigh = resolve_neighbor_ghosts(&mut ctx, &b);
        assert_eq!(p.ghosts(), neigh.as_slice());
        assert!(p.ghosts().iter().all(|&g| p.ghost_type(g) == Some(GhostType::Neigh)));
    }
}

#[test]
fn large_radius_adds_dist_ghosts() {
    let mesh = hexagon_fan();
    let layout = PartitionLayout::new(mesh.n_faces(), 2).unwrap();
    let locator = FaceLocator::new(&mesh);
    let p = build_partition(&mesh, &layout, &locator, 0, 1_000.0).unwrap();
    // every rank-1 face is within reach
    assert_eq!(p.ghosts(), &[5, 6, 7, 8, 9]);
    assert_eq!(p.ghost_type(6), Some(GhostType::Dist));
    assert_eq!(p.ghost_type(9), Some(GhostType::Dist));
    assert_eq!(p.ghost_type(5), Some(GhostType::Neigh));
    assert_eq!(p.plan.num_partners(), 1);
    assert_eq!(p.plan.partner_slice(1), &[5, 6, 7, 8, 9]);
}
