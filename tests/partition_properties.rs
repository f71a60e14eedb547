use halo_partition::geometry::locator::FaceLocator;
use halo_partition::mesh_generation::structured_triangle_grid;
use halo_partition::partitioning::comm_plan::CommunicationPlan;
use halo_partition::partitioning::{build_partition, PartitionLayout};
use halo_partition::topology::face_meta::GhostType;
use proptest::prelude::*;

proptest! {
    #[test]
    fn assignment_is_exact_partition(n in 0usize..5_000, p in 2usize..64) {
        let layout = PartitionLayout::new(n, p).unwrap();
        let mut next = 0;
        let mut big = 0;
        for r in 0..p {
            let range = layout.range(r);
            prop_assert_eq!(range.start, next);
            next = range.end;
            let c = layout.count(r);
            prop_assert!(c == n / p || c == n / p + 1);
            if c == n / p + 1 {
                big += 1;
            }
            for g in range {
                prop_assert_eq!(layout.owner_of(g), r);
            }
        }
        prop_assert_eq!(next, n);
        prop_assert_eq!(big, n % p);
    }

    #[test]
    fn partner_ranges_tile_ghost_list(
        ids in proptest::collection::vec(0usize..400, 0..120),
        split in 0usize..120,
        p in 2usize..9,
    ) {
        let layout = PartitionLayout::new(400, p).unwrap();
        let (neigh, dist) = ids.split_at(split.min(ids.len()));
        let plan = CommunicationPlan::build(neigh, dist, &layout);

        prop_assert!(plan.ghosts().windows(2).all(|w| w[0] < w[1]));
        let mut covered = 0;
        for (&rank, r) in plan.partners() {
            prop_assert_eq!(r.offset, covered);
            prop_assert!(r.count > 0);
            covered += r.count;
            for &g in plan.partner_slice(rank) {
                prop_assert_eq!(layout.owner_of(g), rank);
            }
        }
        prop_assert_eq!(covered, plan.ghosts().len());
        for (i, &g) in plan.ghosts().iter().enumerate() {
            prop_assert_eq!(plan.ghost_index(g), Some(i));
        }
    }

    #[test]
    fn ghosts_belong_to_other_ranks(
        nx in 1usize..12,
        ny in 1usize..12,
        p in 2usize..6,
        radius in 0.0f64..40.0,
    ) {
        let mesh = structured_triangle_grid(nx, ny, 10.0).unwrap();
        let layout = PartitionLayout::new(mesh.n_faces(), p).unwrap();
        let locator = FaceLocator::new(&mesh);
        for rank in 0..p {
            let part = build_partition(&mesh, &layout, &locator, rank, radius).unwrap();
            for b in &part.boundary_faces {
                if mesh.face(b.face).touches_mesh_boundary() {
                    prop_assert!(b.is_global_boundary);
                }
            }
            for &g in part.ghosts() {
                prop_assert_ne!(layout.owner_of(g), rank);
                prop_assert_ne!(part.owner(g), Some(rank));
                let t = part.ghost_type(g);
                prop_assert!(t == Some(GhostType::Neigh) || t == Some(GhostType::Dist));
            }
            for &f in &part.local_faces {
                prop_assert_eq!(part.ghost_type(f), Some(GhostType::None));
            }
        }
    }
}
