mod util;
use util::*;

use halo_partition::io::manifest::Manifest;
use halo_partition::io::mesh_store::{read_mesh_file, write_global_mesh, NO_NEIGHBOR};
use halo_partition::io::param_store::read_parameter_file;
use halo_partition::mesh_error::MeshPartitionError;
use halo_partition::mesh_generation::{structured_lonlat_grid, structured_triangle_grid};
use halo_partition::partitioning::{partition_mesh, DuplicatePolicy, PartitionConfig};
use halo_partition::topology::face_meta::GhostType;
use halo_partition::topology::mesh::GlobalMesh;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tempfile::tempdir;

fn setup(dir: &Path, mesh: &GlobalMesh) -> PartitionConfig {
    let mesh_path = dir.join("basin.mstore");
    write_global_mesh(&mesh_path, mesh).unwrap();
    let params = write_field(dir, "basin_param.mstore", "elevation", mesh.n_faces(), |g| {
        g as f64 * 0.5
    });
    let mut config = PartitionConfig::new(mesh_path, 3);
    config.param_paths.push(params);
    config.max_ghost_distance = 15.0;
    config
}

#[test]
fn distributed_run_writes_sorted_consistent_artifacts() {
    let dir = tempdir().unwrap();
    let mesh = structured_triangle_grid(6, 5, 10.0).unwrap();
    let config = setup(dir.path(), &mesh);
    let run = partition_mesh(&config).unwrap();

    assert_eq!(run.manifest_path, dir.path().join("basin.np3.partition"));
    assert!(run.partition_dir.ends_with("basin.np3.partition.meshes"));
    let manifest = Manifest::read(&run.manifest_path).unwrap();
    assert_eq!(manifest, run.manifest);
    assert_eq!(manifest.ranks, 3);
    assert_eq!(manifest.num_global_faces, 60);
    assert_eq!(manifest.max_ghost_distance, 15.0);
    assert_eq!(manifest.meshes.len(), 3);

    let mut owned_total = 0;
    for rank in 0..3 {
        let (mesh_path, param_path) = run.artifact_paths(rank);
        assert!(mesh_path.ends_with(format!("basin.partition.{rank}_mesh.mstore")));
        let art = read_mesh_file(&mesh_path).unwrap();
        let params = read_parameter_file(&param_path).unwrap();

        assert_eq!(art.is_partition, Some(true));
        assert_eq!(art.projection, mesh.projection());
        assert!(art.global_ids.windows(2).all(|w| w[0] < w[1]));

        // parameters follow the face order
        let elevation = params.get("elevation").unwrap();
        assert_eq!(elevation.len(), art.global_ids.len());
        for (g, v) in art.global_ids.iter().zip(elevation) {
            assert_eq!(*v, *g as f64 * 0.5);
        }

        let types = art.ghost_types.as_ref().unwrap();
        let present: BTreeSet<i32> = art.global_ids.iter().copied().collect();
        for (k, &g) in art.global_ids.iter().enumerate() {
            let face = mesh.face(g as usize);
            let owned = (rank * 20..(rank + 1) * 20).contains(&(g as usize));
            if owned {
                owned_total += 1;
                assert_eq!(types[k], GhostType::None.code());
            } else {
                assert_ne!(types[k], GhostType::None.code());
            }

            // relabelled connectivity still points at the same coordinates
            for j in 0..3 {
                let local = art.elements[k][j] as usize;
                assert_eq!(art.vertices[local], mesh.vertex(face.vertices[j]).point);
            }
            // neighbours are global ids, -1 when absent from the partition
            for j in 0..3 {
                match face.neighbors[j] {
                    Some(n) if present.contains(&(n as i32)) => {
                        assert_eq!(art.neighbors[k][j], n as i32)
                    }
                    _ => assert_eq!(art.neighbors[k][j], NO_NEIGHBOR),
                }
            }
        }

        // local vertex ids are ascending in global vertex id
        let used: BTreeSet<usize> = art
            .global_ids
            .iter()
            .flat_map(|&g| mesh.face(g as usize).vertices)
            .collect();
        assert_eq!(art.vertices.len(), used.len());
        let expected: Vec<[f64; 3]> = used.iter().map(|&v| mesh.vertex(v).point).collect();
        assert_eq!(art.vertices, expected);
    }
    assert_eq!(owned_total, 60);
}

#[test]
fn standalone_writes_one_rank_without_ghosts() {
    let dir = tempdir().unwrap();
    let mesh = structured_triangle_grid(4, 4, 10.0).unwrap();
    let mut config = setup(dir.path(), &mesh);
    config.standalone_rank = Some(1);
    let run = partition_mesh(&config).unwrap();

    assert_eq!(run.manifest.meshes.len(), 1);
    let (mesh_path, param_path) = run.artifact_paths(0);
    assert!(mesh_path.ends_with("basin.partition.standalone.1_mesh.mstore"));
    let art = read_mesh_file(&mesh_path).unwrap();
    assert_eq!(art.is_partition, Some(false));
    assert_eq!(art.global_ids, (11..22).collect::<Vec<i32>>());
    assert!(art.ghost_types.unwrap().iter().all(|&t| t == 0));
    assert_eq!(read_parameter_file(&param_path).unwrap().get("elevation").unwrap().len(), 11);
}

#[test]
fn single_rank_is_rejected() {
    let dir = tempdir().unwrap();
    let mesh = structured_triangle_grid(2, 2, 10.0).unwrap();
    let mut config = setup(dir.path(), &mesh);
    config.ranks = 1;
    assert!(matches!(
        partition_mesh(&config),
        Err(MeshPartitionError::InvalidRankCount(1))
    ));
    assert!(!dir.path().join("basin.np1.partition").exists());
}

#[test]
fn geographic_mesh_requires_area() {
    let dir = tempdir().unwrap();
    let mesh = structured_lonlat_grid(4, 3, [-115.0, 51.0], 0.01).unwrap();
    let mut config = setup(dir.path(), &mesh);
    config.max_ghost_distance = 500.0;
    assert!(matches!(
        partition_mesh(&config),
        Err(MeshPartitionError::MissingTriangleArea("area"))
    ));

    let area = write_field(dir.path(), "area.mstore", "area", mesh.n_faces(), |_| 1.0);
    config.param_paths.push(area);
    let run = partition_mesh(&config).unwrap();
    let params = read_parameter_file(run.artifact_paths(2).1).unwrap();
    assert!(params.contains("area"));
    assert!(params.contains("elevation"));
}

#[test]
fn duplicate_parameters_follow_policy() {
    let dir = tempdir().unwrap();
    let mesh = hexagon_fan();
    let mut config = setup(dir.path(), &mesh);
    config.ranks = 2;
    let again = write_field(dir.path(), "again.mstore", "elevation", mesh.n_faces(), |_| -1.0);
    config.param_paths.push(again);
    assert!(matches!(
        partition_mesh(&config),
        Err(MeshPartitionError::DuplicateParameter { .. })
    ));

    config.duplicate_policy = DuplicatePolicy::KeepLast;
    let run = partition_mesh(&config).unwrap();
    let params = read_parameter_file(run.artifact_paths(0).1).unwrap();
    assert!(params.get("elevation").unwrap().iter().all(|&v| v == -1.0));
}

#[test]
fn ghost_values_come_from_their_owners() {
    let dir = tempdir().unwrap();
    let mesh = hexagon_fan();
    let mut config = setup(dir.path(), &mesh);
    config.ranks = 2;
    config.max_ghost_distance = 0.0;
    let run = partition_mesh(&config).unwrap();

    let art = read_mesh_file(run.artifact_paths(1).0).unwrap();
    let by_id: HashMap<i32, i32> = art
        .global_ids
        .iter()
        .copied()
        .zip(art.ghost_types.unwrap())
        .collect();
    assert_eq!(art.global_ids, vec![0, 2, 5, 6, 7, 8, 9]);
    assert_eq!(by_id[&0], GhostType::Neigh.code());
    assert_eq!(by_id[&2], GhostType::Neigh.code());
    let params = read_parameter_file(run.artifact_paths(1).1).unwrap();
    assert_eq!(params.get("elevation").unwrap()[..2], [0.0, 1.0]);
}

#[test]
fn exchange_mesh_is_converted_then_partitioned() {
    use halo_partition::io::exchange::convert_exchange;

    let dir = tempdir().unwrap();
    let mesh_json = dir.path().join("strip.mesh");
    std::fs::write(
        &mesh_json,
        r#"{"mesh": {
            "vertex": [[0,0,0],[1,0,0],[2,0,0],[0,1,0],[1,1,0],[2,1,0]],
            "elem": [[0,1,3],[1,4,3],[1,2,4],[2,5,4]],
            "neigh": [[1,-1,-1],[-1,0,2],[3,1,-1],[-1,2,-1]],
            "proj4": "+proj=utm +zone=11"}}"#,
    )
    .unwrap();
    let param_json = dir.path().join("strip.param");
    std::fs::write(&param_json, r#"{"slope": [0.1, 0.2, 0.3, 0.4]}"#).unwrap();

    let converted = convert_exchange(&mesh_json, &[param_json]).unwrap();
    let mut config = PartitionConfig::new(converted.mesh_path, 2);
    config.param_paths.push(converted.param_path);
    config.max_ghost_distance = 0.0;
    let run = partition_mesh(&config).unwrap();
    assert_eq!(run.manifest_path, dir.path().join("strip_mesh.np2.partition"));

    let art = read_mesh_file(run.artifact_paths(0).0).unwrap();
    assert_eq!(art.global_ids, vec![0, 1, 2]);
    let params = read_parameter_file(run.artifact_paths(0).1).unwrap();
    assert_eq!(params.get("slope").unwrap(), &[0.1, 0.2, 0.3]);
}
