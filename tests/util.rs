#![allow(dead_code)]
use halo_partition::io::param_store::{write_parameter_file, ParameterSet};
use halo_partition::topology::mesh::GlobalMesh;
use std::path::{Path, PathBuf};

/// Ten-face mesh: a hexagon fan around a centre vertex with four extra
/// triangles glued onto the outer edges of the first four fan triangles.
///
/// Face ids (rank 0 owns 0..5, rank 1 owns 5..10 when split in two):
/// `0=T0 1=T1 2=T2 3=O0 4=O1 | 5=T3 6=T4 7=T5 8=O2 9=O3`, where `Ti` is the
/// fan triangle between hexagon corners `i` and `i+1` and `Oi` sits on its
/// outer edge.
pub fn hexagon_fan() -> GlobalMesh {
    let mut points = vec![[0.0, 0.0, 0.0]];
    for i in 0..6 {
        let a = (60.0 * i as f64).to_radians();
        points.push([100.0 * a.cos(), 100.0 * a.sin(), 1.0]);
    }
    for i in 0..4 {
        let a = (60.0 * i as f64 + 30.0).to_radians();
        points.push([180.0 * a.cos(), 180.0 * a.sin(), 2.0]);
    }
    let h = |i: usize| 1 + i % 6;
    let fan = |i: usize| [0, h(i), h(i + 1)];
    let outer = |i: usize| [h(i), h(i + 1), 7 + i];
    let triangles = [
        fan(0),
        fan(1),
        fan(2),
        outer(0),
        outer(1),
        fan(3),
        fan(4),
        fan(5),
        outer(2),
        outer(3),
    ];
    GlobalMesh::from_triangles(points, &triangles, "+proj=utm +zone=11", false).unwrap()
}

/// Write a parameter store whose single field `name` holds `f(global_id)`.
pub fn write_field(
    dir: &Path,
    file: &str,
    name: &str,
    n_faces: usize,
    f: impl Fn(usize) -> f64,
) -> PathBuf {
    let path = dir.join(file);
    let mut params = ParameterSet::new();
    params.insert(name, (0..n_faces).map(f).collect());
    write_parameter_file(&path, &params).unwrap();
    path
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
