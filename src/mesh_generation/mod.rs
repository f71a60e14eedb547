//! Structured triangle grid generators.
//!
//! Faces are numbered row by row, two triangles per grid cell, so contiguous
//! global-id ranges map onto horizontal bands of the grid.

use crate::mesh_error::MeshPartitionError;
use crate::topology::mesh::GlobalMesh;

fn invalid_grid(message: impl Into<String>) -> MeshPartitionError {
    MeshPartitionError::InvalidArgument {
        arg: "grid".into(),
        reason: message.into(),
    }
}

fn grid_triangles(nx: usize, ny: usize) -> Vec<[usize; 3]> {
    let vid = |i: usize, j: usize| j * (nx + 1) + i;
    let mut triangles = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let (a, b, c, d) = (vid(i, j), vid(i + 1, j), vid(i + 1, j + 1), vid(i, j + 1));
            triangles.push([a, b, d]);
            triangles.push([b, c, d]);
        }
    }
    triangles
}

fn grid_points(nx: usize, ny: usize, origin: [f64; 2], spacing: [f64; 2]) -> Vec<[f64; 3]> {
    let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let x = origin[0] + i as f64 * spacing[0];
            let y = origin[1] + j as f64 * spacing[1];
            points.push([x, y, (i + j) as f64]);
        }
    }
    points
}

/// Projected `nx` x `ny` grid of square cells with side `spacing`, each split
/// into two triangles (`2 * nx * ny` faces).
pub fn structured_triangle_grid(
    nx: usize,
    ny: usize,
    spacing: f64,
) -> Result<GlobalMesh, MeshPartitionError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_grid("grid dimensions must be non-zero"));
    }
    if !(spacing > 0.0) {
        return Err(invalid_grid(format!("spacing must be positive, got {spacing}")));
    }
    let points = grid_points(nx, ny, [0.0, 0.0], [spacing, spacing]);
    GlobalMesh::from_triangles(
        points,
        &grid_triangles(nx, ny),
        "+proj=utm +zone=11 +ellps=GRS80 +units=m +no_defs",
        false,
    )
}

/// Geographic grid in (lon, lat) degrees starting at `origin`.
pub fn structured_lonlat_grid(
    nx: usize,
    ny: usize,
    origin: [f64; 2],
    spacing_deg: f64,
) -> Result<GlobalMesh, MeshPartitionError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_grid("grid dimensions must be non-zero"));
    }
    if !(spacing_deg > 0.0) {
        return Err(invalid_grid(format!("spacing must be positive, got {spacing_deg}")));
    }
    let points = grid_points(nx, ny, origin, [spacing_deg, spacing_deg]);
    GlobalMesh::from_triangles(points, &grid_triangles(nx, ny), "+proj=longlat +datum=WGS84 +no_defs", true)
}
