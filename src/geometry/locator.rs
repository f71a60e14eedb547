//! Uniform bucket grid over face centroids.
//!
//! Built once per run from the immutable global mesh and shared by every rank
//! build. Radius queries gather candidate faces from the grid cells covered
//! by the metric's search boxes, then keep those strictly closer than the
//! radius.

use crate::geometry::metric::DistanceMetric;
use crate::topology::mesh::GlobalMesh;

#[derive(Clone, Debug)]
pub struct FaceLocator {
    metric: DistanceMetric,
    centroids: Vec<[f64; 2]>,
    origin: [f64; 2],
    cell: f64,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<u32>>,
}

impl FaceLocator {
    pub fn new(mesh: &GlobalMesh) -> Self {
        let centroids: Vec<[f64; 2]> = (0..mesh.n_faces()).map(|f| mesh.centroid(f)).collect();
        let n = centroids.len().max(1);

        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for c in &centroids {
            for k in 0..2 {
                min[k] = min[k].min(c[k]);
                max[k] = max[k].max(c[k]);
            }
        }
        if centroids.is_empty() {
            min = [0.0; 2];
            max = [0.0; 2];
        }
        let ex = max[0] - min[0];
        let ey = max[1] - min[1];
        // About one face per cell on average.
        let cell = (ex * ey / n as f64)
            .sqrt()
            .max(ex.max(ey) / n as f64)
            .max(1e-9);
        let nx = (ex / cell).floor() as usize + 1;
        let ny = (ey / cell).floor() as usize + 1;

        let mut buckets = vec![Vec::new(); nx * ny];
        for (f, c) in centroids.iter().enumerate() {
            let (ix, iy) = (
                Self::axis_index(c[0], min[0], cell, nx),
                Self::axis_index(c[1], min[1], cell, ny),
            );
            buckets[iy * nx + ix].push(f as u32);
        }

        log::debug!("Face locator: {nx}x{ny} cells of size {cell} for {} faces", centroids.len());

        Self {
            metric: mesh.metric(),
            centroids,
            origin: min,
            cell,
            nx,
            ny,
            buckets,
        }
    }

    #[inline]
    fn axis_index(value: f64, origin: f64, cell: f64, n: usize) -> usize {
        let i = ((value - origin) / cell).floor();
        if i <= 0.0 {
            0
        } else {
            (i as usize).min(n - 1)
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    #[inline]
    pub fn centroid(&self, face: usize) -> [f64; 2] {
        self.centroids[face]
    }

    /// Faces whose centroid lies inside the closed box `[min, max]`.
    pub fn faces_in_box(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let mut out = Vec::new();
        if self.centroids.is_empty() || min[0] > max[0] || min[1] > max[1] {
            return out;
        }
        let x0 = Self::axis_index(min[0], self.origin[0], self.cell, self.nx);
        let x1 = Self::axis_index(max[0], self.origin[0], self.cell, self.nx);
        let y0 = Self::axis_index(min[1], self.origin[1], self.cell, self.ny);
        let y1 = Self::axis_index(max[1], self.origin[1], self.cell, self.ny);
        for iy in y0..=y1 {
            for ix in x0..=x1 {
                for &f in &self.buckets[iy * self.nx + ix] {
                    let c = self.centroids[f as usize];
                    if c[0] >= min[0] && c[0] <= max[0] && c[1] >= min[1] && c[1] <= max[1] {
                        out.push(f as usize);
                    }
                }
            }
        }
        out
    }

    /// Faces whose centroid is strictly closer than `radius` to `origin`.
    ///
    /// A non-positive radius matches nothing.
    pub fn faces_within(&self, origin: [f64; 2], radius: f64) -> Vec<usize> {
        if !(radius > 0.0) {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (min, max) in self.metric.search_boxes(origin, radius) {
            out.extend(
                self.faces_in_box(min, max)
                    .into_iter()
                    .filter(|&f| self.metric.distance(origin, self.centroids[f]) < radius),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_generation::{structured_lonlat_grid, structured_triangle_grid};

    fn assert_matches_brute_force(mesh: &GlobalMesh, origin: [f64; 2], radii: &[f64]) {
        let locator = FaceLocator::new(mesh);
        for &radius in radii {
            let mut found = locator.faces_within(origin, radius);
            found.sort_unstable();
            let expected: Vec<usize> = (0..mesh.n_faces())
                .filter(|&f| mesh.metric().distance(origin, mesh.centroid(f)) < radius)
                .collect();
            assert_eq!(found, expected, "radius {radius} from {origin:?}");
        }
    }

    #[test]
    fn radius_query_matches_brute_force() {
        let mesh = structured_triangle_grid(12, 9, 10.0).unwrap();
        let locator = FaceLocator::new(&mesh);
        let origin = mesh.centroid(40);
        for radius in [0.5, 10.0, 25.0, 60.0] {
            let mut found = locator.faces_within(origin, radius);
            found.sort_unstable();
            let expected: Vec<usize> = (0..mesh.n_faces())
                .filter(|&f| mesh.metric().distance(origin, mesh.centroid(f)) < radius)
                .collect();
            assert_eq!(found, expected, "radius {radius}");
        }
    }

    #[test]
    fn geodesic_query_matches_brute_force() {
        let mesh = structured_lonlat_grid(20, 16, [-116.0, 50.0], 0.01).unwrap();
        assert_matches_brute_force(&mesh, mesh.centroid(170), &[100.0, 1_000.0, 2_500.0, 8_000.0]);
    }

    #[test]
    fn geodesic_query_near_pole_matches_brute_force() {
        let mesh = structured_lonlat_grid(72, 10, [-180.0, 89.90], 0.0099).unwrap();
        let origin = mesh.centroid(5);
        assert_matches_brute_force(&mesh, origin, &[1_000.0, 5_000.0, 15_000.0]);
        // the 15 km cap crosses the pole and covers the whole strip
        assert_eq!(FaceLocator::new(&mesh).faces_within(origin, 15_000.0).len(), mesh.n_faces());
    }

    #[test]
    fn zero_radius_finds_nothing() {
        let mesh = structured_triangle_grid(3, 3, 1.0).unwrap();
        let locator = FaceLocator::new(&mesh);
        assert!(locator.faces_within(mesh.centroid(0), 0.0).is_empty());
    }
}
