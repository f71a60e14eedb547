//! Distance metrics for projected and geographic meshes.
//!
//! Projected meshes carry planar coordinates in metres, so distances are
//! Euclidean in (x, y). Geographic meshes carry (longitude, latitude) in
//! degrees and distances are great-circle metres on a spherical Earth.
//! The metric is picked once from the mesh's geographic flag and passed by
//! value to every distance computation.

/// Mean Earth radius in metres used by the geodesic metric.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Axis-aligned search box `(min, max)` in mesh coordinates.
pub type SearchBox = ([f64; 2], [f64; 2]);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean distance on projected (UTM-like) coordinates.
    Planar,
    /// Haversine great-circle distance on (lon, lat) degrees.
    Geodesic,
}

impl DistanceMetric {
    pub fn for_mesh(is_geographic: bool) -> Self {
        if is_geographic {
            DistanceMetric::Geodesic
        } else {
            DistanceMetric::Planar
        }
    }

    /// Distance between two reference points, in metres.
    pub fn distance(self, a: [f64; 2], b: [f64; 2]) -> f64 {
        match self {
            DistanceMetric::Planar => ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt(),
            DistanceMetric::Geodesic => {
                let (lon1, lat1) = (a[0].to_radians(), a[1].to_radians());
                let (lon2, lat2) = (b[0].to_radians(), b[1].to_radians());
                let dlat = lat2 - lat1;
                let dlon = lon2 - lon1;
                let h = (dlat / 2.0).sin().powi(2)
                    + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
                2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
            }
        }
    }

    /// Point reached from `origin` travelling `distance` metres along
    /// `bearing_deg` (clockwise from north).
    pub fn point_from_bearing(self, origin: [f64; 2], bearing_deg: f64, distance: f64) -> [f64; 2] {
        let theta = bearing_deg.to_radians();
        match self {
            DistanceMetric::Planar => [
                origin[0] + distance * theta.sin(),
                origin[1] + distance * theta.cos(),
            ],
            DistanceMetric::Geodesic => {
                let delta = distance / EARTH_RADIUS_M;
                let lat1 = origin[1].to_radians();
                let lon1 = origin[0].to_radians();
                let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos())
                    .clamp(-1.0, 1.0)
                    .asin();
                let lon2 = lon1
                    + (theta.sin() * delta.sin() * lat1.cos())
                        .atan2(delta.cos() - lat1.sin() * lat2.sin());
                [lon2.to_degrees(), lat2.to_degrees()]
            }
        }
    }

    /// Boxes in mesh coordinates that together contain every point closer
    /// than `radius` to `origin`.
    ///
    /// Geodesic boxes that cross the antimeridian are split in two.
    pub fn search_boxes(self, origin: [f64; 2], radius: f64) -> Vec<SearchBox> {
        match self {
            DistanceMetric::Planar => vec![(
                [origin[0] - radius, origin[1] - radius],
                [origin[0] + radius, origin[1] + radius],
            )],
            DistanceMetric::Geodesic => {
                // The cap spans exactly `delta` of latitude along the meridian;
                // the pad absorbs rounding against the haversine distance.
                let delta = radius / EARTH_RADIUS_M;
                let delta_deg = delta.to_degrees() + 1e-9;
                let (lat_min, lat_max) = (origin[1] - delta_deg, origin[1] + delta_deg);
                if lat_max >= 90.0 || lat_min <= -90.0 {
                    // Cap reaches a pole: every longitude is in range.
                    return vec![([-180.0, lat_min.max(-90.0)], [180.0, lat_max.min(90.0)])];
                }

                // Widest longitude reach of the cap; the bearing-90 point
                // underestimates it away from the equator.
                let ratio = delta.sin() / origin[1].to_radians().cos();
                if !(ratio.abs() < 1.0) {
                    return vec![([-180.0, lat_min], [180.0, lat_max])];
                }
                let dlon = ratio.asin().to_degrees() + 1e-9;
                let (lon_min, lon_max) = (origin[0] - dlon, origin[0] + dlon);
                let mut boxes = vec![([lon_min.max(-180.0), lat_min], [lon_max.min(180.0), lat_max])];
                if lon_min < -180.0 {
                    boxes.push(([lon_min + 360.0, lat_min], [180.0, lat_max]));
                }
                if lon_max > 180.0 {
                    boxes.push(([-180.0, lat_min], [lon_max - 360.0, lat_max]));
                }
                boxes
            }
        }
    }
}
