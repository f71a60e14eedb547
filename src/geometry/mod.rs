//! Distance metrics and spatial queries over face centroids.

pub mod locator;
pub mod metric;

pub use locator::FaceLocator;
pub use metric::DistanceMetric;
