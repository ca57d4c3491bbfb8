//! Geometry kernel for mesh-regrid.
//!
//! Stateless 2D primitives operating on explicit vertex lists: signed area,
//! centroids, point-in-polygon, polygon clipping and barycentric coordinates.
//! Degenerate input (zero or near-zero area, collinear vertices) yields `None`
//! or an empty result, never NaN or a negative area.

pub mod bounds;
pub mod clip;
pub mod locate;
pub mod metrics;

pub use bounds::BBox;
pub use clip::{clip_polygon, overlap_area, sutherland_hodgman, triangulate_polygon};
pub use locate::{FanLocation, barycentric_weights, fan_barycentric, point_in_polygon};
pub use metrics::{centroid, is_convex, is_degenerate, orient2d, polygon_area, signed_area};

use serde::{Deserialize, Serialize};

/// Relative tolerance used by the geometry predicates.
///
/// Areas are compared against `EPS * extent²` and distances against
/// `EPS * extent`, where `extent` is the largest side of the bounding box of
/// the polygon involved, so the tests are independent of coordinate units.
pub const EPS: f64 = 1e-12;

/// A point in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn sub(self, other: Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }

    /// z-component of the cross product `self × other`.
    #[inline]
    pub fn cross(self, other: Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn dot(self, other: Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn distance_squared(self, other: Point2) -> f64 {
        let d = self.sub(other);
        d.dot(d)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(p: [f64; 2]) -> Self {
        Point2::new(p[0], p[1])
    }
}

impl From<(f64, f64)> for Point2 {
    fn from(p: (f64, f64)) -> Self {
        Point2::new(p.0, p.1)
    }
}

/// Largest side of the bounding box of `points`.
pub(crate) fn extent(points: &[Point2]) -> f64 {
    BBox::from_points(points)
        .map(|b| b.width().max(b.height()))
        .unwrap_or(0.0)
}
