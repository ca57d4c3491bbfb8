//! Point containment and barycentric coordinates.

use super::metrics::{centroid, orient2d};
use super::{EPS, Point2, extent};

/// Slack on barycentric weights when deciding if a point lies in a triangle.
const BARYCENTRIC_TOL: f64 = 1e-10;

/// Crossing-number point-in-polygon test.
///
/// Points on an edge or a vertex count as inside, so a point on the edge shared
/// by two faces is contained by both; callers pick between them with an explicit
/// tie-break instead of relying on floating-point accidents.
pub fn point_in_polygon(point: Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let tol = EPS * extent(polygon);

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[j];
        let b = polygon[i];
        if distance_to_segment_squared(point, a, b) <= tol * tol {
            return true;
        }
        if (b.y > point.y) != (a.y > point.y)
            && point.x < (a.x - b.x) * (point.y - b.y) / (a.y - b.y) + b.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub(crate) fn distance_to_segment_squared(p: Point2, a: Point2, b: Point2) -> f64 {
    let ab = b.sub(a);
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.distance_squared(a);
    }
    let t = (p.sub(a).dot(ab) / len2).clamp(0.0, 1.0);
    let closest = Point2::new(a.x + t * ab.x, a.y + t * ab.y);
    p.distance_squared(closest)
}

/// Affine coefficients `[wa, wb, wc]` with `wa + wb + wc == 1` such that
/// `point == wa*a + wb*b + wc*c`.
///
/// Returns `None` for a degenerate (zero-area) triangle. Coefficients are
/// negative when the point lies outside the triangle.
pub fn barycentric_weights(point: Point2, triangle: &[Point2; 3]) -> Option<[f64; 3]> {
    let [a, b, c] = *triangle;
    let det = orient2d(a, b, c);
    let scale = extent(triangle);
    if !det.is_finite() || det.abs() <= EPS * scale * scale {
        return None;
    }
    let wa = orient2d(point, b, c) / det;
    let wb = orient2d(a, point, c) / det;
    Some([wa, wb, 1.0 - wa - wb])
}

/// Result of locating a point in a fan-triangulated polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FanLocation {
    /// Index `i` of the wedge `(centroid, v[i], v[i+1])`; 0 for triangles.
    pub wedge: usize,
    /// Vertices of the containing sub-triangle.
    pub triangle: [Point2; 3],
    /// Barycentric weights with respect to `triangle`.
    pub weights: [f64; 3],
}

/// Barycentric coordinates inside an arbitrary polygon.
///
/// Triangles are used as-is. Polygons with more vertices are fan-triangulated
/// from their area centroid and the first wedge (in vertex order) containing
/// the point is used. Returns `None` if the point lies outside or the polygon
/// is degenerate.
pub fn fan_barycentric(point: Point2, polygon: &[Point2]) -> Option<FanLocation> {
    match polygon.len() {
        0..=2 => None,
        3 => {
            let triangle = [polygon[0], polygon[1], polygon[2]];
            let weights = barycentric_weights(point, &triangle)?;
            inside(&weights).then_some(FanLocation {
                wedge: 0,
                triangle,
                weights,
            })
        }
        n => {
            let c = centroid(polygon)?;
            (0..n).find_map(|i| {
                let triangle = [c, polygon[i], polygon[(i + 1) % n]];
                let weights = barycentric_weights(point, &triangle)?;
                inside(&weights).then_some(FanLocation {
                    wedge: i,
                    triangle,
                    weights,
                })
            })
        }
    }
}

#[inline]
fn inside(weights: &[f64; 3]) -> bool {
    weights.iter().all(|w| *w >= -BARYCENTRIC_TOL)
}
