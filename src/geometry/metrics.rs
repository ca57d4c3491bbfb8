//! Polygon measures: signed area, centroid, convexity.
//!
//! Polygons are open vertex rings (`[v0, v1, ..., vn]` with an implied closing
//! edge `vn -> v0`). Counter-clockwise rings have positive signed area.

use super::{EPS, Point2, extent};

/// Orientation of `c` relative to the directed line `a -> b`: positive when
/// `c` lies to the left (counter-clockwise turn).
#[inline]
pub fn orient2d(a: Point2, b: Point2, c: Point2) -> f64 {
    b.sub(a).cross(c.sub(a))
}

/// Shoelace signed area. Positive for counter-clockwise rings, 0 for fewer
/// than three vertices.
pub fn signed_area(polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    // Shift to the first vertex to limit cancellation for far-from-origin meshes.
    let origin = polygon[0];
    let mut twice = 0.0;
    for i in 1..n - 1 {
        let a = polygon[i].sub(origin);
        let b = polygon[i + 1].sub(origin);
        twice += a.cross(b);
    }
    0.5 * twice
}

/// Unsigned polygon area.
#[inline]
pub fn polygon_area(polygon: &[Point2]) -> f64 {
    signed_area(polygon).abs()
}

/// True if `|signed_area|` is at or below the relative degeneracy tolerance.
pub fn is_degenerate(polygon: &[Point2]) -> bool {
    if polygon.len() < 3 {
        return true;
    }
    let scale = extent(polygon);
    signed_area(polygon).abs() <= EPS * scale * scale
}

/// Area-weighted centroid (not the vertex average).
///
/// Returns `None` for degenerate polygons.
pub fn centroid(polygon: &[Point2]) -> Option<Point2> {
    if is_degenerate(polygon) {
        return None;
    }
    let origin = polygon[0];
    let n = polygon.len();
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = polygon[i].sub(origin);
        let b = polygon[(i + 1) % n].sub(origin);
        let cross = a.cross(b);
        twice_area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let inv = 1.0 / (3.0 * twice_area);
    Some(Point2::new(origin.x + cx * inv, origin.y + cy * inv))
}

/// True if the ring is convex in either orientation. Collinear vertices are
/// allowed; degenerate rings are not convex.
pub fn is_convex(polygon: &[Point2]) -> bool {
    if is_degenerate(polygon) {
        return false;
    }
    let n = polygon.len();
    let scale = extent(polygon);
    let tol = EPS * scale * scale;
    let mut sign = 0.0f64;
    for i in 0..n {
        let turn = orient2d(polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
        if turn.abs() <= tol {
            continue;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Copy of `polygon` in counter-clockwise order; `None` if degenerate.
pub fn to_ccw(polygon: &[Point2]) -> Option<Vec<Point2>> {
    if is_degenerate(polygon) {
        return None;
    }
    let mut ring = polygon.to_vec();
    if signed_area(&ring) < 0.0 {
        ring.reverse();
    }
    Some(ring)
}
