//! Polygon intersection.
//!
//! Convex/convex pairs are clipped directly with Sutherland–Hodgman. Concave
//! polygons are first split into triangles by ear clipping, and every convex
//! piece of the subject is clipped against every convex piece of the clip
//! polygon. The resulting pieces are interior-disjoint and their union is the
//! exact intersection, so summing their areas gives the overlap area.

use super::metrics::{is_convex, is_degenerate, orient2d, signed_area, to_ccw};
use super::{BBox, EPS, Point2, extent};

/// Clip `subject` against a convex, counter-clockwise `clip` polygon.
///
/// `subject` may be concave; in that case the result can contain zero-width
/// bridges, which is harmless for area but is why [`clip_polygon`] decomposes
/// concave input first. Returns an empty vector when the intersection is empty
/// or degenerate.
pub fn sutherland_hodgman(subject: &[Point2], clip: &[Point2]) -> Vec<Point2> {
    if subject.len() < 3 || clip.len() < 3 {
        return Vec::new();
    }
    let scale = extent(subject).max(extent(clip));
    let tol = EPS * scale * scale;

    let mut output: Vec<Point2> = subject.to_vec();
    let mut input: Vec<Point2> = Vec::with_capacity(subject.len() + clip.len());
    let m = clip.len();
    for k in 0..m {
        if output.is_empty() {
            break;
        }
        let a = clip[k];
        let b = clip[(k + 1) % m];
        std::mem::swap(&mut input, &mut output);
        output.clear();

        let mut s = input[input.len() - 1];
        let mut ds = orient2d(a, b, s);
        for &e in &input {
            let de = orient2d(a, b, e);
            let e_in = de >= -tol;
            let s_in = ds >= -tol;
            if e_in {
                if !s_in {
                    output.push(intersect(s, e, ds, de));
                }
                output.push(e);
            } else if s_in {
                output.push(intersect(s, e, ds, de));
            }
            s = e;
            ds = de;
        }
    }

    cleanup(output, EPS * scale)
}

#[inline]
fn intersect(s: Point2, e: Point2, ds: f64, de: f64) -> Point2 {
    let t = (ds / (ds - de)).clamp(0.0, 1.0);
    Point2::new(s.x + t * (e.x - s.x), s.y + t * (e.y - s.y))
}

/// Drop repeated vertices and reject degenerate rings.
fn cleanup(mut ring: Vec<Point2>, dup: f64) -> Vec<Point2> {
    ring.dedup_by(|b, a| a.distance_squared(*b) <= dup * dup);
    while ring.len() > 1 {
        let first = ring[0];
        match ring.last() {
            Some(last) if last.distance_squared(first) <= dup * dup => {
                ring.pop();
            }
            _ => break,
        }
    }
    if ring.len() < 3 || is_degenerate(&ring) {
        if !ring.is_empty() {
            log::trace!("dropping degenerate clip piece with {} vertices", ring.len());
        }
        ring.clear();
    }
    ring
}

/// Ear-clipping triangulation of a simple polygon.
///
/// Returns counter-clockwise vertex-index triples into `polygon`, regardless of
/// the input orientation. Collinear vertices are skipped, so no zero-area
/// triangles are produced. A degenerate polygon yields no triangles.
pub fn triangulate_polygon(polygon: &[Point2]) -> Vec<[usize; 3]> {
    if is_degenerate(polygon) {
        return Vec::new();
    }
    let scale = extent(polygon);
    let tol = EPS * scale * scale;

    let mut ring: Vec<usize> = (0..polygon.len()).collect();
    if signed_area(polygon) < 0.0 {
        ring.reverse();
    }

    let mut triangles = Vec::with_capacity(polygon.len() - 2);
    while ring.len() > 3 {
        let n = ring.len();
        let corner = |i: usize| (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
        let turn = |(a, b, c): (usize, usize, usize)| orient2d(polygon[a], polygon[b], polygon[c]);

        if let Some(i) = (0..n).find(|&i| turn(corner(i)).abs() <= tol) {
            ring.remove(i);
            continue;
        }
        let ear = (0..n).find(|&i| {
            let (prev, cur, next) = corner(i);
            turn((prev, cur, next)) > 0.0 && is_ear(polygon, &ring, prev, cur, next, tol)
        });
        if let Some(i) = ear {
            let (prev, cur, next) = corner(i);
            triangles.push([prev, cur, next]);
            ring.remove(i);
        } else {
            // Numerically ambiguous remainder: fan it so the area is still covered.
            log::trace!("ear clipping stalled with {} vertices left; fanning", ring.len());
            for k in 1..ring.len() - 1 {
                let tri = [ring[0], ring[k], ring[k + 1]];
                if orient2d(polygon[tri[0]], polygon[tri[1]], polygon[tri[2]]) > tol {
                    triangles.push(tri);
                }
            }
            return triangles;
        }
    }
    if ring.len() == 3 && orient2d(polygon[ring[0]], polygon[ring[1]], polygon[ring[2]]) > tol {
        triangles.push([ring[0], ring[1], ring[2]]);
    }
    triangles
}

fn is_ear(
    polygon: &[Point2],
    ring: &[usize],
    prev: usize,
    cur: usize,
    next: usize,
    tol: f64,
) -> bool {
    let (a, b, c) = (polygon[prev], polygon[cur], polygon[next]);
    ring.iter().all(|&k| {
        if k == prev || k == cur || k == next {
            return true;
        }
        let p = polygon[k];
        if p == a || p == b || p == c {
            return true;
        }
        !(orient2d(a, b, p) >= -tol && orient2d(b, c, p) >= -tol && orient2d(c, a, p) >= -tol)
    })
}

/// Split a polygon into counter-clockwise convex pieces.
pub(crate) fn convex_parts(polygon: &[Point2]) -> Vec<Vec<Point2>> {
    let Some(ring) = to_ccw(polygon) else {
        return Vec::new();
    };
    if is_convex(&ring) {
        return vec![ring];
    }
    triangulate_polygon(&ring)
        .into_iter()
        .map(|[a, b, c]| vec![ring[a], ring[b], ring[c]])
        .collect()
}

/// Intersection of two simple polygons, convex or concave, in any orientation.
///
/// Returns zero or more interior-disjoint counter-clockwise polygons whose
/// union is the intersection. Degenerate (zero-area) pieces are dropped.
pub fn clip_polygon(subject: &[Point2], clip: &[Point2]) -> Vec<Vec<Point2>> {
    let (Some(sb), Some(cb)) = (BBox::from_points(subject), BBox::from_points(clip)) else {
        return Vec::new();
    };
    if !sb.intersects(&cb) {
        return Vec::new();
    }

    let subject_parts = convex_parts(subject);
    let clip_parts = convex_parts(clip);
    let mut pieces = Vec::new();
    for s in &subject_parts {
        let Some(s_box) = BBox::from_points(s) else {
            continue;
        };
        for c in &clip_parts {
            if BBox::from_points(c).is_some_and(|c_box| c_box.intersects(&s_box)) {
                let piece = sutherland_hodgman(s, c);
                if !piece.is_empty() {
                    pieces.push(piece);
                }
            }
        }
    }
    pieces
}

/// Total intersection area of two polygons.
pub fn overlap_area(subject: &[Point2], clip: &[Point2]) -> f64 {
    clip_polygon(subject, clip)
        .iter()
        .map(|piece| signed_area(piece))
        .sum()
}
