mod util;
use mesh_regrid::geometry::point_in_polygon;
use mesh_regrid::prelude::*;
use static_assertions::assert_impl_all;
use util::*;

assert_impl_all!(GridTopology: Send, Sync, Clone);
assert_impl_all!(SpatialIndex<'static>: Send, Sync);
assert_impl_all!(WeightMatrix: Send, Sync, Clone);
assert_impl_all!(Regridder<'static>: Send, Sync);

fn brute_force_locate(grid: &GridTopology, p: Point2) -> Option<usize> {
    (0..grid.n_faces()).find(|&f| point_in_polygon(p, &grid.face_polygon(f)))
}

#[test]
fn locate_matches_linear_scan() {
    let grid = jittered(12, 9, 0.3, 17);
    let index = SpatialIndex::build(&grid);
    for p in random_points(2_000, -0.5, -0.5, 12.5, 9.5, 23) {
        assert_eq!(index.locate(p), brute_force_locate(&grid, p), "{p:?}");
    }
}

#[test]
fn bulk_locate_matches_single_queries() {
    let grid = jittered(8, 8, 0.25, 4);
    let index = SpatialIndex::build(&grid);
    let points = random_points(500, -1.0, -1.0, 9.0, 9.0, 8);
    let bulk = index.locate_points(&points);
    assert_eq!(bulk.len(), points.len());
    for (p, got) in points.iter().zip(bulk) {
        assert_eq!(got, index.locate(*p));
    }
}

#[test]
fn node_queries_go_to_lowest_incident_face() {
    let grid = jittered(5, 5, 0.2, 12);
    let index = SpatialIndex::build(&grid);
    for (node, faces) in grid.node_face().rows().enumerate() {
        assert_eq!(index.locate(grid.node(node)), faces.first().copied());
    }
}

#[test]
fn box_query_matches_face_bounds_exactly() {
    let grid = jittered(10, 10, 0.3, 2);
    let index = SpatialIndex::build(&grid);
    let query = BBox::new(2.3, 4.1, 5.7, 6.2);
    let hits = index.query_box(&query);
    assert!(hits.windows(2).all(|w| w[0] < w[1]));
    let query_ring = [
        Point2::new(2.3, 4.1),
        Point2::new(5.7, 4.1),
        Point2::new(5.7, 6.2),
        Point2::new(2.3, 6.2),
    ];
    for f in 0..grid.n_faces() {
        let overlaps = mesh_regrid::geometry::overlap_area(&grid.face_polygon(f), &query_ring) > 0.0;
        if overlaps {
            assert!(hits.contains(&f), "face {f} missing");
        }
        assert_eq!(
            hits.contains(&f),
            grid.face_bounds()[f].intersects(&query),
            "face {f}"
        );
    }
    assert_eq!(index.query_boxes(&[query, query]), vec![hits.clone(), hits]);
}

#[test]
fn nearest_edge_matches_linear_scan() {
    let grid = jittered(6, 4, 0.25, 31);
    let index = EdgeIndex::build(&grid);
    let lengths = grid.edge_lengths();
    assert_eq!(lengths.len(), grid.n_edges());
    for p in random_points(200, -2.0, -2.0, 8.0, 6.0, 77) {
        let (edge, d) = index.nearest_edge(p.x, p.y).unwrap();
        let best = grid
            .edge_node()
            .iter()
            .map(|&[a, b]| segment_distance(p, grid.node(a), grid.node(b)))
            .fold(f64::INFINITY, f64::min);
        assert_close(d, best, 1e-12);
        let [a, b] = grid.edge_node()[edge];
        assert_close(segment_distance(p, grid.node(a), grid.node(b)), best, 1e-12);
    }
}

fn segment_distance(p: Point2, a: Point2, b: Point2) -> f64 {
    let ab = b.sub(a);
    let t = (p.sub(a).dot(ab) / ab.dot(ab)).clamp(0.0, 1.0);
    p.distance_squared(Point2::new(a.x + t * ab.x, a.y + t * ab.y)).sqrt()
}

#[test]
fn index_survives_large_coordinates() {
    // Cells of 1e-3 placed 1e6 away from the origin.
    let grid = raster(4, 4, 1e6, -1e6, 1e-3, 1e-3);
    let index = SpatialIndex::build(&grid);
    assert_eq!(index.locate_point(1e6 + 2.5e-3, -1e6 + 0.5e-3), Some(2));
    assert_eq!(index.locate_point(1e6 - 1e-3, -1e6), None);
}

#[test]
fn sample_points_follows_policy() {
    let grid = unit_raster(2, 1);
    let index = SpatialIndex::build(&grid);
    let points = [Point2::new(1.5, 0.5), Point2::new(-3.0, 0.0)];
    let (values, kept) = sample_points(&index, &[4.0, 8.0], &[2], &points, OutOfBoundsPolicy::Drop).unwrap();
    assert_eq!((values, kept), (vec![8.0], vec![0]));
    assert_eq!(
        sample_points(&index, &[4.0, 8.0], &[2], &points, OutOfBoundsPolicy::Raise).unwrap_err(),
        MeshRegridError::PointOutOfBounds {
            point: 1,
            x: -3.0,
            y: 0.0
        }
    );
}
