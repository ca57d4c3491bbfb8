//! Centroid triangulation: the dual mesh used for barycentric interpolation.

use itertools::Itertools;

use crate::geometry::{Point2, triangulate_polygon};
use crate::topology::connectivity::Connectivity;
use crate::topology::grid::GridTopology;
use crate::topology::validation::{NonManifoldHandling, ValidationOptions};

/// Triangulate the rings of face centroids around interior nodes.
///
/// The result reuses the face index space: node `i` is the centroid of face
/// `i`, and nodes that belong to no triangle are simply unused.
pub(crate) fn build_centroid_triangulation(grid: &GridTopology) -> Option<GridTopology> {
    let centroids = grid.face_centroids();
    let node_face = grid.node_face();
    let mut on_boundary = vec![false; grid.n_nodes()];
    for n in grid.boundary_nodes() {
        on_boundary[n] = true;
    }

    let mut triangles: Vec<[usize; 3]> = Vec::new();
    let mut ring_points: Vec<Point2> = Vec::new();
    for node in 0..grid.n_nodes() {
        let faces = node_face.row(node);
        if on_boundary[node] || faces.len() < 3 {
            continue;
        }
        let center = grid.node(node);
        let angle = |f: usize| {
            let d = centroids[f].sub(center);
            d.y.atan2(d.x)
        };
        let ring: Vec<usize> = faces
            .iter()
            .copied()
            .sorted_by(|&a, &b| angle(a).total_cmp(&angle(b)).then(a.cmp(&b)))
            .collect();
        ring_points.clear();
        ring_points.extend(ring.iter().map(|&f| centroids[f]));
        triangles.extend(
            triangulate_polygon(&ring_points)
                .into_iter()
                .map(|[a, b, c]| [ring[a], ring[b], ring[c]]),
        );
    }
    if triangles.is_empty() {
        return None;
    }

    let n_triangles = triangles.len();
    let face_node = Connectivity::from_rows(triangles);
    let options = ValidationOptions {
        non_manifold: NonManifoldHandling::Ignore,
        ..ValidationOptions::default()
    };
    match GridTopology::from_parts(centroids.to_vec(), face_node, options) {
        Ok(dual) => {
            log::debug!("centroid triangulation: {n_triangles} triangles over {} faces", grid.n_faces());
            Some(dual)
        }
        Err(err) => {
            log::warn!("centroid triangulation rejected: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::polygon_area;
    use crate::topology::RasterGrid;

    #[test]
    fn two_by_two_raster_has_one_dual_cell() {
        let grid = RasterGrid::from_edges(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0])
            .unwrap()
            .to_topology()
            .unwrap();
        let dual = grid.centroid_triangulation().unwrap();
        assert_eq!(dual.n_nodes(), 4);
        assert_eq!(dual.n_faces(), 2);
        let area: f64 = (0..dual.n_faces())
            .map(|f| polygon_area(&dual.face_polygon(f)))
            .sum();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_face_has_no_triangulation() {
        let grid = RasterGrid::from_edges(vec![0.0, 1.0], vec![0.0, 1.0])
            .unwrap()
            .to_topology()
            .unwrap();
        assert!(grid.centroid_triangulation().is_none());
    }

    #[test]
    fn triangle_vertices_are_face_indices() {
        let grid = RasterGrid::from_edges(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0])
            .unwrap()
            .to_topology()
            .unwrap();
        let dual = grid.centroid_triangulation().unwrap();
        assert_eq!(dual.n_faces(), 4);
        for f in 0..dual.n_faces() {
            for &v in dual.face_nodes(f) {
                assert_eq!(dual.node(v), grid.face_centroids()[v]);
            }
        }
    }
}
