//! Face and edge indexes backed by a bounding-volume hierarchy.

use crate::geometry::locate::distance_to_segment_squared;
use crate::geometry::{BBox, Point2, point_in_polygon};
use crate::mesh_error::MeshRegridError;
use crate::parallel::map_range;
use crate::spatial::OutOfBoundsPolicy;
use crate::spatial::bvh::Bvh;
use crate::topology::GridTopology;

/// Point location and box queries over the faces of a grid.
#[derive(Debug, Clone, Copy)]
pub struct SpatialIndex<'g> {
    grid: &'g GridTopology,
    bvh: Option<&'g Bvh>,
}

impl<'g> SpatialIndex<'g> {
    /// Index every face's bounding box. The hierarchy is built in
    /// O(n log n) on the first call for a grid and reused afterwards.
    pub fn build(grid: &'g GridTopology) -> Self {
        let bvh = grid.face_bvh();
        log::debug!("SpatialIndex: {} faces indexed", grid.n_faces());
        Self { grid, bvh }
    }

    pub fn grid(&self) -> &'g GridTopology {
        self.grid
    }

    /// Number of indexed faces.
    pub fn len(&self) -> usize {
        self.grid.n_faces()
    }

    pub fn is_empty(&self) -> bool {
        self.bvh.is_none()
    }

    /// Face containing `(x, y)`, or `None` if no face does.
    ///
    /// Points on an edge or vertex belong to every face that touches them;
    /// the lowest face index wins, so repeated queries are stable.
    pub fn locate_point(&self, x: f64, y: f64) -> Option<usize> {
        self.locate(Point2::new(x, y))
    }

    pub fn locate(&self, point: Point2) -> Option<usize> {
        let bvh = self.bvh?;
        if !point.is_finite() {
            return None;
        }
        let mut candidates = Vec::new();
        bvh.query_point(point, |face| {
            candidates.push(face);
            true
        });
        candidates.sort_unstable();
        candidates
            .into_iter()
            .find(|&face| point_in_polygon(point, &self.grid.face_polygon(face)))
    }

    /// [`locate`](Self::locate) for a batch of points, in input order.
    pub fn locate_points(&self, points: &[Point2]) -> Vec<Option<usize>> {
        map_range(points.len(), |i| self.locate(points[i]))
    }

    /// Locate a batch of points and apply `policy` to those outside the grid.
    ///
    /// Returns `(point index, face)` pairs in input order. `Raise` fails on
    /// the first uncovered point, `FillMissing` keeps it with `None` and
    /// `Drop` omits it.
    pub fn locate_points_with_policy(
        &self,
        points: &[Point2],
        policy: OutOfBoundsPolicy,
    ) -> Result<Vec<(usize, Option<usize>)>, MeshRegridError> {
        let located = self.locate_points(points);
        let missing = located.iter().filter(|f| f.is_none()).count();
        if missing > 0 {
            log::warn!("{missing} of {} query points lie outside the grid", points.len());
        }
        let mut out = Vec::with_capacity(points.len());
        for (point, face) in located.into_iter().enumerate() {
            match (face, policy) {
                (Some(_), _) | (None, OutOfBoundsPolicy::FillMissing) => out.push((point, face)),
                (None, OutOfBoundsPolicy::Drop) => {}
                (None, OutOfBoundsPolicy::Raise) => {
                    let p = points[point];
                    return Err(MeshRegridError::PointOutOfBounds {
                        point,
                        x: p.x,
                        y: p.y,
                    });
                }
            }
        }
        Ok(out)
    }

    /// Faces whose bounding boxes intersect `query`, ascending.
    ///
    /// These are candidates: a face's box may touch the query even though
    /// the face itself does not.
    pub fn query_box(&self, query: &BBox) -> Vec<usize> {
        let mut hits = Vec::new();
        if let Some(bvh) = self.bvh {
            bvh.query_bbox(query, |face| {
                hits.push(face);
                true
            });
        }
        hits.sort_unstable();
        hits
    }

    /// [`query_box`](Self::query_box) for a batch of boxes, in input order.
    pub fn query_boxes(&self, queries: &[BBox]) -> Vec<Vec<usize>> {
        map_range(queries.len(), |i| self.query_box(&queries[i]))
    }
}

/// Box and nearest-neighbour queries over the edges of a grid.
#[derive(Debug, Clone)]
pub struct EdgeIndex<'g> {
    grid: &'g GridTopology,
    bvh: Option<Bvh>,
}

impl<'g> EdgeIndex<'g> {
    pub fn build(grid: &'g GridTopology) -> Self {
        let boxes: Vec<BBox> = grid
            .edge_node()
            .iter()
            .map(|&[a, b]| {
                let mut bbox = BBox::from_point(grid.node(a));
                bbox.expand(grid.node(b));
                bbox
            })
            .collect();
        Self {
            grid,
            bvh: Bvh::build(&boxes),
        }
    }

    pub fn grid(&self) -> &'g GridTopology {
        self.grid
    }

    /// Edges whose bounding boxes intersect `query`, ascending.
    pub fn query_box(&self, query: &BBox) -> Vec<usize> {
        let mut hits = Vec::new();
        if let Some(bvh) = &self.bvh {
            bvh.query_bbox(query, |edge| {
                hits.push(edge);
                true
            });
        }
        hits.sort_unstable();
        hits
    }

    /// Closest edge to `(x, y)` and its distance; ties go to the lower edge
    /// index.
    pub fn nearest_edge(&self, x: f64, y: f64) -> Option<(usize, f64)> {
        let point = Point2::new(x, y);
        if !point.is_finite() {
            return None;
        }
        let edge_node = self.grid.edge_node();
        self.bvh
            .as_ref()?
            .nearest(point, |edge| {
                let [a, b] = edge_node[edge];
                Some(distance_to_segment_squared(point, self.grid.node(a), self.grid.node(b)))
            })
            .map(|(edge, d2)| (edge, d2.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::RasterGrid;

    fn raster(nx: usize, ny: usize) -> GridTopology {
        RasterGrid::from_edges(
            (0..=nx).map(|i| i as f64).collect(),
            (0..=ny).map(|j| j as f64).collect(),
        )
        .unwrap()
        .to_topology()
        .unwrap()
    }

    #[test]
    fn locates_interior_points() {
        let g = raster(4, 3);
        let idx = SpatialIndex::build(&g);
        assert_eq!(idx.locate_point(2.5, 1.5), Some(6));
        assert_eq!(idx.locate_point(0.1, 0.1), Some(0));
        assert_eq!(idx.locate_point(4.5, 1.0), None);
        assert_eq!(idx.locate_point(f64::NAN, 1.0), None);
    }

    #[test]
    fn shared_vertex_goes_to_lowest_face() {
        let g = raster(2, 2);
        let idx = SpatialIndex::build(&g);
        assert_eq!(idx.locate_point(1.0, 1.0), Some(0));
        assert_eq!(idx.locate_point(1.0, 1.5), Some(2));
    }

    #[test]
    fn policy_controls_missing_points() {
        let g = raster(1, 1);
        let idx = SpatialIndex::build(&g);
        let pts = [Point2::new(0.5, 0.5), Point2::new(3.0, 3.0)];
        assert_eq!(
            idx.locate_points_with_policy(&pts, OutOfBoundsPolicy::FillMissing)
                .unwrap(),
            vec![(0, Some(0)), (1, None)]
        );
        assert_eq!(
            idx.locate_points_with_policy(&pts, OutOfBoundsPolicy::Drop)
                .unwrap(),
            vec![(0, Some(0))]
        );
        assert!(matches!(
            idx.locate_points_with_policy(&pts, OutOfBoundsPolicy::Raise),
            Err(MeshRegridError::PointOutOfBounds { point: 1, .. })
        ));
    }

    #[test]
    fn indexes_share_the_grid_hierarchy() {
        let g = raster(3, 3);
        let a = SpatialIndex::build(&g);
        let filled = g.cached_tables();
        let b = SpatialIndex::build(&g);
        assert!(std::ptr::eq(a.bvh.unwrap(), b.bvh.unwrap()));
        assert_eq!(g.cached_tables(), filled);
    }

    #[test]
    fn box_query_returns_sorted_hits() {
        let g = raster(4, 4);
        let idx = SpatialIndex::build(&g);
        assert_eq!(
            idx.query_box(&BBox::new(0.5, 0.5, 1.5, 0.75)),
            vec![0, 1]
        );
        // Touching boxes count.
        assert_eq!(idx.query_box(&BBox::new(4.0, 0.0, 5.0, 0.5)), vec![3]);
        assert!(idx.query_box(&BBox::new(9.0, 9.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn nearest_edge_ties_to_lower_index() {
        let g = raster(1, 1);
        let idx = EdgeIndex::build(&g);
        // Unit square edges: 0 = (0,1) bottom, 1 = (1,3) right, 2 = (2,3) top, 3 = (0,2) left.
        let (edge, d) = idx.nearest_edge(0.5, -2.0).unwrap();
        assert_eq!(edge, 0);
        assert!((d - 2.0).abs() < 1e-12);
        let (edge, _) = idx.nearest_edge(0.5, 0.5).unwrap();
        assert_eq!(edge, 0);
    }
}
