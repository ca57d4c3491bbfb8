//! Barycentric weights over the source centroid triangulation.
//!
//! Source values live at face centroids. Each target centroid is located in
//! the triangulation of those centroids and receives the barycentric weights
//! of the three source faces at the triangle's corners. Targets between the
//! outermost centroids and the grid boundary fall outside the triangulation;
//! they take the containing source face with weight 1.

use crate::geometry::{Point2, barycentric_weights};
use crate::parallel::map_range;
use crate::spatial::SpatialIndex;
use crate::topology::GridTopology;
use crate::weights::WeightRow;

pub fn barycentric_rows(source: &SpatialIndex<'_>, target: &GridTopology) -> Vec<WeightRow> {
    let dual = source.grid().centroid_triangulation();
    let dual_index = dual.map(SpatialIndex::build);
    let centroids = target.face_centroids();
    map_range(target.n_faces(), |t| {
        let point = centroids[t];
        dual_index
            .as_ref()
            .and_then(|index| interpolate(index, point))
            .or_else(|| source.locate(point).map(|s| vec![(s, 1.0)]))
            .unwrap_or_default()
    })
}

/// Weights of the triangle containing `point`. Rounding can push a weight
/// just below zero on a triangle edge; such weights are clamped and the row
/// renormalized, and exact zeros are not stored.
fn interpolate(dual: &SpatialIndex<'_>, point: Point2) -> Option<WeightRow> {
    let grid = dual.grid();
    let triangle = dual.locate(point)?;
    let &[a, b, c] = grid.face_nodes(triangle) else {
        return None;
    };
    let weights = barycentric_weights(point, &[grid.node(a), grid.node(b), grid.node(c)])?;
    let clamped = weights.map(|w| w.max(0.0));
    let total: f64 = clamped.iter().sum();
    if total <= 0.0 {
        return None;
    }
    Some(
        [a, b, c]
            .into_iter()
            .zip(clamped)
            .filter(|&(_, w)| w > 0.0)
            .map(|(s, w)| (s, w / total))
            .collect(),
    )
}
