//! Conservative weights from exact face intersections.

use crate::geometry::overlap_area;
use crate::parallel::map_range;
use crate::spatial::SpatialIndex;
use crate::topology::GridTopology;
use crate::weights::WeightRow;

/// Intersection areas between each target face and the source faces whose
/// boxes touch it. With `relative`, each area is divided by the target area.
///
/// Zero-area intersections (shared edges or vertices, degenerate clips) are
/// not stored.
pub fn overlap_rows(source: &SpatialIndex<'_>, target: &GridTopology, relative: bool) -> Vec<WeightRow> {
    let source_grid = source.grid();
    let target_bounds = target.face_bounds();
    let target_areas = target.face_areas();
    map_range(target.n_faces(), |t| {
        let polygon = target.face_polygon(t);
        let scale = if relative { target_areas[t] } else { 1.0 };
        source
            .query_box(&target_bounds[t])
            .into_iter()
            .filter_map(|s| {
                let area = overlap_area(&source_grid.face_polygon(s), &polygon);
                (area > 0.0).then(|| (s, area / scale))
            })
            .collect()
    })
}
