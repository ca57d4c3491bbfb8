//! Centroid-locator weights: each target takes the source face containing
//! its centroid, with weight 1.

use crate::parallel::map_range;
use crate::spatial::SpatialIndex;
use crate::topology::GridTopology;
use crate::weights::WeightRow;

pub fn centroid_locator_rows(source: &SpatialIndex<'_>, target: &GridTopology) -> Vec<WeightRow> {
    let centroids = target.face_centroids();
    map_range(target.n_faces(), |t| {
        source
            .locate(centroids[t])
            .map(|s| vec![(s, 1.0)])
            .unwrap_or_default()
    })
}
