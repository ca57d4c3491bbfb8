//! Write-once storage for tables derived from a [`GridTopology`].
//!
//! Each table is computed on first access and then shared for the lifetime of
//! the topology. A cell is filled exactly once; concurrent readers either see
//! nothing or the finished table.

use once_cell::sync::OnceCell;

use crate::geometry::{BBox, Point2};
use crate::spatial::bvh::Bvh;
use crate::topology::connectivity::{Connectivity, EdgeTopology};
use crate::topology::grid::GridTopology;

#[derive(Clone, Debug, Default)]
pub(crate) struct DerivedCache {
    pub(crate) edges: OnceCell<EdgeTopology>,
    pub(crate) node_face: OnceCell<Connectivity>,
    pub(crate) face_face: OnceCell<Connectivity>,
    pub(crate) face_areas: OnceCell<Vec<f64>>,
    pub(crate) face_centroids: OnceCell<Vec<Point2>>,
    pub(crate) face_bounds: OnceCell<Vec<BBox>>,
    pub(crate) face_bvh: OnceCell<Option<Bvh>>,
    pub(crate) edge_lengths: OnceCell<Vec<f64>>,
    pub(crate) centroid_triangulation: OnceCell<Option<Box<GridTopology>>>,
}

impl DerivedCache {
    /// Number of tables computed so far.
    pub(crate) fn filled(&self) -> usize {
        [
            self.edges.get().is_some(),
            self.node_face.get().is_some(),
            self.face_face.get().is_some(),
            self.face_areas.get().is_some(),
            self.face_centroids.get().is_some(),
            self.face_bounds.get().is_some(),
            self.face_bvh.get().is_some(),
            self.edge_lengths.get().is_some(),
            self.centroid_triangulation.get().is_some(),
        ]
        .into_iter()
        .filter(|f| *f)
        .count()
    }
}
