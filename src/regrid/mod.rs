//! Weight construction and application between two grids.
//!
//! A [`RegridMethod`] picks one of four pure weight builders. [`Regridder`]
//! runs the builder once for a source/target pair and keeps the resulting
//! [`WeightMatrix`], which is then applied to any number of value arrays.
//!
//! | method | weight | row sum |
//! |---|---|---|
//! | `CentroidLocator` | 1 for the source face containing the target centroid | 1 |
//! | `Overlap` | intersection area | ≤ target area |
//! | `RelativeOverlap` | intersection area / target area | covered fraction |
//! | `Barycentric` | barycentric weights in the source centroid triangulation | 1 |

pub mod aggregate;
pub mod barycentric;
pub mod centroid;
pub mod overlap;

pub use crate::spatial::OutOfBoundsPolicy;
pub use aggregate::{Aggregation, Contribution};

use serde::{Deserialize, Serialize};

use crate::geometry::Point2;
use crate::mesh_error::MeshRegridError;
use crate::spatial::SpatialIndex;
use crate::topology::GridTopology;
use crate::weights::{WeightConvention, WeightMatrix, WeightRow, leading_rows};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegridMethod {
    CentroidLocator,
    Overlap,
    RelativeOverlap,
    Barycentric,
}

impl RegridMethod {
    /// Meaning of the weights this method produces.
    pub fn convention(self) -> WeightConvention {
        match self {
            RegridMethod::CentroidLocator | RegridMethod::Barycentric => WeightConvention::RowNormalized,
            RegridMethod::Overlap => WeightConvention::OverlapArea,
            RegridMethod::RelativeOverlap => WeightConvention::CoveredFraction,
        }
    }

    /// One weight row per target face, entries in no particular order.
    pub fn build_rows(self, source: &SpatialIndex<'_>, target: &GridTopology) -> Vec<WeightRow> {
        match self {
            RegridMethod::CentroidLocator => centroid::centroid_locator_rows(source, target),
            RegridMethod::Overlap => overlap::overlap_rows(source, target, false),
            RegridMethod::RelativeOverlap => overlap::overlap_rows(source, target, true),
            RegridMethod::Barycentric => barycentric::barycentric_rows(source, target),
        }
    }

    /// Build the weight matrix from `source` onto `target`.
    ///
    /// Targets with no source coverage follow `policy`: `Raise` fails on the
    /// lowest such target, otherwise their rows stay empty.
    pub fn build_weights(
        self,
        source: &SpatialIndex<'_>,
        target: &GridTopology,
        policy: OutOfBoundsPolicy,
    ) -> Result<WeightMatrix, MeshRegridError> {
        let rows = self.build_rows(source, target);
        let uncovered = rows.iter().filter(|r| r.is_empty()).count();
        if uncovered > 0 {
            if policy == OutOfBoundsPolicy::Raise {
                let target = rows.iter().position(|r| r.is_empty()).unwrap_or_default();
                return Err(MeshRegridError::TargetOutOfBounds { target });
            }
            log::warn!(
                "{self:?}: {uncovered} of {} target faces have no source coverage",
                rows.len()
            );
        }
        Ok(WeightMatrix::from_rows(
            self,
            source.grid().fingerprint(),
            target.fingerprint(),
            rows,
        ))
    }
}

/// Regridding configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegridOptions {
    /// Treatment of target faces without source coverage.
    pub out_of_bounds: OutOfBoundsPolicy,
    /// Reduction used by [`Regridder::apply`] and [`Regridder::regrid`].
    pub aggregation: Aggregation,
}

impl Default for RegridOptions {
    fn default() -> Self {
        Self {
            out_of_bounds: OutOfBoundsPolicy::FillMissing,
            aggregation: Aggregation::Mean,
        }
    }
}

/// Regridded values and the target faces they belong to.
#[derive(Clone, Debug, PartialEq)]
pub struct RegridResult {
    /// `[leading..., target_faces.len()]`, flattened row-major.
    pub values: Vec<f64>,
    /// Target face of each trailing position, ascending.
    pub target_faces: Vec<usize>,
}

/// Weights from one grid onto another, built once and reapplied.
#[derive(Clone, Debug)]
pub struct Regridder<'a> {
    source: &'a GridTopology,
    target: &'a GridTopology,
    options: RegridOptions,
    weights: WeightMatrix,
}

impl<'a> Regridder<'a> {
    pub fn new(
        source: &'a GridTopology,
        target: &'a GridTopology,
        method: RegridMethod,
    ) -> Result<Self, MeshRegridError> {
        Self::with_options(source, target, method, RegridOptions::default())
    }

    pub fn with_options(
        source: &'a GridTopology,
        target: &'a GridTopology,
        method: RegridMethod,
        options: RegridOptions,
    ) -> Result<Self, MeshRegridError> {
        Self::with_index(&SpatialIndex::build(source), target, method, options)
    }

    /// Build weights from an existing index over the source grid, so one
    /// index can serve regridders onto many targets.
    pub fn with_index(
        index: &SpatialIndex<'a>,
        target: &'a GridTopology,
        method: RegridMethod,
        options: RegridOptions,
    ) -> Result<Self, MeshRegridError> {
        options.aggregation.validate()?;
        let source = index.grid();
        warn_if_incompatible(source, target);
        let weights = method.build_weights(index, target, options.out_of_bounds)?;
        log::debug!(
            "{method:?}: {} weights for {} -> {} faces",
            weights.nnz(),
            source.n_faces(),
            target.n_faces()
        );
        Ok(Self {
            source,
            target,
            options,
            weights,
        })
    }

    /// Re-attach a stored weight matrix to its grids.
    ///
    /// Fails with [`MeshRegridError::FingerprintMismatch`] unless both grids
    /// match the fingerprints recorded in `weights`.
    pub fn from_weights(
        weights: WeightMatrix,
        source: &'a GridTopology,
        target: &'a GridTopology,
    ) -> Result<Self, MeshRegridError> {
        Self::from_weights_with_options(weights, source, target, RegridOptions::default())
    }

    pub fn from_weights_with_options(
        weights: WeightMatrix,
        source: &'a GridTopology,
        target: &'a GridTopology,
        options: RegridOptions,
    ) -> Result<Self, MeshRegridError> {
        options.aggregation.validate()?;
        weights.check_grids(source, target)?;
        Ok(Self {
            source,
            target,
            options,
            weights,
        })
    }

    pub fn source(&self) -> &'a GridTopology {
        self.source
    }

    pub fn target(&self) -> &'a GridTopology {
        self.target
    }

    pub fn method(&self) -> RegridMethod {
        self.weights.method()
    }

    pub fn options(&self) -> &RegridOptions {
        &self.options
    }

    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    pub fn into_weights(self) -> WeightMatrix {
        self.weights
    }

    /// Apply with the configured aggregation to one field of
    /// `source().n_faces()` values; one output per target face.
    pub fn apply(&self, values: &[f64]) -> Result<Vec<f64>, MeshRegridError> {
        self.weights.apply(values, self.options.aggregation)
    }

    pub fn apply_with(&self, values: &[f64], aggregation: Aggregation) -> Result<Vec<f64>, MeshRegridError> {
        self.weights.apply(values, aggregation)
    }

    /// Apply to an array shaped `[leading..., n_source]`; see
    /// [`WeightMatrix::apply_shaped`].
    pub fn apply_shaped(&self, values: &[f64], shape: &[usize]) -> Result<Vec<f64>, MeshRegridError> {
        self.weights.apply_shaped(values, shape, self.options.aggregation)
    }

    /// Apply to an array of shape `shape` and honor the out-of-bounds
    /// policy: under `Drop`, target faces without coverage are left out of
    /// the result.
    pub fn regrid(&self, values: &[f64], shape: &[usize]) -> Result<RegridResult, MeshRegridError> {
        let full = self.apply_shaped(values, shape)?;
        if self.options.out_of_bounds != OutOfBoundsPolicy::Drop {
            return Ok(RegridResult {
                values: full,
                target_faces: (0..self.target.n_faces()).collect(),
            });
        }
        let kept = self.weights.covered_targets();
        let n_target = self.target.n_faces();
        let values = full
            .chunks_exact(n_target.max(1))
            .flat_map(|layer| kept.iter().map(move |&t| layer[t]))
            .collect();
        Ok(RegridResult {
            values,
            target_faces: kept,
        })
    }
}

/// Value of the face containing each point (grid to points or raster).
///
/// `values` has array shape `shape`, whose last dimension must be the face
/// count; the result is `[leading..., n_points_kept]`. Points outside the
/// grid follow `policy`: `Raise` fails, `FillMissing` yields NaN and `Drop`
/// omits the point. The indices of the points kept are returned alongside.
pub fn sample_points(
    index: &SpatialIndex<'_>,
    values: &[f64],
    shape: &[usize],
    points: &[Point2],
    policy: OutOfBoundsPolicy,
) -> Result<(Vec<f64>, Vec<usize>), MeshRegridError> {
    let n_faces = index.len();
    leading_rows(shape, values.len(), n_faces, "face count")?;
    let located = index.locate_points_with_policy(points, policy)?;
    let sampled = values
        .chunks_exact(n_faces.max(1))
        .flat_map(|layer| {
            located
                .iter()
                .map(move |&(_, face)| face.map_or(f64::NAN, |f| layer[f]))
        })
        .collect();
    Ok((sampled, located.into_iter().map(|(p, _)| p).collect()))
}

fn warn_if_incompatible(source: &GridTopology, target: &GridTopology) {
    if !source.bounds().intersects(&target.bounds()) {
        log::warn!(
            "source bounds {:?} and target bounds {:?} are disjoint; all weights will be empty",
            source.bounds(),
            target.bounds()
        );
    }
    if let (Some(a), Some(b)) = (source.crs(), target.crs()) {
        if a != b {
            log::warn!("source CRS {a:?} differs from target CRS {b:?}; no transform is applied");
        }
    }
}
