//! Sparse regridding weights.
//!
//! A [`WeightMatrix`] is plain data: `(source, target, weight)` triplets
//! sorted by `(target, source)`, the method that produced them, the weight
//! convention, and fingerprints of both grids. It can be stored as JSON or
//! bincode and reapplied later to any values defined on a matching source
//! grid.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshRegridError;
use crate::parallel::map_range;
use crate::regrid::RegridMethod;
use crate::regrid::aggregate::{Aggregation, Contribution};
use crate::topology::{GridFingerprint, GridTopology};

/// Source-index/weight pairs for one target row.
pub type WeightRow = Vec<(usize, f64)>;

/// What the stored weights mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightConvention {
    /// Every covered row sums to 1.
    RowNormalized,
    /// Weights are intersection areas in source units²; a row sums to at
    /// most the target face area.
    OverlapArea,
    /// Weights are intersection area over target area; a row sums to the
    /// covered fraction of the target.
    CoveredFraction,
}

/// One non-zero entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triplet {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    method: RegridMethod,
    convention: WeightConvention,
    source: GridFingerprint,
    target: GridFingerprint,
    triplets: Vec<Triplet>,
}

impl WeightMatrix {
    /// Assemble from one row per target face. Rows are sorted by source index.
    pub(crate) fn from_rows(
        method: RegridMethod,
        source: GridFingerprint,
        target: GridFingerprint,
        rows: Vec<WeightRow>,
    ) -> Self {
        debug_assert_eq!(rows.len(), target.n_faces);
        let triplets = rows
            .into_iter()
            .enumerate()
            .flat_map(|(t, mut row)| {
                row.sort_unstable_by_key(|&(s, _)| s);
                row.into_iter().map(move |(s, weight)| Triplet {
                    source: s,
                    target: t,
                    weight,
                })
            })
            .collect();
        let matrix = Self {
            method,
            convention: method.convention(),
            source,
            target,
            triplets,
        };
        crate::debug_invariants!(matrix.validate_invariants(), "WeightMatrix assembly");
        matrix
    }

    /// Rebuild from `(source, target, weight)` triplets in any order.
    /// Repeated `(source, target)` pairs are summed; non-finite weights are
    /// rejected.
    pub fn from_triplets(
        method: RegridMethod,
        source: GridFingerprint,
        target: GridFingerprint,
        triplets: &[(usize, usize, f64)],
    ) -> Result<Self, MeshRegridError> {
        for (entry, &(s, t, _)) in triplets.iter().enumerate() {
            if s >= source.n_faces || t >= target.n_faces {
                return Err(MeshRegridError::TripletOutOfRange {
                    entry,
                    source_face: s,
                    target_face: t,
                    n_source: source.n_faces,
                    n_target: target.n_faces,
                });
            }
        }
        let mut sorted: Vec<Triplet> = triplets
            .iter()
            .map(|&(source, target, weight)| Triplet {
                source,
                target,
                weight,
            })
            .collect();
        sorted.sort_by_key(|t| (t.target, t.source));
        sorted.dedup_by(|next, kept| {
            let same = next.target == kept.target && next.source == kept.source;
            if same {
                kept.weight += next.weight;
            }
            same
        });
        let matrix = Self {
            method,
            convention: method.convention(),
            source,
            target,
            triplets: sorted,
        };
        matrix.validate_invariants()?;
        Ok(matrix)
    }

    /// `(source, target, weight)` triplets sorted by `(target, source)`.
    pub fn to_triplets(&self) -> Vec<(usize, usize, f64)> {
        self.triplets
            .iter()
            .map(|t| (t.source, t.target, t.weight))
            .collect()
    }

    pub fn triplets(&self) -> &[Triplet] {
        &self.triplets
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.triplets.len()
    }

    pub fn method(&self) -> RegridMethod {
        self.method
    }

    pub fn convention(&self) -> WeightConvention {
        self.convention
    }

    pub fn source_fingerprint(&self) -> &GridFingerprint {
        &self.source
    }

    pub fn target_fingerprint(&self) -> &GridFingerprint {
        &self.target
    }

    pub fn n_source(&self) -> usize {
        self.source.n_faces
    }

    pub fn n_target(&self) -> usize {
        self.target.n_faces
    }

    /// Entries of target row `t`, ascending by source.
    pub fn row(&self, t: usize) -> &[Triplet] {
        let start = self.triplets.partition_point(|e| e.target < t);
        let end = self.triplets.partition_point(|e| e.target <= t);
        &self.triplets[start..end]
    }

    /// CSR offsets of the target rows into [`triplets`](Self::triplets).
    pub fn row_offsets(&self) -> Vec<usize> {
        let mut offsets = vec![0usize; self.n_target() + 1];
        for e in &self.triplets {
            offsets[e.target + 1] += 1;
        }
        for t in 0..self.n_target() {
            offsets[t + 1] += offsets[t];
        }
        offsets
    }

    /// Sum of the weights of every target row.
    pub fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_target()];
        for e in &self.triplets {
            sums[e.target] += e.weight;
        }
        sums
    }

    /// Targets with at least one entry, ascending.
    pub fn covered_targets(&self) -> Vec<usize> {
        let offsets = self.row_offsets();
        (0..self.n_target())
            .filter(|&t| offsets[t + 1] > offsets[t])
            .collect()
    }

    /// Fail unless `source` and `target` are the grids this matrix was built
    /// for. O(1).
    pub fn check_grids(&self, source: &GridTopology, target: &GridTopology) -> Result<(), MeshRegridError> {
        if source.fingerprint() != self.source {
            return Err(MeshRegridError::FingerprintMismatch { side: "source" });
        }
        if target.fingerprint() != self.target {
            return Err(MeshRegridError::FingerprintMismatch { side: "target" });
        }
        Ok(())
    }

    /// Map one source field of `n_source` values to `n_target` values.
    pub fn apply(&self, values: &[f64], aggregation: Aggregation) -> Result<Vec<f64>, MeshRegridError> {
        self.apply_shaped(values, &[values.len()], aggregation)
    }

    /// Map `values` with array shape `shape` (row-major, flattened) to the
    /// same shape with the last dimension replaced by `n_target`.
    ///
    /// The last dimension must be `n_source`; a field from another grid is
    /// rejected even when its length happens to be a multiple of `n_source`.
    /// Each leading row is reduced independently, so a large array can also
    /// be applied one chunk of leading rows at a time.
    pub fn apply_shaped(
        &self,
        values: &[f64],
        shape: &[usize],
        aggregation: Aggregation,
    ) -> Result<Vec<f64>, MeshRegridError> {
        aggregation.validate()?;
        let (n_source, n_target) = (self.n_source(), self.n_target());
        let leading = leading_rows(shape, values.len(), n_source, "source face count")?;
        let offsets = self.row_offsets();

        Ok(map_range(leading * n_target, |k| {
            let (layer, t) = (k / n_target, k % n_target);
            let layer_values = &values[layer * n_source..(layer + 1) * n_source];
            let row: Vec<Contribution> = self.triplets[offsets[t]..offsets[t + 1]]
                .iter()
                .map(|e| Contribution {
                    source: e.source,
                    weight: e.weight,
                    value: layer_values[e.source],
                })
                .collect();
            aggregation.reduce_unchecked(&row)
        }))
    }

    pub fn to_json(&self) -> Result<String, MeshRegridError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MeshRegridError> {
        let matrix: Self = serde_json::from_str(json)?;
        matrix.validate_invariants()?;
        Ok(matrix)
    }

    pub fn to_bincode(&self) -> Result<Vec<u8>, MeshRegridError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bincode(bytes: &[u8]) -> Result<Self, MeshRegridError> {
        let matrix: Self = bincode::deserialize(bytes)?;
        matrix.validate_invariants()?;
        Ok(matrix)
    }

    /// Entries in range, sorted by `(target, source)` without repeats, finite
    /// weights, and a convention that matches the method.
    pub fn validate_invariants(&self) -> Result<(), MeshRegridError> {
        if self.convention != self.method.convention() {
            return Err(MeshRegridError::InvariantViolation(format!(
                "convention {:?} does not match method {:?}",
                self.convention, self.method
            )));
        }
        for (entry, e) in self.triplets.iter().enumerate() {
            if e.source >= self.n_source() || e.target >= self.n_target() {
                return Err(MeshRegridError::TripletOutOfRange {
                    entry,
                    source_face: e.source,
                    target_face: e.target,
                    n_source: self.n_source(),
                    n_target: self.n_target(),
                });
            }
            if !e.weight.is_finite() {
                return Err(MeshRegridError::InvariantViolation(format!(
                    "triplet {entry} has non-finite weight"
                )));
            }
        }
        if let Some(i) = self
            .triplets
            .windows(2)
            .position(|w| (w[0].target, w[0].source) >= (w[1].target, w[1].source))
        {
            return Err(MeshRegridError::InvariantViolation(format!(
                "triplets {i} and {} are out of order",
                i + 1
            )));
        }
        Ok(())
    }
}

/// Number of leading rows in an array of `len` values with shape `shape`.
///
/// The last dimension must equal `n_faces` and the shape must account for
/// every value; anything else is a [`MeshRegridError::IncompatibleGrid`].
pub(crate) fn leading_rows(
    shape: &[usize],
    len: usize,
    n_faces: usize,
    what: &'static str,
) -> Result<usize, MeshRegridError> {
    let Some((&last, leading)) = shape.split_last() else {
        return Err(MeshRegridError::IncompatibleGrid {
            what,
            expected: n_faces,
            found: 0,
        });
    };
    if last != n_faces {
        return Err(MeshRegridError::IncompatibleGrid {
            what,
            expected: n_faces,
            found: last,
        });
    }
    let rows = leading.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
    let total = rows.and_then(|r| r.checked_mul(last));
    match (rows, total) {
        (Some(rows), Some(total)) if total == len => Ok(rows),
        _ => Err(MeshRegridError::IncompatibleGrid {
            what: "value count",
            expected: total.unwrap_or(usize::MAX),
            found: len,
        }),
    }
}
