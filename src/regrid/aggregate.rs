//! Per-target reductions used when applying a weight matrix.
//!
//! Every statistic is taken over the contributing source values weighted by
//! their row weights. A row without contributors, or with zero total weight,
//! yields NaN; a NaN among the contributors propagates to the result.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshRegridError;

/// How the contributions to one target row are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    /// `Σ w·v / Σ w`.
    #[default]
    Mean,
    /// `Σ w·v`. With overlap-area weights this conserves the integral.
    Sum,
    Min,
    Max,
    /// Value with the largest accumulated weight; ties go to the smallest
    /// value.
    Mode,
    /// Weighted median, `Percentile(50.0)`.
    Median,
    /// Weighted percentile in `[0, 100]`, linearly interpolated.
    Percentile(f64),
    /// `Σ w / Σ (w / v)`.
    HarmonicMean,
    /// `exp(Σ w·ln v / Σ w)`.
    GeometricMean,
    /// Value of the single largest-weight contributor; ties go to the lowest
    /// source index.
    MaxOverlap,
}

/// One entry of a weight row paired with its source value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    pub source: usize,
    pub weight: f64,
    pub value: f64,
}

impl Aggregation {
    /// Reject parameters outside their domain.
    pub fn validate(self) -> Result<(), MeshRegridError> {
        match self {
            Aggregation::Percentile(p) if !(0.0..=100.0).contains(&p) => {
                Err(MeshRegridError::InvalidPercentile(p))
            }
            _ => Ok(()),
        }
    }

    /// Reduce one row.
    ///
    /// Order statistics (min, max, mode, median, percentile, max-overlap)
    /// consider only entries with positive weight. Fails with
    /// [`MeshRegridError::InvalidPercentile`] when the parameter is out of
    /// its domain.
    pub fn reduce(self, contributions: &[Contribution]) -> Result<f64, MeshRegridError> {
        self.validate()?;
        Ok(self.reduce_unchecked(contributions))
    }

    /// [`reduce`](Self::reduce) for an aggregation already validated.
    pub(crate) fn reduce_unchecked(self, contributions: &[Contribution]) -> f64 {
        if contributions.is_empty() || contributions.iter().any(|c| c.value.is_nan()) {
            return f64::NAN;
        }
        let total: f64 = contributions.iter().map(|c| c.weight).sum();
        if total == 0.0 || !total.is_finite() {
            return f64::NAN;
        }

        match self {
            Aggregation::Mean => weighted_sum(contributions) / total,
            Aggregation::Sum => weighted_sum(contributions),
            Aggregation::HarmonicMean => {
                total / contributions.iter().map(|c| c.weight / c.value).sum::<f64>()
            }
            Aggregation::GeometricMean => {
                let log_sum: f64 = contributions.iter().map(|c| c.weight * c.value.ln()).sum();
                (log_sum / total).exp()
            }
            Aggregation::Min => positive(contributions)
                .map(|c| c.value)
                .reduce(f64::min)
                .unwrap_or(f64::NAN),
            Aggregation::Max => positive(contributions)
                .map(|c| c.value)
                .reduce(f64::max)
                .unwrap_or(f64::NAN),
            Aggregation::MaxOverlap => positive(contributions)
                .reduce(|best, c| {
                    if c.weight > best.weight || (c.weight == best.weight && c.source < best.source) {
                        c
                    } else {
                        best
                    }
                })
                .map_or(f64::NAN, |c| c.value),
            Aggregation::Mode => mode(contributions),
            Aggregation::Median => percentile(contributions, 50.0),
            Aggregation::Percentile(p) => percentile(contributions, p),
        }
    }
}

fn weighted_sum(contributions: &[Contribution]) -> f64 {
    contributions.iter().map(|c| c.weight * c.value).sum()
}

fn positive(contributions: &[Contribution]) -> impl Iterator<Item = Contribution> + '_ {
    contributions.iter().copied().filter(|c| c.weight > 0.0)
}

/// Positive-weight contributors in ascending value order.
fn sorted_positive(contributions: &[Contribution]) -> Vec<Contribution> {
    let mut sorted: Vec<Contribution> = positive(contributions).collect();
    sorted.sort_unstable_by(|a, b| a.value.total_cmp(&b.value).then(a.source.cmp(&b.source)));
    sorted
}

fn mode(contributions: &[Contribution]) -> f64 {
    let sorted = sorted_positive(contributions);
    let mut best: Option<(f64, f64)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i].value;
        let mut weight = 0.0;
        while i < sorted.len() && sorted[i].value == value {
            weight += sorted[i].weight;
            i += 1;
        }
        // Ascending order: only a strictly larger weight replaces the best.
        if best.is_none_or(|(_, w)| weight > w) {
            best = Some((value, weight));
        }
    }
    best.map_or(f64::NAN, |(v, _)| v)
}

/// Weighted percentile with linear interpolation between the weight
/// midpoints `c_i = (S_i - w_i / 2) / W` of the value-sorted contributors.
fn percentile(contributions: &[Contribution], p: f64) -> f64 {
    let sorted = sorted_positive(contributions);
    let Some(last) = sorted.last() else {
        return f64::NAN;
    };
    let total: f64 = sorted.iter().map(|c| c.weight).sum();
    let q = p / 100.0;

    let mut cumulative = 0.0;
    let mut prev: Option<(f64, f64)> = None;
    for c in &sorted {
        cumulative += c.weight;
        let position = (cumulative - 0.5 * c.weight) / total;
        if q <= position {
            return match prev {
                None => c.value,
                Some((prev_pos, prev_val)) => {
                    let t = (q - prev_pos) / (position - prev_pos);
                    prev_val + t * (c.value - prev_val)
                }
            };
        }
        prev = Some((position, c.value));
    }
    last.value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(f64, f64)]) -> Vec<Contribution> {
        entries
            .iter()
            .enumerate()
            .map(|(source, &(weight, value))| Contribution {
                source,
                weight,
                value,
            })
            .collect()
    }

    #[test]
    fn mean_of_half_overlaps() {
        let r = row(&[(0.5, 10.0), (0.5, 20.0)]);
        assert_eq!(Aggregation::Mean.reduce(&r).unwrap(), 15.0);
        assert_eq!(Aggregation::Sum.reduce(&r).unwrap(), 15.0);
        assert_eq!(Aggregation::Median.reduce(&r).unwrap(), 15.0);
        assert_eq!(Aggregation::Min.reduce(&r).unwrap(), 10.0);
        assert_eq!(Aggregation::Max.reduce(&r).unwrap(), 20.0);
    }

    #[test]
    fn empty_and_zero_weight_rows_are_missing() {
        assert!(Aggregation::Mean.reduce(&[]).unwrap().is_nan());
        let r = row(&[(0.0, 1.0)]);
        assert!(Aggregation::Mean.reduce(&r).unwrap().is_nan());
        assert!(Aggregation::Sum.reduce(&r).unwrap().is_nan());
    }

    #[test]
    fn nan_propagates() {
        for agg in [Aggregation::Mean, Aggregation::Max, Aggregation::Mode, Aggregation::Median] {
            let r = row(&[(0.5, f64::NAN), (0.5, 2.0)]);
            assert!(agg.reduce(&r).unwrap().is_nan(), "{agg:?}");
        }
    }

    #[test]
    fn mode_accumulates_weight_and_breaks_ties_low() {
        let r = row(&[(0.3, 5.0), (0.3, 7.0), (0.3, 5.0), (0.6, 7.0)]);
        assert_eq!(Aggregation::Mode.reduce(&r).unwrap(), 7.0);
        let r = row(&[(0.5, 9.0), (0.5, 3.0)]);
        assert_eq!(Aggregation::Mode.reduce(&r).unwrap(), 3.0);
    }

    #[test]
    fn weighted_percentiles() {
        let r = row(&[(1.0, 0.0), (1.0, 10.0), (2.0, 20.0)]);
        // Midpoints: 0.125, 0.375, 0.75.
        assert_eq!(Aggregation::Percentile(0.0).reduce(&r).unwrap(), 0.0);
        assert_eq!(Aggregation::Percentile(100.0).reduce(&r).unwrap(), 20.0);
        assert!((Aggregation::Percentile(25.0).reduce(&r).unwrap() - 5.0).abs() < 1e-12);
        assert!((Aggregation::Median.reduce(&r).unwrap() - 13.333333333333334).abs() < 1e-12);
    }

    #[test]
    fn single_entry_rows_are_identity() {
        for agg in [
            Aggregation::Mean,
            Aggregation::Min,
            Aggregation::Max,
            Aggregation::Mode,
            Aggregation::Median,
            Aggregation::Percentile(90.0),
            Aggregation::MaxOverlap,
            Aggregation::GeometricMean,
            Aggregation::HarmonicMean,
        ] {
            let r = row(&[(1.0, 4.0)]);
            assert!((agg.reduce(&r).unwrap() - 4.0).abs() < 1e-12, "{agg:?}");
        }
    }

    #[test]
    fn max_overlap_ties_go_to_lowest_source() {
        let r = row(&[(0.25, 1.0), (0.5, 2.0), (0.5, 3.0)]);
        assert_eq!(Aggregation::MaxOverlap.reduce(&r).unwrap(), 2.0);
    }

    #[test]
    fn percentile_domain_is_checked() {
        assert!(Aggregation::Percentile(101.0).validate().is_err());
        assert!(Aggregation::Percentile(f64::NAN).validate().is_err());
        assert!(Aggregation::Percentile(0.0).validate().is_ok());
    }

    #[test]
    fn reduce_rejects_percentiles_out_of_domain() {
        let r = row(&[(1.0, 1.0), (1.0, 9.0)]);
        assert_eq!(
            Aggregation::Percentile(120.0).reduce(&r),
            Err(MeshRegridError::InvalidPercentile(120.0))
        );
        assert!(matches!(
            Aggregation::Percentile(f64::NAN).reduce(&r),
            Err(MeshRegridError::InvalidPercentile(p)) if p.is_nan()
        ));
        assert_eq!(Aggregation::Percentile(100.0).reduce(&r), Ok(9.0));
    }
}
