//! Quasi-pseudo-distances between two GRNs.
//!
//! Both metrics are directional: the `subjective` GRN is the reference and
//! the `objective` GRN is aligned to its gene order before comparison. They
//! are neither symmetric nor separating, so `d(a, b) = 0` does not imply
//! `a = b`.

use grnet_core::{GeneLabeled, GrnetError, Result};
use grnet_omics::{GrnMatrix, SampleTable, WeightedGrn};
use tracing::trace;

/// Which quasi-pseudo-distance to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuasiMetric {
    /// [`d_asterisk`].
    #[default]
    DAsterisk,
    /// [`whqpm`] with each class's working data as raw data.
    Whqpm,
}

/// `1 - |ones(s) ∩ ones(o)| / |ones(s)|`, diagonal included.
///
/// The fraction of the subjective GRN's relations that the objective GRN
/// misses. Genes of `subjective` missing from `objective` fail with
/// [`GrnetError::UnknownLabel`].
pub fn d_asterisk(subjective: &GrnMatrix, objective: &GrnMatrix) -> Result<f64> {
    let o = objective.reindex(subjective.genes())?;
    let d = subjective.n_genes();
    let mut shared = 0usize;
    for i in 0..d {
        for j in 0..d {
            if subjective.get(i, j) == Some(1) && o.get(i, j) == Some(1) {
                shared += 1;
            }
        }
    }
    let total = subjective.count_ones();
    if total == 0 {
        return Err(GrnetError::Degenerate(
            "d*: subjective GRN has no relations".into(),
        ));
    }
    let value = 1.0 - shared as f64 / total as f64;
    trace!(shared, total, value, "d*");
    Ok(value)
}

/// Weighted-Hamming quasi-pseudo-metric.
///
/// Self relations are weighted by detection rates taken from the raw tables
/// (restricted to the subjective genes):
///
/// `1 - (shared_offdiag + Σ o_diag) / (offdiag(s) + Σ s_diag)`
///
/// where `shared_offdiag` counts off-diagonal relations present in both
/// GRNs. A vanishing denominator fails with [`GrnetError::Degenerate`].
pub fn whqpm(
    subjective: &GrnMatrix,
    objective: &GrnMatrix,
    s_raw: &SampleTable,
    o_raw: &SampleTable,
) -> Result<f64> {
    let genes = subjective.genes();
    let o = objective.reindex(genes)?;
    let s_diag = s_raw.select_genes(genes)?.detection_rates()?;
    let o_diag = o_raw.select_genes(genes)?.detection_rates()?;
    weighted_hamming(subjective, &o, &s_diag, &o_diag)
}

/// Weighted-Hamming quasi-pseudo-metric reading detection rates from the
/// diagonals of weighted GRNs instead of from raw tables.
pub fn whqpm_diagonal(subjective: &WeightedGrn, objective: &WeightedGrn) -> Result<f64> {
    let o = objective.reindex(subjective.genes())?;
    weighted_hamming(subjective.grn(), o.grn(), subjective.diagonal(), o.diagonal())
}

/// `o` must already be aligned to `s`.
fn weighted_hamming(s: &GrnMatrix, o: &GrnMatrix, s_diag: &[f64], o_diag: &[f64]) -> Result<f64> {
    let d = s.n_genes();
    let mut shared = 0usize;
    for i in 0..d {
        for j in (0..d).filter(|&j| j != i) {
            if s.get(i, j) == Some(1) && o.get(i, j) == Some(1) {
                shared += 1;
            }
        }
    }
    let s_weight: f64 = s_diag.iter().sum();
    let o_weight: f64 = o_diag.iter().sum();
    let denom = s.off_diagonal_count() as f64 + s_weight;
    if denom == 0.0 {
        return Err(GrnetError::Degenerate(
            "whqpm: subjective GRN has no relations and no detected genes".into(),
        ));
    }
    let value = 1.0 - (shared as f64 + o_weight) / denom;
    trace!(shared, s_weight, o_weight, value, "whqpm");
    Ok(value)
}
