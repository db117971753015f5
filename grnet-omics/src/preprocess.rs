//! Expression preprocessing: presence/absence binarization, depth scaling,
//! and log transforms.

use grnet_core::{GeneLabeled, GrnetError, Result};

use crate::table::SampleTable;

/// A binarized table together with per-gene detection statistics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Binarized {
    /// 1.0 where the input was nonzero, 0.0 elsewhere.
    pub table: SampleTable,
    /// Fraction of samples in which each gene is detected.
    pub coverage: Vec<f64>,
    /// Dropout rate, `1 - coverage`.
    pub dropout: Vec<f64>,
    /// Per-gene mean of the (optionally normalized) input values.
    pub mean: Vec<f64>,
}

/// Binarize on nonzero entries; means are taken over the raw values.
pub fn binarize(table: &SampleTable) -> Result<Binarized> {
    binarize_with(table, |t| Ok(t.clone()))
}

/// Binarize on nonzero entries; means are taken over `normalizer(table)`.
pub fn binarize_with<F>(table: &SampleTable, normalizer: F) -> Result<Binarized>
where
    F: FnOnce(&SampleTable) -> Result<SampleTable>,
{
    let coverage = table.detection_rates()?;
    let dropout = coverage.iter().map(|c| 1.0 - c).collect();

    let normalized = normalizer(table)?;
    if normalized.shape() != table.shape() {
        return Err(GrnetError::contract(
            "normalizer output",
            format!("{:?}", table.shape()),
            format!("{:?}", normalized.shape()),
        ));
    }
    let n = normalized.n_samples() as f64;
    let mean = normalized
        .columns()
        .iter()
        .map(|c| c.iter().sum::<f64>() / n)
        .collect();

    tracing::debug!(
        n_samples = table.n_samples(),
        n_genes = table.n_genes(),
        "binarized sample table"
    );
    Ok(Binarized {
        table: table.map_values(|v| if v != 0.0 { 1.0 } else { 0.0 }),
        coverage,
        dropout,
        mean,
    })
}

/// Scale each sample to sum to one million.
pub fn rpm(table: &SampleTable) -> Result<SampleTable> {
    scale_to(table, 1e6)
}

/// Scale each sample to sum to one hundred thousand.
pub fn rp100k(table: &SampleTable) -> Result<SampleTable> {
    scale_to(table, 1e5)
}

fn scale_to(table: &SampleTable, target: f64) -> Result<SampleTable> {
    let sums = table.row_sums();
    if let Some(s) = sums.iter().position(|&s| s == 0.0) {
        return Err(GrnetError::Degenerate(format!(
            "sample {:?} has zero total count",
            table.sample_names()[s]
        )));
    }
    let factors: Vec<f64> = sums.iter().map(|s| target / s).collect();
    Ok(table.scale_rows(&factors))
}

/// Logarithm base for [`log_transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogBase {
    #[default]
    E,
    Two,
    Ten,
}

/// `log(x + 1)` in the given base, element-wise.
///
/// Values must be greater than -1.
pub fn log_transform(table: &SampleTable, base: LogBase) -> Result<SampleTable> {
    if let Some(&v) = table.columns().iter().flatten().find(|&&v| v <= -1.0) {
        return Err(GrnetError::Invariant(format!(
            "log transform of {v}: values should be greater than -1"
        )));
    }
    Ok(match base {
        LogBase::E => table.map_values(f64::ln_1p),
        LogBase::Two => table.map_values(|v| (v + 1.0).log2()),
        LogBase::Ten => table.map_values(|v| (v + 1.0).log10()),
    })
}
