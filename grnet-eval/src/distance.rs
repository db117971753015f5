//! Pairwise quasi-distances across the classes of a registry.

use grnet_clusters::{CellClassId, CellClassName, CellClassRegistry};
use grnet_core::check::ensure_len;
use grnet_core::{GrnetError, Result, Summarizable};
use grnet_omics::SampleTable;
use tracing::debug;

use crate::metrics::{d_asterisk, whqpm, QuasiMetric};

fn missing(i: usize) -> GrnetError {
    GrnetError::UnknownCellClass(format!("index {i}"))
}

/// Raw samples of class `i`: `raw[i]` when given, else the working table of
/// its model. Pretrained classes have none.
fn raw_samples<'a>(
    registry: &'a CellClassRegistry,
    raw: Option<&'a [SampleTable]>,
    i: usize,
) -> Result<&'a SampleTable> {
    if let Some(raw) = raw {
        return raw.get(i).ok_or_else(|| missing(i));
    }
    let model = registry.model(i).ok_or_else(|| missing(i))?;
    model.data().ok_or_else(|| {
        let name = registry.entry(i).map_or_else(|| i.to_string(), |e| e.name.to_string());
        GrnetError::Invariant(format!(
            "whqpm needs raw samples, but class {name} wraps a {} model without any",
            model.kind()
        ))
    })
}

/// Distance from class `s` (subjective) to class `o` (objective).
fn class_distance(
    registry: &CellClassRegistry,
    metric: QuasiMetric,
    raw: Option<&[SampleTable]>,
    s: usize,
    o: usize,
) -> Result<f64> {
    let s_entry = registry.entry(s).ok_or_else(|| missing(s))?;
    let o_entry = registry.entry(o).ok_or_else(|| missing(o))?;
    match metric {
        QuasiMetric::DAsterisk => d_asterisk(&s_entry.grn, &o_entry.grn),
        QuasiMetric::Whqpm => whqpm(
            &s_entry.grn,
            &o_entry.grn,
            raw_samples(registry, raw, s)?,
            raw_samples(registry, raw, o)?,
        ),
    }
}

/// Full N×N matrix of quasi-distances between registry classes.
///
/// Row `i` is the subjective class, column `j` the objective one. The matrix
/// is generally asymmetric; the diagonal holds each class's distance to
/// itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuasiDistanceMatrix {
    names: Vec<CellClassName>,
    data: Vec<f64>,
    metric: QuasiMetric,
}

impl QuasiDistanceMatrix {
    /// Distances between every pair of classes.
    ///
    /// [`QuasiMetric::Whqpm`] reads each class's working table as its raw
    /// data and fails for classes built from a known GRN (e.g. through
    /// [`CellClassRegistry::from_grns`]); use
    /// [`from_registry_with_raw`](Self::from_registry_with_raw) for those.
    pub fn from_registry(registry: &CellClassRegistry, metric: QuasiMetric) -> Result<Self> {
        Self::build(registry, metric, None)
    }

    /// [`QuasiMetric::Whqpm`] distances with `raw[i]` as the raw samples of
    /// class `i`.
    pub fn from_registry_with_raw(
        registry: &CellClassRegistry,
        raw: &[SampleTable],
    ) -> Result<Self> {
        ensure_len("raw tables", registry.len(), raw.len())?;
        Self::build(registry, QuasiMetric::Whqpm, Some(raw))
    }

    fn build(
        registry: &CellClassRegistry,
        metric: QuasiMetric,
        raw: Option<&[SampleTable]>,
    ) -> Result<Self> {
        let n = registry.len();

        #[cfg(feature = "parallel")]
        let data = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|i| {
                    (0..n)
                        .map(|j| class_distance(registry, metric, raw, i, j))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect::<Vec<f64>>()
        };
        #[cfg(not(feature = "parallel"))]
        let data = {
            let mut data = Vec::with_capacity(n * n);
            for i in 0..n {
                for j in 0..n {
                    data.push(class_distance(registry, metric, raw, i, j)?);
                }
            }
            data
        };

        debug!(n_classes = n, ?metric, "quasi-distance matrix");
        Ok(Self {
            names: registry.names().cloned().collect(),
            data,
            metric,
        })
    }

    /// Distance from `subjective` to `objective`, by index.
    pub fn get(&self, subjective: usize, objective: usize) -> Option<f64> {
        let n = self.n();
        if subjective < n && objective < n {
            Some(self.data[subjective * n + objective])
        } else {
            None
        }
    }

    /// Distances from class `subjective` to every class.
    pub fn row(&self, subjective: usize) -> Option<&[f64]> {
        let n = self.n();
        (subjective < n).then(|| &self.data[subjective * n..(subjective + 1) * n])
    }

    /// Number of classes.
    pub fn n(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[CellClassName] {
        &self.names
    }

    pub fn metric(&self) -> QuasiMetric {
        self.metric
    }

    /// Largest `|d(i, j) - d(j, i)|` over all pairs.
    pub fn max_asymmetry(&self) -> f64 {
        let n = self.n();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .map(|(i, j)| (self.data[i * n + j] - self.data[j * n + i]).abs())
            .fold(0.0, f64::max)
    }
}

impl Summarizable for QuasiDistanceMatrix {
    fn summary(&self) -> String {
        format!(
            "QuasiDistanceMatrix({:?}): {}x{}",
            self.metric,
            self.n(),
            self.n()
        )
    }
}

/// Distances from one subjective class to every class in the registry, in
/// registry order, itself included.
///
/// Raw data for [`QuasiMetric::Whqpm`] comes from the models as in
/// [`QuasiDistanceMatrix::from_registry`].
pub fn distances_from(
    subjective: impl Into<CellClassId>,
    registry: &CellClassRegistry,
    metric: QuasiMetric,
) -> Result<Vec<(CellClassName, f64)>> {
    let s = registry.index_of(subjective)?;
    registry
        .names()
        .enumerate()
        .map(|(o, name)| Ok((name.clone(), class_distance(registry, metric, None, s, o)?)))
        .collect()
}
