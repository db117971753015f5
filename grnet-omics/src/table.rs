//! Dense sample table for single-cell expression data.
//!
//! [`SampleTable`] stores a row-major matrix of `f64` values
//! (n_samples × n_genes) with sample and gene names. Gene names are unique and
//! become the labels of every GRN matrix inferred from the table.

use grnet_core::check::{ensure, ensure_len, ensure_unique};
use grnet_core::{GeneLabeled, GrnetError, Result, Summarizable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// A dense, row-major sample table (samples × genes).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleTable {
    data: Vec<f64>,
    n_samples: usize,
    n_genes: usize,
    sample_names: Vec<String>,
    gene_names: Vec<String>,
}

impl SampleTable {
    /// Create a table from one `Vec` per sample.
    ///
    /// Shape is checked before values: every row must have one value per gene
    /// and there must be one name per row. Gene names must be unique and all
    /// values finite.
    pub fn new(
        rows: Vec<Vec<f64>>,
        sample_names: Vec<String>,
        gene_names: Vec<String>,
    ) -> Result<Self> {
        ensure_len("sample_names", rows.len(), sample_names.len())?;
        let n_genes = gene_names.len();
        for (i, row) in rows.iter().enumerate() {
            ensure_len(&format!("rows[{i}]"), n_genes, row.len())?;
        }
        ensure_unique("gene_names", &gene_names)?;

        let n_samples = rows.len();
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(GrnetError::Invariant(format!(
                "sample table values should be finite, got {} at ({}, {})",
                data[pos],
                sample_names[pos / n_genes],
                gene_names[pos % n_genes]
            )));
        }

        Ok(Self {
            data,
            n_samples,
            n_genes,
            sample_names,
            gene_names,
        })
    }

    /// Create a table with sample names `s0, s1, ...`.
    pub fn with_genes(rows: Vec<Vec<f64>>, gene_names: Vec<String>) -> Result<Self> {
        let sample_names = (0..rows.len()).map(|i| format!("s{i}")).collect();
        Self::new(rows, sample_names, gene_names)
    }

    /// (n_samples, n_genes).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_samples, self.n_genes)
    }

    /// Number of samples (rows).
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Sample names in row order.
    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// Get a single value by sample and gene index.
    pub fn get(&self, sample_idx: usize, gene_idx: usize) -> Option<f64> {
        if sample_idx < self.n_samples && gene_idx < self.n_genes {
            Some(self.data[sample_idx * self.n_genes + gene_idx])
        } else {
            None
        }
    }

    /// One sample's values across all genes.
    pub fn row(&self, sample_idx: usize) -> Option<&[f64]> {
        if sample_idx < self.n_samples {
            let start = sample_idx * self.n_genes;
            Some(&self.data[start..start + self.n_genes])
        } else {
            None
        }
    }

    /// One gene's values across all samples (copied, since data is row-major).
    pub fn column(&self, gene_idx: usize) -> Option<Vec<f64>> {
        if gene_idx >= self.n_genes {
            return None;
        }
        Some(
            (0..self.n_samples)
                .map(|s| self.data[s * self.n_genes + gene_idx])
                .collect(),
        )
    }

    /// All gene columns, in gene order.
    pub fn columns(&self) -> Vec<Vec<f64>> {
        let mut cols = vec![Vec::with_capacity(self.n_samples); self.n_genes];
        for row in self.data.chunks(self.n_genes.max(1)).take(self.n_samples) {
            for (col, &v) in cols.iter_mut().zip(row) {
                col.push(v);
            }
        }
        cols
    }

    /// Draw `min(n, n_samples)` rows without replacement.
    ///
    /// The generator is seeded from `seed` for this call alone, so the same
    /// table, `n` and `seed` always select the same rows in the same order.
    pub fn subsample(&self, n: usize, seed: u64) -> Result<SampleTable> {
        ensure(n > 0, || {
            format!("sample count should be a positive integer, got {n}")
        })?;
        let k = n.min(self.n_samples);
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = rand::seq::index::sample(&mut rng, self.n_samples, k).into_vec();
        debug!(requested = n, drawn = k, seed, "subsampled sample table");
        self.select_samples(&picked)
    }

    /// Subset the table to the given sample (row) indices, in that order.
    pub fn select_samples(&self, indices: &[usize]) -> Result<SampleTable> {
        let mut data = Vec::with_capacity(indices.len() * self.n_genes);
        let mut names = Vec::with_capacity(indices.len());
        for &i in indices {
            let row = self.row(i).ok_or_else(|| {
                GrnetError::Invariant(format!(
                    "sample index {i} out of bounds (n_samples={})",
                    self.n_samples
                ))
            })?;
            data.extend_from_slice(row);
            names.push(self.sample_names[i].clone());
        }
        Ok(SampleTable {
            data,
            n_samples: indices.len(),
            n_genes: self.n_genes,
            sample_names: names,
            gene_names: self.gene_names.clone(),
        })
    }

    /// Subset and reorder the table's columns to `genes`.
    ///
    /// Fails with [`GrnetError::UnknownLabel`] for a gene the table lacks.
    pub fn select_genes(&self, genes: &[String]) -> Result<SampleTable> {
        let idx = genes
            .iter()
            .map(|g| {
                self.gene_index(g)
                    .ok_or_else(|| GrnetError::UnknownLabel(g.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;
        let mut data = Vec::with_capacity(self.n_samples * idx.len());
        for s in 0..self.n_samples {
            let base = s * self.n_genes;
            data.extend(idx.iter().map(|&j| self.data[base + j]));
        }
        Ok(SampleTable {
            data,
            n_samples: self.n_samples,
            n_genes: idx.len(),
            sample_names: self.sample_names.clone(),
            gene_names: genes.to_vec(),
        })
    }

    /// Fraction of samples with a nonzero value, per gene.
    ///
    /// Fails with [`GrnetError::Degenerate`] on a table without samples.
    pub fn detection_rates(&self) -> Result<Vec<f64>> {
        if self.n_samples == 0 {
            return Err(GrnetError::Degenerate(
                "detection rate of a table without samples".into(),
            ));
        }
        let mut counts = vec![0usize; self.n_genes];
        for row in self.data.chunks(self.n_genes.max(1)).take(self.n_samples) {
            for (c, &v) in counts.iter_mut().zip(row) {
                if v != 0.0 {
                    *c += 1;
                }
            }
        }
        let n = self.n_samples as f64;
        Ok(counts.into_iter().map(|c| c as f64 / n).collect())
    }

    /// Apply `f` to every value, keeping names.
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> SampleTable {
        SampleTable {
            data: self.data.iter().map(|&v| f(v)).collect(),
            ..self.clone()
        }
    }

    /// Per-sample row sums.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.n_samples)
            .map(|s| self.data[s * self.n_genes..(s + 1) * self.n_genes].iter().sum())
            .collect()
    }

    pub(crate) fn scale_rows(&self, factors: &[f64]) -> SampleTable {
        let mut data = self.data.clone();
        for (row, &f) in data.chunks_mut(self.n_genes.max(1)).zip(factors) {
            row.iter_mut().for_each(|v| *v *= f);
        }
        SampleTable {
            data,
            ..self.clone()
        }
    }
}

impl GeneLabeled for SampleTable {
    fn genes(&self) -> &[String] {
        &self.gene_names
    }
}

impl Summarizable for SampleTable {
    fn summary(&self) -> String {
        format!(
            "SampleTable: {} samples \u{00d7} {} genes",
            self.n_samples, self.n_genes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grnet_core::ErrorKind;

    fn genes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("g{i}")).collect()
    }

    fn table() -> SampleTable {
        SampleTable::with_genes(
            vec![
                vec![0.0, 1.0, 2.0],
                vec![3.0, 0.0, 5.0],
                vec![0.0, 0.0, 8.0],
                vec![9.0, 10.0, 0.0],
            ],
            genes(3),
        )
        .unwrap()
    }

    #[test]
    fn shape_and_access() {
        let t = table();
        assert_eq!(t.shape(), (4, 3));
        assert_eq!(t.get(1, 2), Some(5.0));
        assert_eq!(t.get(4, 0), None);
        assert_eq!(t.row(3), Some(&[9.0, 10.0, 0.0][..]));
        assert_eq!(t.column(0), Some(vec![0.0, 3.0, 0.0, 9.0]));
        assert_eq!(t.columns()[2], vec![2.0, 5.0, 8.0, 0.0]);
        assert_eq!(t.summary(), "SampleTable: 4 samples \u{00d7} 3 genes");
    }

    #[test]
    fn ragged_rows_are_contract_errors() {
        let err = SampleTable::with_genes(vec![vec![1.0, 2.0], vec![1.0]], genes(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Contract);
        assert!(err.to_string().contains("rows[1]"));
    }

    #[test]
    fn shape_checked_before_duplicates() {
        let dup = vec!["a".to_string(), "a".to_string()];
        let err = SampleTable::with_genes(vec![vec![1.0]], dup).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Contract);
    }

    #[test]
    fn duplicate_genes_rejected() {
        let dup = vec!["a".to_string(), "a".to_string()];
        let err = SampleTable::with_genes(vec![vec![1.0, 2.0]], dup).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
    }

    #[test]
    fn non_finite_rejected() {
        let err = SampleTable::with_genes(vec![vec![1.0, f64::NAN]], genes(2)).unwrap_err();
        assert!(err.to_string().contains("g1"));
    }

    #[test]
    fn subsample_is_deterministic() {
        let t = table();
        let a = t.subsample(2, 7).unwrap();
        let b = t.subsample(2, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_samples(), 2);
        assert_eq!(a.genes(), t.genes());
    }

    #[test]
    fn subsample_caps_at_table_size() {
        let t = table();
        let all = t.subsample(100, 0).unwrap();
        assert_eq!(all.n_samples(), 4);
        let mut names = all.sample_names().to_vec();
        names.sort();
        assert_eq!(names, t.sample_names());
    }

    #[test]
    fn subsample_zero_rejected() {
        let err = table().subsample(0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
    }

    #[test]
    fn select_genes_reorders() {
        let t = table();
        let s = t.select_genes(&["g2".into(), "g0".into()]).unwrap();
        assert_eq!(s.genes(), &["g2".to_string(), "g0".to_string()]);
        assert_eq!(s.row(1), Some(&[5.0, 3.0][..]));
        let err = t.select_genes(&["nope".into()]).unwrap_err();
        assert!(matches!(err, GrnetError::UnknownLabel(ref g) if g == "nope"));
    }

    #[test]
    fn detection_rates_count_nonzero() {
        let rates = table().detection_rates().unwrap();
        assert_eq!(rates, vec![0.5, 0.5, 0.75]);
        let empty = SampleTable::with_genes(vec![], genes(2)).unwrap();
        assert_eq!(
            empty.detection_rates().unwrap_err().kind(),
            ErrorKind::Degenerate
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_table() -> impl Strategy<Value = SampleTable> {
        (1usize..20, 1usize..6).prop_flat_map(|(n, d)| {
            proptest::collection::vec(proptest::collection::vec(0.0f64..50.0, d), n).prop_map(
                move |rows| {
                    let genes = (0..d).map(|i| format!("g{i}")).collect();
                    SampleTable::with_genes(rows, genes).unwrap()
                },
            )
        })
    }

    proptest! {
        #[test]
        fn same_seed_same_subsample(t in any_table(), n in 1usize..30, seed in any::<u64>()) {
            let a = t.subsample(n, seed).unwrap();
            let b = t.subsample(n, seed).unwrap();
            prop_assert_eq!(a.n_samples(), n.min(t.n_samples()));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn detection_rates_in_unit_interval(t in any_table()) {
            for r in t.detection_rates().unwrap() {
                prop_assert!((0.0..=1.0).contains(&r));
            }
        }
    }
}
