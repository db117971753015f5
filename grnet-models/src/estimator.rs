//! GRN estimators.
//!
//! Every learning estimator owns a working [`SampleTable`] (the input, or a
//! seeded random subsample of it) and produces an [`EdgeSet`] on
//! [`estimate`]. The GRN matrix is the projection of those edges onto the
//! working table's genes. [`Pretrained`] has no samples and hands back the
//! matrix it was built from.
//!
//! [`estimate`]: Estimator::estimate

use std::fmt;
use std::sync::Arc;

use grnet_core::{GeneLabeled, GrnetError, Result, Summarizable};
use grnet_omics::{binarize, GrnMatrix, SampleTable, WeightedGrn};
use tracing::{debug, info};

use crate::config::PcConfig;
use crate::edges::{project_edges, EdgeSet};
use crate::learner::{PcSkeleton, StructureLearner};

/// The working table: all of `data`, or `min(n, n_samples)` rows drawn
/// without replacement by a generator seeded with `seed`.
fn working_table(data: SampleTable, sample_count: Option<usize>, seed: u64) -> Result<SampleTable> {
    match sample_count {
        None => Ok(data),
        Some(n) => data.subsample(n, seed),
    }
}

fn require_edges(edges: Option<&EdgeSet>) -> Result<&EdgeSet> {
    edges.ok_or(GrnetError::NotEstimated)
}

fn edges_from_indices(table: &SampleTable, pairs: &[(usize, usize)]) -> Result<EdgeSet> {
    let genes = table.genes();
    let name = |i: usize| {
        genes.get(i).cloned().ok_or_else(|| {
            GrnetError::Invariant(format!(
                "learned edge references gene index {i} (n_genes={})",
                genes.len()
            ))
        })
    };
    let mut edges = EdgeSet::new();
    for &(i, j) in pairs {
        edges.insert(name(i)?, name(j)?)?;
    }
    Ok(edges)
}

/// Baseline estimator: no edges, so its GRN is the identity.
#[derive(Debug, Clone)]
pub struct Empty {
    data: SampleTable,
    edges: Option<EdgeSet>,
}

impl Empty {
    pub fn new(data: SampleTable, sample_count: Option<usize>, seed: u64) -> Result<Self> {
        Ok(Self {
            data: working_table(data, sample_count, seed)?,
            edges: None,
        })
    }

    pub fn estimate(&mut self) -> Result<()> {
        self.edges = Some(EdgeSet::new());
        Ok(())
    }

    pub fn get_matrix(&self) -> Result<GrnMatrix> {
        project_edges(self.data.genes(), require_edges(self.edges.as_ref())?)
    }
}

/// PC structure learning on the working table.
#[derive(Debug, Clone)]
pub struct Pc {
    data: SampleTable,
    config: PcConfig,
    learner: Arc<dyn StructureLearner>,
    edges: Option<EdgeSet>,
}

impl Pc {
    /// Estimator with [`PcConfig::default`] and the built-in [`PcSkeleton`].
    pub fn new(data: SampleTable, sample_count: Option<usize>, seed: u64) -> Result<Self> {
        Ok(Self {
            data: working_table(data, sample_count, seed)?,
            config: PcConfig::default(),
            learner: Arc::new(PcSkeleton),
            edges: None,
        })
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PcConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the structure learner.
    pub fn with_learner(mut self, learner: impl StructureLearner + 'static) -> Self {
        self.learner = Arc::new(learner);
        self
    }

    pub fn config(&self) -> &PcConfig {
        &self.config
    }

    pub fn estimate(&mut self) -> Result<()> {
        let pairs = self.learner.learn(&self.data, &self.config)?;
        let edges = edges_from_indices(&self.data, &pairs)?;
        info!(
            n_samples = self.data.n_samples(),
            n_genes = self.data.n_genes(),
            n_edges = edges.len(),
            "pc estimate"
        );
        self.edges = Some(edges);
        Ok(())
    }

    pub fn get_matrix(&self) -> Result<GrnMatrix> {
        project_edges(self.data.genes(), require_edges(self.edges.as_ref())?)
    }
}

/// PC structure learning on the presence/absence pattern of the working
/// table.
///
/// [`get_matrix`](BinaryPc::get_matrix) returns a regular unit-diagonal GRN.
/// The detection-weighted form, whose diagonal holds each gene's coverage,
/// is available from [`coverage_matrix`](BinaryPc::coverage_matrix).
#[derive(Debug, Clone)]
pub struct BinaryPc {
    data: SampleTable,
    config: PcConfig,
    learner: Arc<dyn StructureLearner>,
    edges: Option<EdgeSet>,
}

impl BinaryPc {
    /// Estimator with [`PcConfig::binary`] and the built-in [`PcSkeleton`].
    pub fn new(data: SampleTable, sample_count: Option<usize>, seed: u64) -> Result<Self> {
        Ok(Self {
            data: working_table(data, sample_count, seed)?,
            config: PcConfig::binary(),
            learner: Arc::new(PcSkeleton),
            edges: None,
        })
    }

    pub fn with_config(mut self, config: PcConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_learner(mut self, learner: impl StructureLearner + 'static) -> Self {
        self.learner = Arc::new(learner);
        self
    }

    pub fn config(&self) -> &PcConfig {
        &self.config
    }

    pub fn estimate(&mut self) -> Result<()> {
        let binary = binarize(&self.data)?;
        let pairs = self.learner.learn(&binary.table, &self.config)?;
        let edges = edges_from_indices(&self.data, &pairs)?;
        info!(
            n_samples = self.data.n_samples(),
            n_genes = self.data.n_genes(),
            n_edges = edges.len(),
            "binary pc estimate"
        );
        self.edges = Some(edges);
        Ok(())
    }

    pub fn get_matrix(&self) -> Result<GrnMatrix> {
        project_edges(self.data.genes(), require_edges(self.edges.as_ref())?)
    }

    /// The estimated GRN with each gene's detection rate on the diagonal.
    pub fn coverage_matrix(&self) -> Result<WeightedGrn> {
        let grn = self.get_matrix()?;
        WeightedGrn::new(grn, self.data.detection_rates()?)
    }
}

/// An estimator wrapping an already-known GRN matrix.
///
/// It carries no sample table and is estimated from construction on. A 1
/// between two rows that share a gene label has no edge-set counterpart, but
/// [`get_matrix`](Self::get_matrix) still returns it.
#[derive(Debug, Clone)]
pub struct Pretrained {
    grn: GrnMatrix,
    edges: EdgeSet,
}

impl Pretrained {
    pub fn new(grn: GrnMatrix) -> Result<Self> {
        let mut edges = EdgeSet::new();
        for (a, b) in grn.edges().into_iter().filter(|(a, b)| a != b) {
            edges.insert(a, b)?;
        }
        debug!(n_genes = grn.n_genes(), n_edges = edges.len(), "pretrained model");
        Ok(Self { grn, edges })
    }

    /// No-op; the matrix is fixed.
    pub fn estimate(&mut self) -> Result<()> {
        Ok(())
    }

    /// The supplied matrix, unchanged.
    pub fn get_matrix(&self) -> Result<GrnMatrix> {
        Ok(self.grn.clone())
    }
}

/// Which estimator a value of [`Estimator`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EstimatorKind {
    Empty,
    Pc,
    BinaryPc,
    Pretrained,
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EstimatorKind::Empty => "empty",
            EstimatorKind::Pc => "pc",
            EstimatorKind::BinaryPc => "binary-pc",
            EstimatorKind::Pretrained => "pretrained",
        })
    }
}

/// Any GRN estimator.
#[derive(Debug, Clone)]
pub enum Estimator {
    Empty(Empty),
    Pc(Pc),
    BinaryPc(BinaryPc),
    Pretrained(Pretrained),
}

impl Estimator {
    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::Empty(_) => EstimatorKind::Empty,
            Estimator::Pc(_) => EstimatorKind::Pc,
            Estimator::BinaryPc(_) => EstimatorKind::BinaryPc,
            Estimator::Pretrained(_) => EstimatorKind::Pretrained,
        }
    }

    /// The working table estimation runs on; `None` for [`Pretrained`].
    pub fn data(&self) -> Option<&SampleTable> {
        match self {
            Estimator::Empty(e) => Some(&e.data),
            Estimator::Pc(e) => Some(&e.data),
            Estimator::BinaryPc(e) => Some(&e.data),
            Estimator::Pretrained(_) => None,
        }
    }

    /// Estimated edges, or `None` before [`estimate`](Self::estimate).
    pub fn edges(&self) -> Option<&EdgeSet> {
        match self {
            Estimator::Empty(e) => e.edges.as_ref(),
            Estimator::Pc(e) => e.edges.as_ref(),
            Estimator::BinaryPc(e) => e.edges.as_ref(),
            Estimator::Pretrained(e) => Some(&e.edges),
        }
    }

    pub fn is_estimated(&self) -> bool {
        self.edges().is_some()
    }

    pub fn estimate(&mut self) -> Result<()> {
        match self {
            Estimator::Empty(e) => e.estimate(),
            Estimator::Pc(e) => e.estimate(),
            Estimator::BinaryPc(e) => e.estimate(),
            Estimator::Pretrained(e) => e.estimate(),
        }
    }

    /// The estimated GRN matrix; [`GrnetError::NotEstimated`] before
    /// [`estimate`](Self::estimate).
    pub fn get_matrix(&self) -> Result<GrnMatrix> {
        match self {
            Estimator::Empty(e) => e.get_matrix(),
            Estimator::Pc(e) => e.get_matrix(),
            Estimator::BinaryPc(e) => e.get_matrix(),
            Estimator::Pretrained(e) => e.get_matrix(),
        }
    }
}

impl From<Empty> for Estimator {
    fn from(e: Empty) -> Self {
        Estimator::Empty(e)
    }
}

impl From<Pc> for Estimator {
    fn from(e: Pc) -> Self {
        Estimator::Pc(e)
    }
}

impl From<BinaryPc> for Estimator {
    fn from(e: BinaryPc) -> Self {
        Estimator::BinaryPc(e)
    }
}

impl From<Pretrained> for Estimator {
    fn from(e: Pretrained) -> Self {
        Estimator::Pretrained(e)
    }
}

impl GeneLabeled for Estimator {
    fn genes(&self) -> &[String] {
        match self {
            Estimator::Pretrained(e) => e.grn.genes(),
            other => other.data().map_or(&[][..], |d| d.genes()),
        }
    }
}

impl Summarizable for Estimator {
    fn summary(&self) -> String {
        let state = match self.edges() {
            Some(e) => format!("{} edges", e.len()),
            None => "not estimated".to_string(),
        };
        let samples = match self.data() {
            Some(d) => format!("{} samples", d.n_samples()),
            None => "no samples".to_string(),
        };
        format!(
            "Estimator({}): {samples} × {} genes, {state}",
            self.kind(),
            self.n_genes()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CiTest, PcVariant};
    use crate::learner::fixtures::{binary_chain, gaussian_chain};

    fn genes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("g{i}")).collect()
    }

    fn counts(n_samples: usize, n_genes: usize) -> SampleTable {
        let rows = (0..n_samples)
            .map(|s| (0..n_genes).map(|g| ((s * 3 + g * 5) % 4) as f64).collect())
            .collect();
        SampleTable::with_genes(rows, genes(n_genes)).unwrap()
    }

    fn all_kinds(data: &SampleTable) -> Vec<Estimator> {
        vec![
            Empty::new(data.clone(), None, 0).unwrap().into(),
            Pc::new(data.clone(), None, 0).unwrap().into(),
            BinaryPc::new(data.clone(), None, 0).unwrap().into(),
        ]
    }

    #[test]
    fn get_matrix_requires_estimate() {
        for mut est in all_kinds(&counts(20, 3)) {
            assert!(!est.is_estimated());
            assert!(matches!(est.get_matrix(), Err(GrnetError::NotEstimated)));
            est.estimate().unwrap();
            let m = est.get_matrix().unwrap();
            assert_eq!(m.n_genes(), 3);
            for i in 0..3 {
                assert_eq!(m.get(i, i), Some(1));
            }
        }
    }

    #[test]
    fn empty_is_identity() {
        let mut est = Empty::new(counts(5, 4), None, 0).unwrap();
        est.estimate().unwrap();
        assert_eq!(est.get_matrix().unwrap(), GrnMatrix::identity(genes(4)));
    }

    #[test]
    fn zero_sample_count_rejected() {
        let err = Empty::new(counts(5, 2), Some(0), 0).unwrap_err();
        assert_eq!(err.kind(), grnet_core::ErrorKind::Invariant);
    }

    #[test]
    fn subsampling_is_deterministic() {
        let data = counts(50, 3);
        let a: Estimator = Pc::new(data.clone(), Some(10), 42).unwrap().into();
        let b: Estimator = Pc::new(data.clone(), Some(10), 42).unwrap().into();
        assert_eq!(a.data(), b.data());
        assert_eq!(a.data().unwrap().n_samples(), 10);

        let all: Estimator = Empty::new(data.clone(), Some(500), 1).unwrap().into();
        assert_eq!(all.data().unwrap().n_samples(), 50);
    }

    #[test]
    fn pc_recovers_chain() {
        let mut est = Pc::new(gaussian_chain(), None, 0).unwrap();
        est.estimate().unwrap();
        let m = est.get_matrix().unwrap();
        assert_eq!(
            m.to_rows(),
            vec![
                vec![1.0, 1.0, 0.0],
                vec![1.0, 1.0, 1.0],
                vec![0.0, 1.0, 1.0],
            ]
        );
    }

    #[test]
    fn pc_config_is_applied() {
        let config = PcConfig {
            variant: PcVariant::Original,
            max_cond_vars: Some(0),
            ..PcConfig::default()
        };
        let mut est = Pc::new(gaussian_chain(), None, 0)
            .unwrap()
            .with_config(config)
            .unwrap();
        est.estimate().unwrap();
        assert_eq!(est.get_matrix().unwrap(), GrnMatrix::ones(est.data.genes().to_vec()));
    }

    #[test]
    fn binary_pc_uses_presence_pattern() {
        // Scaling nonzero entries leaves the presence pattern unchanged.
        let scaled = binary_chain().map_values(|v| v * 7.0);
        let mut est = BinaryPc::new(scaled, None, 0).unwrap();
        assert_eq!(est.config().ci_test, CiTest::ChiSquare);
        est.estimate().unwrap();
        let edges = est.edges.clone().unwrap();
        assert!(edges.contains("x", "y"));
        assert!(edges.contains("y", "z"));
        assert!(!edges.contains("x", "z"));
    }

    #[test]
    fn binary_pc_coverage_diagonal() {
        let mut est = BinaryPc::new(binary_chain(), None, 0).unwrap();
        assert!(matches!(est.coverage_matrix(), Err(GrnetError::NotEstimated)));
        est.estimate().unwrap();
        let w = est.coverage_matrix().unwrap();
        assert_eq!(w.diagonal(), &[0.5, 0.5, 0.5]);
        assert_eq!(w.grn(), &est.get_matrix().unwrap());
    }

    #[derive(Debug)]
    struct FixedLearner(Vec<(usize, usize)>);

    impl StructureLearner for FixedLearner {
        fn learn(&self, _: &SampleTable, _: &PcConfig) -> Result<Vec<(usize, usize)>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn custom_learner_is_used() {
        let mut est = Pc::new(counts(10, 4), None, 0)
            .unwrap()
            .with_learner(FixedLearner(vec![(0, 3)]));
        est.estimate().unwrap();
        let m = est.get_matrix().unwrap();
        assert_eq!(m.edges(), vec![
            ("g0".to_string(), "g3".to_string()),
            ("g3".to_string(), "g0".to_string()),
        ]);
    }

    #[test]
    fn learner_with_bad_index_is_rejected() {
        let mut est = Pc::new(counts(10, 2), None, 0)
            .unwrap()
            .with_learner(FixedLearner(vec![(0, 9)]));
        assert!(est.estimate().is_err());
        assert!(!Estimator::from(est).is_estimated());
    }

    #[test]
    fn pretrained_round_trip() {
        let grn = GrnMatrix::lower_triangular(genes(4));
        let mut est: Estimator = Pretrained::new(grn.clone()).unwrap().into();
        assert!(est.is_estimated());
        est.estimate().unwrap();
        assert_eq!(est.get_matrix().unwrap(), grn);
        assert_eq!(est.edges().unwrap().len(), 6);
        assert!(est.data().is_none());
        assert_eq!(est.genes(), genes(4).as_slice());
        assert_eq!(est.summary(), "Estimator(pretrained): no samples × 4 genes, 6 edges");
    }

    #[test]
    fn pretrained_keeps_repeated_labels() {
        let labels = vec!["a".to_string(), "a".to_string(), "b".to_string()];
        let rows = vec![
            vec![1.0, 1.0, 0.0],
            vec![0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0],
        ];
        let grn = GrnMatrix::from_rows(labels, rows).unwrap();
        let est = Pretrained::new(grn.clone()).unwrap();
        assert_eq!(est.get_matrix().unwrap(), grn);
        let edges: Vec<_> = est.edges.iter().collect();
        assert_eq!(edges, vec![("a", "b")]);
    }

    #[test]
    fn summary_reports_state() {
        let mut est: Estimator = Empty::new(counts(3, 2), None, 0).unwrap().into();
        assert_eq!(est.summary(), "Estimator(empty): 3 samples × 2 genes, not estimated");
        est.estimate().unwrap();
        assert_eq!(est.summary(), "Estimator(empty): 3 samples × 2 genes, 0 edges");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// GRNs whose labels are drawn from a small pool, so repeats occur.
    fn any_grn() -> impl Strategy<Value = GrnMatrix> {
        (1usize..7).prop_flat_map(|d| {
            (
                proptest::collection::vec(0usize..4, d),
                proptest::collection::vec(any::<bool>(), d * d),
            )
                .prop_map(move |(labels, bits)| {
                    let genes = labels.iter().map(|l| format!("g{l}")).collect();
                    let rows = (0..d)
                        .map(|i| {
                            (0..d)
                                .map(|j| if i == j || bits[i * d + j] { 1.0 } else { 0.0 })
                                .collect()
                        })
                        .collect();
                    GrnMatrix::from_rows(genes, rows).unwrap()
                })
        })
    }

    proptest! {
        #[test]
        fn pretrained_returns_its_matrix(m in any_grn()) {
            let mut est: Estimator = Pretrained::new(m.clone()).unwrap().into();
            est.estimate().unwrap();
            prop_assert_eq!(est.get_matrix().unwrap(), m);
        }

        #[test]
        fn pretrained_edges_cover_distinct_label_pairs(m in any_grn()) {
            let est = Pretrained::new(m.clone()).unwrap();
            for (a, b) in m.edges() {
                prop_assert_eq!(est.edges.contains(&a, &b), a != b);
            }
        }
    }
}
