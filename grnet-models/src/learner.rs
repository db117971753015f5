//! Structure learning: the [`StructureLearner`] seam and the built-in PC
//! adjacency search.
//!
//! The PC search starts from the complete undirected graph over the genes
//! and, for conditioning-set sizes `l = 0, 1, ...`, removes the edge `x - y`
//! as soon as some set `S ⊆ adj(x) \ {y}` (or `adj(y) \ {x}`) of size `l`
//! renders `x` and `y` conditionally independent. Only the skeleton is
//! produced; edges are undirected.

use std::collections::BTreeSet;
use std::fmt;

use grnet_core::{GeneLabeled, GrnetError, Result};
use grnet_omics::SampleTable;
use grnet_stats::{fisher_z, CiOutcome, CorrelationMatrix, DiscreteData};
use tracing::{debug, trace};

use crate::config::{CiTest, PcConfig, PcVariant};

/// Learns an undirected skeleton over the genes of a sample table.
///
/// Implementations return index pairs `(i, j)` with `i < j` into the table's
/// gene order.
pub trait StructureLearner: fmt::Debug + Send + Sync {
    fn learn(&self, table: &SampleTable, config: &PcConfig) -> Result<Vec<(usize, usize)>>;
}

/// The built-in PC skeleton search.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcSkeleton;

impl StructureLearner for PcSkeleton {
    fn learn(&self, table: &SampleTable, config: &PcConfig) -> Result<Vec<(usize, usize)>> {
        config.validate()?;
        let n = table.n_genes();
        if n < 2 {
            return Ok(Vec::new());
        }
        let tester = Tester::build(table, config.ci_test)?;
        let alpha = config.significance_level;

        let mut adj: Vec<BTreeSet<usize>> = (0..n)
            .map(|i| (0..n).filter(|&j| j != i).collect())
            .collect();

        for level in 0..=config.max_cond_vars_for(n) {
            // A separating set of size `level` needs `level` other neighbors.
            if adj.iter().all(|a| a.len() <= level) {
                break;
            }
            let removed = match config.variant {
                PcVariant::Original => original_level(&tester, &mut adj, level, alpha)?,
                PcVariant::Stable => stable_level(&tester, &mut adj, level, alpha, false)?,
                PcVariant::Parallel => stable_level(&tester, &mut adj, level, alpha, true)?,
            };
            trace!(level, removed, "pc level finished");
        }

        let edges: Vec<(usize, usize)> = adj
            .iter()
            .enumerate()
            .flat_map(|(i, a)| a.iter().filter(move |&&j| j > i).map(move |&j| (i, j)))
            .collect();
        debug!(
            n_genes = n,
            n_edges = edges.len(),
            variant = ?config.variant,
            ci_test = ?config.ci_test,
            "pc skeleton learned"
        );
        Ok(edges)
    }
}

/// Precomputed statistics for the configured independence test.
enum Tester {
    FisherZ(CorrelationMatrix),
    ChiSquare(DiscreteData),
    GSquare(DiscreteData),
}

impl Tester {
    fn build(table: &SampleTable, test: CiTest) -> Result<Self> {
        let columns = table.columns();
        let vars: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
        Ok(match test {
            CiTest::PearsonR => Tester::FisherZ(CorrelationMatrix::from_variables(&vars)?),
            CiTest::ChiSquare => Tester::ChiSquare(DiscreteData::from_variables(&vars)?),
            CiTest::GSquare => Tester::GSquare(DiscreteData::from_variables(&vars)?),
        })
    }

    fn test(&self, x: usize, y: usize, given: &[usize]) -> Result<CiOutcome> {
        match self {
            Tester::FisherZ(corr) => fisher_z(corr, x, y, given),
            Tester::ChiSquare(data) => data.chi_square(x, y, given),
            Tester::GSquare(data) => data.g_square(x, y, given),
        }
    }
}

/// First conditioning set of size `level` drawn from the neighbors of `x` or
/// `y` that separates them, if any.
///
/// Sets whose statistic is undefined (singular partial correlations) are
/// skipped rather than treated as separating.
fn separating_set(
    tester: &Tester,
    x: usize,
    y: usize,
    adj: &[BTreeSet<usize>],
    level: usize,
    alpha: f64,
) -> Result<Option<Vec<usize>>> {
    for (a, b) in [(x, y), (y, x)] {
        let candidates: Vec<usize> = adj[a].iter().copied().filter(|&v| v != b).collect();
        for given in Combinations::new(&candidates, level) {
            match tester.test(x, y, &given) {
                Ok(outcome) if outcome.independent(alpha) => {
                    trace!(x, y, ?given, p = outcome.p_value, "separated");
                    return Ok(Some(given));
                }
                Ok(_) => {}
                Err(GrnetError::Degenerate(msg)) => trace!(x, y, ?given, %msg, "skipped"),
                Err(e) => return Err(e),
            }
        }
        if level == 0 {
            break;
        }
    }
    Ok(None)
}

fn current_edges(adj: &[BTreeSet<usize>]) -> Vec<(usize, usize)> {
    adj.iter()
        .enumerate()
        .flat_map(|(i, a)| a.iter().filter(move |&&j| j > i).map(move |&j| (i, j)))
        .collect()
}

fn original_level(
    tester: &Tester,
    adj: &mut [BTreeSet<usize>],
    level: usize,
    alpha: f64,
) -> Result<usize> {
    let mut removed = 0;
    for (x, y) in current_edges(adj) {
        if separating_set(tester, x, y, adj, level, alpha)?.is_some() {
            adj[x].remove(&y);
            adj[y].remove(&x);
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
fn stable_level(
    tester: &Tester,
    adj: &mut [BTreeSet<usize>],
    level: usize,
    alpha: f64,
    parallel: bool,
) -> Result<usize> {
    let frozen = adj.to_vec();
    let pairs = current_edges(&frozen);
    let decide = |&(x, y): &(usize, usize)| -> Result<Option<(usize, usize)>> {
        Ok(separating_set(tester, x, y, &frozen, level, alpha)?.map(|_| (x, y)))
    };

    #[cfg(feature = "parallel")]
    let separated: Vec<Option<(usize, usize)>> = if parallel {
        use rayon::prelude::*;
        pairs.par_iter().map(decide).collect::<Result<_>>()?
    } else {
        pairs.iter().map(decide).collect::<Result<_>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let separated: Vec<Option<(usize, usize)>> =
        pairs.iter().map(decide).collect::<Result<_>>()?;

    let mut removed = 0;
    for (x, y) in separated.into_iter().flatten() {
        adj[x].remove(&y);
        adj[y].remove(&x);
        removed += 1;
    }
    Ok(removed)
}

/// `k`-subsets of `items` in lexicographic index order.
struct Combinations<'a> {
    items: &'a [usize],
    idx: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    fn new(items: &'a [usize], k: usize) -> Self {
        Self {
            items,
            idx: (0..k).collect(),
            done: k > items.len(),
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let out = self.idx.iter().map(|&i| self.items[i]).collect();
        let (n, k) = (self.items.len(), self.idx.len());
        match (0..k).rev().find(|&i| self.idx[i] < n - k + i) {
            Some(i) => {
                self.idx[i] += 1;
                for j in i + 1..k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(out)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use grnet_omics::SampleTable;

    /// Continuous chain x → y → z built from mutually orthogonal ±1 Walsh
    /// columns, so x ⟂ z | y holds exactly.
    pub fn gaussian_chain() -> SampleTable {
        let walsh = |k: usize, i: usize| if (i & k).count_ones() % 2 == 0 { 1.0 } else { -1.0 };
        let rows = (0..64)
            .map(|i| {
                let (a, b, c) = (walsh(1, i), walsh(2, i), walsh(4, i));
                vec![a, a + b, a + b + c]
            })
            .collect();
        SampleTable::with_genes(rows, vec!["x".into(), "y".into(), "z".into()]).unwrap()
    }

    /// Binary chain x → y → z where z depends on x only through y.
    pub fn binary_chain() -> SampleTable {
        let cells = [
            ([0.0, 0.0, 0.0], 64),
            ([0.0, 0.0, 1.0], 16),
            ([0.0, 1.0, 0.0], 4),
            ([0.0, 1.0, 1.0], 16),
            ([1.0, 0.0, 0.0], 16),
            ([1.0, 0.0, 1.0], 4),
            ([1.0, 1.0, 0.0], 16),
            ([1.0, 1.0, 1.0], 64),
        ];
        let rows = cells
            .iter()
            .flat_map(|(row, count)| std::iter::repeat(row.to_vec()).take(*count))
            .collect();
        SampleTable::with_genes(rows, vec!["x".into(), "y".into(), "z".into()]).unwrap()
    }
}
