//! Conditional-independence tests.
//!
//! Two families back the structure learner:
//!
//! - [`fisher_z`]: Gaussian test on partial correlations (continuous data)
//! - [`DiscreteData::chi_square`] / [`DiscreteData::g_square`]: stratified
//!   contingency tests for discrete (e.g. binarized) data
//!
//! Every test answers "is `x ⟂ y | given`?" with a p-value; a large p-value
//! means independence cannot be rejected.

use std::collections::HashMap;

use grnet_core::{GrnetError, Result, Summarizable};

use crate::correlation::CorrelationMatrix;
use crate::distribution::{ChiSquared, Distribution, Normal};

/// Outcome of a conditional-independence test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CiOutcome {
    /// Test statistic (z score, χ² or G).
    pub statistic: f64,
    /// p-value of the null hypothesis of independence.
    pub p_value: f64,
    /// Degrees of freedom, if applicable.
    pub degrees_of_freedom: Option<f64>,
}

impl CiOutcome {
    /// Whether independence is accepted at `alpha`.
    pub fn independent(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }

    fn undecidable() -> Self {
        Self {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom: None,
        }
    }
}

impl Summarizable for CiOutcome {
    fn summary(&self) -> String {
        match self.degrees_of_freedom {
            Some(df) => format!(
                "statistic={:.4}, df={:.1}, p={:.6}",
                self.statistic, df, self.p_value
            ),
            None => format!("statistic={:.4}, p={:.6}", self.statistic, self.p_value),
        }
    }
}

/// Fisher z test of `x ⟂ y | given` from a correlation matrix.
///
/// `z = atanh(r) · sqrt(n - |given| - 3)`; two-sided normal p-value. With too
/// few observations for the conditioning set the test is undecidable and
/// reports p = 1.
pub fn fisher_z(corr: &CorrelationMatrix, x: usize, y: usize, given: &[usize]) -> Result<CiOutcome> {
    let r = corr.partial(x, y, given)?;
    let dof = corr.n_obs() as f64 - given.len() as f64 - 3.0;
    if dof <= 0.0 {
        return Ok(CiOutcome::undecidable());
    }
    let r = r.clamp(-1.0 + 1e-12, 1.0 - 1e-12);
    let z = 0.5 * ((1.0 + r) / (1.0 - r)).ln() * dof.sqrt();
    Ok(CiOutcome {
        statistic: z,
        p_value: Normal::standard().two_sided_p(z),
        degrees_of_freedom: None,
    })
}

/// Variables encoded as small integer levels, one column per variable.
#[derive(Debug, Clone)]
pub struct DiscreteData {
    columns: Vec<Vec<u32>>,
    n_obs: usize,
}

#[derive(Clone, Copy)]
enum Statistic {
    Pearson,
    LogLikelihood,
}

impl DiscreteData {
    /// Encode each variable's distinct values as levels 0, 1, 2, ...
    ///
    /// Values are compared by bit pattern, so `0.0` and `-0.0` are distinct
    /// levels; callers feed already-discretized data.
    pub fn from_variables(variables: &[&[f64]]) -> Result<Self> {
        let n_obs = variables.first().map_or(0, |v| v.len());
        let mut columns = Vec::with_capacity(variables.len());
        for (i, v) in variables.iter().enumerate() {
            if v.len() != n_obs {
                return Err(GrnetError::contract(
                    format!("variables[{i}]"),
                    format!("{n_obs} observations"),
                    format!("{} observations", v.len()),
                ));
            }
            let mut levels: HashMap<u64, u32> = HashMap::new();
            let coded = v
                .iter()
                .map(|x| {
                    let next = levels.len() as u32;
                    *levels.entry(x.to_bits()).or_insert(next)
                })
                .collect();
            columns.push(coded);
        }
        Ok(Self { columns, n_obs })
    }

    /// Number of variables.
    pub fn n_vars(&self) -> usize {
        self.columns.len()
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Pearson χ² test of `x ⟂ y | given`, summed over strata of `given`.
    pub fn chi_square(&self, x: usize, y: usize, given: &[usize]) -> Result<CiOutcome> {
        self.stratified(x, y, given, Statistic::Pearson)
    }

    /// Log-likelihood (G) test of `x ⟂ y | given`, summed over strata.
    pub fn g_square(&self, x: usize, y: usize, given: &[usize]) -> Result<CiOutcome> {
        self.stratified(x, y, given, Statistic::LogLikelihood)
    }

    fn stratified(
        &self,
        x: usize,
        y: usize,
        given: &[usize],
        stat: Statistic,
    ) -> Result<CiOutcome> {
        for &v in [x, y].iter().chain(given) {
            if v >= self.columns.len() {
                return Err(GrnetError::Invariant(format!(
                    "variable index {v} out of range (n_vars={})",
                    self.columns.len()
                )));
            }
        }

        // Observations grouped by the joint level of the conditioning set,
        // in first-seen order so sums are reproducible.
        let mut order: Vec<Vec<u32>> = Vec::new();
        let mut strata: HashMap<Vec<u32>, Vec<usize>> = HashMap::new();
        for obs in 0..self.n_obs {
            let key: Vec<u32> = given.iter().map(|&g| self.columns[g][obs]).collect();
            strata
                .entry(key)
                .or_insert_with_key(|k| {
                    order.push(k.clone());
                    Vec::new()
                })
                .push(obs);
        }

        let (mut total, mut dof) = (0.0, 0.0);
        for key in &order {
            let rows = &strata[key];
            let (s, d) = self.stratum_statistic(x, y, rows, stat);
            total += s;
            dof += d;
        }

        if dof <= 0.0 {
            return Ok(CiOutcome {
                statistic: total,
                ..CiOutcome::undecidable()
            });
        }
        let p_value = ChiSquared::new(dof)?.sf(total).clamp(0.0, 1.0);
        Ok(CiOutcome {
            statistic: total,
            p_value,
            degrees_of_freedom: Some(dof),
        })
    }

    /// Statistic and degrees of freedom of one stratum's x × y table, over the
    /// levels actually observed in the stratum.
    fn stratum_statistic(&self, x: usize, y: usize, rows: &[usize], stat: Statistic) -> (f64, f64) {
        let mut x_levels: Vec<u32> = rows.iter().map(|&r| self.columns[x][r]).collect();
        let mut y_levels: Vec<u32> = rows.iter().map(|&r| self.columns[y][r]).collect();
        x_levels.sort_unstable();
        x_levels.dedup();
        y_levels.sort_unstable();
        y_levels.dedup();
        let (nx, ny) = (x_levels.len(), y_levels.len());
        if nx < 2 || ny < 2 {
            return (0.0, 0.0);
        }

        let mut table = vec![0.0; nx * ny];
        for &r in rows {
            let i = x_levels.binary_search(&self.columns[x][r]).unwrap_or(0);
            let j = y_levels.binary_search(&self.columns[y][r]).unwrap_or(0);
            table[i * ny + j] += 1.0;
        }
        let total = rows.len() as f64;
        let row_sums: Vec<f64> = (0..nx).map(|i| table[i * ny..(i + 1) * ny].iter().sum()).collect();
        let col_sums: Vec<f64> = (0..ny).map(|j| (0..nx).map(|i| table[i * ny + j]).sum()).collect();

        let mut s = 0.0;
        for i in 0..nx {
            for j in 0..ny {
                let expected = row_sums[i] * col_sums[j] / total;
                let observed = table[i * ny + j];
                if expected <= 0.0 {
                    continue;
                }
                s += match stat {
                    Statistic::Pearson => (observed - expected).powi(2) / expected,
                    Statistic::LogLikelihood if observed > 0.0 => {
                        2.0 * observed * (observed / expected).ln()
                    }
                    Statistic::LogLikelihood => 0.0,
                };
            }
        }
        (s, ((nx - 1) * (ny - 1)) as f64)
    }
}
