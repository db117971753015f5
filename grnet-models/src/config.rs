//! Configuration for PC structure learning.

use grnet_core::check::ensure;
use grnet_core::Result;

/// Adjacency-search variant of the PC algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PcVariant {
    /// Remove edges as soon as a separating set is found.
    Original,
    /// Freeze adjacencies per conditioning level; result is order independent.
    #[default]
    Stable,
    /// `Stable`, with each level's tests run on the rayon pool when the
    /// `parallel` feature is enabled.
    Parallel,
}

/// Conditional-independence test used by the PC search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CiTest {
    /// Fisher z on partial Pearson correlation.
    #[default]
    PearsonR,
    /// Pearson χ² on stratified contingency tables.
    ChiSquare,
    /// Log-likelihood G on stratified contingency tables.
    GSquare,
}

/// Configuration for PC structure learning.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcConfig {
    /// Adjacency-search variant.
    pub variant: PcVariant,
    /// Independence test.
    pub ci_test: CiTest,
    /// Largest conditioning set size; `None` means the number of genes.
    pub max_cond_vars: Option<usize>,
    /// Significance level α; an edge is removed when p ≥ α.
    pub significance_level: f64,
}

impl Default for PcConfig {
    fn default() -> Self {
        Self {
            variant: PcVariant::Stable,
            ci_test: CiTest::PearsonR,
            max_cond_vars: None,
            significance_level: 0.01,
        }
    }
}

impl PcConfig {
    /// Defaults for presence/absence data: χ² instead of Fisher z.
    pub fn binary() -> Self {
        Self {
            ci_test: CiTest::ChiSquare,
            ..Self::default()
        }
    }

    /// Check that α lies strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        let alpha = self.significance_level;
        ensure(alpha > 0.0 && alpha < 1.0, || {
            format!("significance level should lie in (0, 1), got {alpha}")
        })
    }

    /// Conditioning-set bound for `n_genes` genes.
    pub fn max_cond_vars_for(&self, n_genes: usize) -> usize {
        self.max_cond_vars.unwrap_or(n_genes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PcConfig::default();
        assert_eq!(c.variant, PcVariant::Stable);
        assert_eq!(c.ci_test, CiTest::PearsonR);
        assert_eq!(c.significance_level, 0.01);
        assert_eq!(c.max_cond_vars_for(7), 7);
        assert_eq!(PcConfig::binary().ci_test, CiTest::ChiSquare);
    }

    #[test]
    fn alpha_bounds() {
        for alpha in [0.0, 1.0, -0.1, f64::NAN] {
            let c = PcConfig {
                significance_level: alpha,
                ..PcConfig::default()
            };
            assert!(c.validate().is_err(), "alpha={alpha}");
        }
        assert!(PcConfig::default().validate().is_ok());
    }
}
