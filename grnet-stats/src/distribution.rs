//! Probability distributions and numerical helpers.
//!
//! Provides the [`Distribution`] trait with [`Normal`] and [`ChiSquared`]
//! implementations, plus the special functions ([`erf`], [`ln_gamma`],
//! [`gammainc`]) the independence tests need for p-values.

use core::f64::consts::PI;

use grnet_core::{GrnetError, Result};

// ── Numerical helpers ──────────────────────────────────────────────────────

/// Error function via Abramowitz & Stegun 7.1.26 (max error ~1.5e-7).
pub fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Natural log of the gamma function via the Lanczos approximation (g=7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Γ(x) = π / (sin(πx) · Γ(1-x))
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let ag = COEFFS
            .iter()
            .enumerate()
            .fold(0.99999999999980993_f64, |acc, (i, &c)| {
                acc + c / (x + i as f64 + 1.0)
            });
        let t = x + 7.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

/// Regularized lower incomplete gamma function P(a, x) = γ(a, x) / Γ(a).
///
/// Series expansion below `a + 1`, continued fraction for Q = 1 - P above.
pub fn gammainc(a: f64, x: f64) -> Result<f64> {
    if a <= 0.0 {
        return Err(GrnetError::Invariant("gammainc: a must be positive".into()));
    }
    if x < 0.0 {
        return Err(GrnetError::Invariant(
            "gammainc: x must be non-negative".into(),
        ));
    }
    if x == 0.0 {
        return Ok(0.0);
    }
    if x < a + 1.0 {
        Ok(gammainc_series(a, x))
    } else {
        Ok(1.0 - gammainc_cf(a, x))
    }
}

const GAMMA_MAX_ITER: usize = 200;
const GAMMA_EPS: f64 = 1e-12;

fn gammainc_series(a: f64, x: f64) -> f64 {
    let ln_prefix = a * x.ln() - x - ln_gamma(a);
    let mut sum = 1.0 / a;
    let mut term = sum;
    for n in 1..=GAMMA_MAX_ITER {
        term *= x / (a + n as f64);
        sum += term;
        if term.abs() < sum.abs() * GAMMA_EPS {
            break;
        }
    }
    sum * ln_prefix.exp()
}

// Modified Lentz's method for Q(a, x).
fn gammainc_cf(a: f64, x: f64) -> f64 {
    let tiny = 1e-30_f64;
    let ln_prefix = a * x.ln() - x - ln_gamma(a);

    let mut b = x + 1.0 - a;
    let mut c = 1.0 / tiny;
    let mut d = 1.0 / b;
    let mut h = d;

    for i in 1..=GAMMA_MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < tiny {
            d = tiny;
        }
        c = b + an / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < GAMMA_EPS {
            break;
        }
    }
    h * ln_prefix.exp()
}

// ── Distribution trait ─────────────────────────────────────────────────────

/// A continuous probability distribution.
pub trait Distribution {
    /// Probability density at `x`.
    fn pdf(&self, x: f64) -> f64;

    /// Cumulative distribution function at `x`.
    fn cdf(&self, x: f64) -> f64;

    /// Upper tail probability `1 - cdf(x)`.
    fn sf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }
}

// ── Normal distribution ────────────────────────────────────────────────────

/// Normal (Gaussian) distribution with parameters μ and σ.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create a new Normal distribution. `sigma` must be positive.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !(sigma > 0.0) {
            return Err(GrnetError::Invariant(
                "Normal: sigma must be positive".into(),
            ));
        }
        Ok(Self { mu, sigma })
    }

    /// Standard normal distribution N(0, 1).
    pub fn standard() -> Self {
        Self {
            mu: 0.0,
            sigma: 1.0,
        }
    }

    /// Two-sided tail probability `P(|Z| ≥ |z|)` for a standardized score.
    pub fn two_sided_p(&self, z: f64) -> f64 {
        let upper = self.sf(self.mu + z.abs() * self.sigma);
        (2.0 * upper).clamp(0.0, 1.0)
    }
}

impl Distribution for Normal {
    fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * PI).sqrt())
    }

    fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        0.5 * (1.0 + erf(z / core::f64::consts::SQRT_2))
    }
}

// ── Chi-squared distribution ──────────────────────────────────────────────

/// Chi-squared distribution with k degrees of freedom.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChiSquared {
    k: f64,
}

impl ChiSquared {
    /// Create a chi-squared distribution with `k` degrees of freedom.
    pub fn new(k: f64) -> Result<Self> {
        if !(k > 0.0) {
            return Err(GrnetError::Invariant(
                "ChiSquared: k must be positive".into(),
            ));
        }
        Ok(Self { k })
    }

    /// Degrees of freedom.
    pub fn df(&self) -> f64 {
        self.k
    }
}

impl Distribution for ChiSquared {
    fn pdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let half_k = self.k / 2.0;
        let ln_pdf =
            (half_k - 1.0) * x.ln() - x / 2.0 - half_k * 2.0_f64.ln() - ln_gamma(half_k);
        ln_pdf.exp()
    }

    fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        gammainc(self.k / 2.0, x / 2.0).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erf_known_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
    }

    #[test]
    fn ln_gamma_factorials() {
        // Γ(5) = 4! = 24
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!(ln_gamma(1.0).abs() < 1e-10);
    }

    #[test]
    fn normal_cdf_symmetry() {
        let n = Normal::standard();
        assert!((n.cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((n.cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((n.two_sided_p(1.96) - 0.05).abs() < 1e-3);
        assert!((n.two_sided_p(-1.96) - n.two_sided_p(1.96)).abs() < 1e-12);
    }

    #[test]
    fn normal_rejects_nonpositive_sigma() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn chi_squared_critical_values() {
        let c1 = ChiSquared::new(1.0).unwrap();
        assert!((c1.sf(3.841) - 0.05).abs() < 1e-3);
        let c4 = ChiSquared::new(4.0).unwrap();
        assert!((c4.sf(9.488) - 0.05).abs() < 1e-3);
        assert_eq!(c4.cdf(0.0), 0.0);
    }

    #[test]
    fn gammainc_domain() {
        assert!(gammainc(0.0, 1.0).is_err());
        assert!(gammainc(1.0, -1.0).is_err());
        // P(1, x) = 1 - e^-x
        let p = gammainc(1.0, 2.0).unwrap();
        assert!((p - (1.0 - (-2.0_f64).exp())).abs() < 1e-10);
    }
}
