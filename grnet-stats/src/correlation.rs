//! Pearson and partial correlation.
//!
//! [`CorrelationMatrix`] holds the pairwise Pearson correlations of a set of
//! variables; [`CorrelationMatrix::partial`] conditions a pair on any subset
//! of the remaining variables by inverting the matching sub-matrix.

use grnet_core::{GrnetError, Result, Summarizable};

/// Pearson product-moment correlation coefficient between `x` and `y`.
///
/// Returns 0.0 if either series is constant (zero variance).
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(GrnetError::contract(
            "correlation input",
            format!("{} observations", x.len()),
            format!("{} observations", y.len()),
        ));
    }
    if x.len() < 2 {
        return Err(GrnetError::Invariant(
            "correlation: need at least 2 observations".into(),
        ));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / denom)
}

/// Pairwise Pearson correlation matrix for a set of variables.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrelationMatrix {
    /// Row-major n×n storage.
    data: Vec<f64>,
    size: usize,
    n_obs: usize,
}

impl CorrelationMatrix {
    /// Build from variables, one slice of observations per variable.
    ///
    /// All variables must have the same number (≥ 2) of observations.
    pub fn from_variables(variables: &[&[f64]]) -> Result<Self> {
        if variables.is_empty() {
            return Err(GrnetError::Invariant(
                "CorrelationMatrix: need at least one variable".into(),
            ));
        }
        let n_obs = variables[0].len();
        for (i, v) in variables.iter().enumerate() {
            if v.len() != n_obs {
                return Err(GrnetError::contract(
                    format!("variables[{i}]"),
                    format!("{n_obs} observations"),
                    format!("{} observations", v.len()),
                ));
            }
        }

        let size = variables.len();
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            data[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let r = pearson(variables[i], variables[j])?;
                data[i * size + j] = r;
                data[j * size + i] = r;
            }
        }
        Ok(Self { data, size, n_obs })
    }

    /// Correlation between variables `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    /// Number of variables.
    pub fn n(&self) -> usize {
        self.size
    }

    /// Number of observations each correlation was computed from.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Partial correlation of `x` and `y` given the variables in `given`.
    ///
    /// With an empty conditioning set this is the plain correlation. Returns
    /// [`GrnetError::Degenerate`] when the conditioning sub-matrix is singular
    /// (e.g. duplicated variables).
    pub fn partial(&self, x: usize, y: usize, given: &[usize]) -> Result<f64> {
        if given.is_empty() {
            return Ok(self.get(x, y));
        }
        let idx: Vec<usize> = [x, y].iter().chain(given).copied().collect();
        let k = idx.len();
        let mut sub = vec![0.0; k * k];
        for (a, &ia) in idx.iter().enumerate() {
            for (b, &ib) in idx.iter().enumerate() {
                sub[a * k + b] = self.get(ia, ib);
            }
        }
        let precision = invert(&sub, k).ok_or_else(|| {
            GrnetError::Degenerate(format!(
                "singular correlation sub-matrix for ({x}, {y} | {given:?})"
            ))
        })?;
        let denom = (precision[0] * precision[k + 1]).sqrt();
        if !(denom > 0.0) {
            return Err(GrnetError::Degenerate(format!(
                "non-positive precision diagonal for ({x}, {y} | {given:?})"
            )));
        }
        Ok((-precision[1] / denom).clamp(-1.0, 1.0))
    }
}

impl Summarizable for CorrelationMatrix {
    fn summary(&self) -> String {
        format!(
            "CorrelationMatrix: {}x{} over {} observations",
            self.size, self.size, self.n_obs
        )
    }
}

/// Gauss-Jordan inverse with partial pivoting. `None` when singular.
fn invert(m: &[f64], n: usize) -> Option<Vec<f64>> {
    let w = 2 * n;
    let mut aug = vec![0.0; n * w];
    for i in 0..n {
        aug[i * w..i * w + n].copy_from_slice(&m[i * n..(i + 1) * n]);
        aug[i * w + n + i] = 1.0;
    }

    for col in 0..n {
        let (pivot_row, pivot_abs) = (col..n)
            .map(|r| (r, aug[r * w + col].abs()))
            .fold((col, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if pivot_abs < 1e-12 {
            return None;
        }
        if pivot_row != col {
            for j in 0..w {
                aug.swap(col * w + j, pivot_row * w + j);
            }
        }

        let pivot = aug[col * w + col];
        for j in 0..w {
            aug[col * w + j] /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row * w + col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..w {
                aug[row * w + j] -= factor * aug[col * w + j];
            }
        }
    }

    let mut inv = vec![0.0; n * n];
    for i in 0..n {
        inv[i * n..(i + 1) * n].copy_from_slice(&aug[i * w + n..(i + 1) * w]);
    }
    Some(inv)
}
