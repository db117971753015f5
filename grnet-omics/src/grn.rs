//! GRN matrices and their validation.
//!
//! A GRN matrix is a labeled D×D matrix over gene identifiers where every
//! entry is 0 or 1 and every diagonal entry is 1. Entry (i, j) = 1 records a
//! regulatory relation between gene i and gene j; self relations are present
//! by convention. The matrix need not be symmetric.
//!
//! [`LabeledMatrix`] carries arbitrary labeled values; [`validate`] decides
//! whether it is a GRN matrix, and [`GrnMatrix`] can only be built through
//! that check.

use grnet_core::check::ensure_len;
use grnet_core::{GeneLabeled, GrnRule, GrnetError, Result, Summarizable};

/// A labeled, row-major numeric matrix with no structural guarantees.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledMatrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    values: Vec<f64>,
}

impl LabeledMatrix {
    /// Build from row vectors. One label per row and per column is required.
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        ensure_len("row_labels", rows.len(), row_labels.len())?;
        for (i, row) in rows.iter().enumerate() {
            ensure_len(&format!("rows[{i}]"), col_labels.len(), row.len())?;
        }
        Ok(Self {
            row_labels,
            col_labels,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Build with positional labels `"0", "1", ...` on both axes.
    pub fn unlabeled(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_cols = rows.first().map_or(0, |r| r.len());
        let row_labels = (0..rows.len()).map(|i| i.to_string()).collect();
        let col_labels = (0..n_cols).map(|i| i.to_string()).collect();
        Self::new(row_labels, col_labels, rows)
    }

    /// (n_rows, n_cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    /// Row labels in order.
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Column labels in order.
    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Value at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let (n_rows, n_cols) = self.shape();
        if row < n_rows && col < n_cols {
            Some(self.values[row * n_cols + col])
        } else {
            None
        }
    }
}

/// Check that `m` is a GRN matrix.
///
/// Rules are evaluated in a fixed order: square, matching labels, binary
/// entries, unit diagonal. The first violated rule is reported together with
/// the offending dimension or cell.
pub fn validate(m: &LabeledMatrix) -> Result<()> {
    let (n_rows, n_cols) = m.shape();
    if n_rows != n_cols {
        return Err(GrnetError::InvalidGrn {
            rule: GrnRule::Square,
            detail: format!("shape ({n_rows}, {n_cols})"),
        });
    }

    if let Some(i) = (0..n_rows).find(|&i| m.row_labels[i] != m.col_labels[i]) {
        return Err(GrnetError::InvalidGrn {
            rule: GrnRule::LabelsMatch,
            detail: format!(
                "row label {:?} vs column label {:?} at position {i}",
                m.row_labels[i], m.col_labels[i]
            ),
        });
    }

    if let Some(pos) = m.values.iter().position(|&v| v != 0.0 && v != 1.0) {
        return Err(GrnetError::InvalidGrn {
            rule: GrnRule::Binary,
            detail: format!("({}, {}) = {}", pos / n_cols, pos % n_cols, m.values[pos]),
        });
    }

    if let Some(i) = (0..n_rows).find(|&i| m.values[i * n_cols + i] != 1.0) {
        return Err(GrnetError::InvalidGrn {
            rule: GrnRule::UnitDiagonal,
            detail: format!("({i}, {i}) = {}", m.values[i * n_cols + i]),
        });
    }

    Ok(())
}

/// A validated GRN matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrnMatrix {
    genes: Vec<String>,
    /// Row-major D×D presence flags.
    cells: Vec<bool>,
}

impl GrnMatrix {
    /// Validate labeled row vectors as a GRN matrix over `genes`.
    pub fn from_rows(genes: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::try_from(LabeledMatrix::new(genes.clone(), genes, rows)?)
    }

    /// The identity GRN: only self relations.
    pub fn identity(genes: Vec<String>) -> Self {
        let d = genes.len();
        let cells = (0..d * d).map(|k| k / d == k % d).collect();
        Self { genes, cells }
    }

    /// The complete GRN: every pair related.
    pub fn ones(genes: Vec<String>) -> Self {
        let d = genes.len();
        Self {
            genes,
            cells: vec![true; d * d],
        }
    }

    /// Lower-triangular GRN (diagonal included), i.e. a strict causal chain
    /// in gene order.
    pub fn lower_triangular(genes: Vec<String>) -> Self {
        let d = genes.len();
        let cells = (0..d * d).map(|k| k % d <= k / d).collect();
        Self { genes, cells }
    }

    /// Entry at (i, j) as 0 or 1.
    pub fn get(&self, i: usize, j: usize) -> Option<u8> {
        let d = self.genes.len();
        if i < d && j < d {
            Some(self.cells[i * d + j] as u8)
        } else {
            None
        }
    }

    /// Whether the (from, to) cell is 1, looked up by gene name.
    pub fn is_edge(&self, from: &str, to: &str) -> Result<bool> {
        let i = self.require_index(from)?;
        let j = self.require_index(to)?;
        Ok(self.cells[i * self.genes.len() + j])
    }

    /// Number of 1 cells, diagonal included.
    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Number of 1 cells off the diagonal.
    pub fn off_diagonal_count(&self) -> usize {
        self.count_ones() - self.genes.len()
    }

    /// Off-diagonal 1 cells as (row gene, column gene), row-major order.
    pub fn edges(&self) -> Vec<(String, String)> {
        let d = self.genes.len();
        self.cells
            .iter()
            .enumerate()
            .filter(|&(k, &c)| c && k / d != k % d)
            .map(|(k, _)| (self.genes[k / d].clone(), self.genes[k % d].clone()))
            .collect()
    }

    /// Whether (i, j) and (j, i) always agree.
    pub fn is_symmetric(&self) -> bool {
        let d = self.genes.len();
        (0..d).all(|i| (i + 1..d).all(|j| self.cells[i * d + j] == self.cells[j * d + i]))
    }

    /// Rows and columns restricted and reordered to `order`.
    ///
    /// Fails with [`GrnetError::UnknownLabel`] for a gene this matrix lacks.
    pub fn reindex(&self, order: &[String]) -> Result<GrnMatrix> {
        let idx = order
            .iter()
            .map(|g| self.require_index(g))
            .collect::<Result<Vec<usize>>>()?;
        let d = self.genes.len();
        let cells = idx
            .iter()
            .flat_map(|&i| idx.iter().map(move |&j| i * d + j))
            .map(|k| self.cells[k])
            .collect();
        Ok(GrnMatrix {
            genes: order.to_vec(),
            cells,
        })
    }

    /// Row vectors of 0.0 / 1.0.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let d = self.genes.len();
        (0..d)
            .map(|i| {
                self.cells[i * d..(i + 1) * d]
                    .iter()
                    .map(|&c| if c { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect()
    }

    /// The matrix as an unvalidated labeled matrix.
    pub fn to_labeled(&self) -> LabeledMatrix {
        LabeledMatrix {
            row_labels: self.genes.clone(),
            col_labels: self.genes.clone(),
            values: self.cells.iter().map(|&c| if c { 1.0 } else { 0.0 }).collect(),
        }
    }

    fn require_index(&self, gene: &str) -> Result<usize> {
        self.gene_index(gene)
            .ok_or_else(|| GrnetError::UnknownLabel(gene.to_string()))
    }
}

impl TryFrom<LabeledMatrix> for GrnMatrix {
    type Error = GrnetError;

    fn try_from(m: LabeledMatrix) -> Result<Self> {
        validate(&m)?;
        Ok(GrnMatrix {
            genes: m.row_labels,
            cells: m.values.into_iter().map(|v| v == 1.0).collect(),
        })
    }
}

impl GeneLabeled for GrnMatrix {
    fn genes(&self) -> &[String] {
        &self.genes
    }
}

impl Summarizable for GrnMatrix {
    fn summary(&self) -> String {
        format!(
            "GrnMatrix: {} genes, {} off-diagonal edges",
            self.genes.len(),
            self.off_diagonal_count()
        )
    }
}

/// A GRN matrix whose diagonal carries a per-gene weight in [0, 1] instead of
/// the constant 1, typically the fraction of samples where the gene is
/// detected.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedGrn {
    grn: GrnMatrix,
    diagonal: Vec<f64>,
}

impl WeightedGrn {
    /// Pair a GRN matrix with one diagonal weight per gene.
    pub fn new(grn: GrnMatrix, diagonal: Vec<f64>) -> Result<Self> {
        ensure_len("diagonal", grn.n_genes(), diagonal.len())?;
        if let Some(i) = diagonal
            .iter()
            .position(|w| !(w.is_finite() && (0.0..=1.0).contains(w)))
        {
            return Err(GrnetError::Invariant(format!(
                "diagonal weights should lie in [0, 1], got {} for {:?}",
                diagonal[i],
                grn.genes()[i]
            )));
        }
        Ok(Self { grn, diagonal })
    }

    /// The underlying unit-diagonal GRN matrix.
    pub fn grn(&self) -> &GrnMatrix {
        &self.grn
    }

    /// Diagonal weights in gene order.
    pub fn diagonal(&self) -> &[f64] {
        &self.diagonal
    }

    /// Entry at (i, j), with the weight on the diagonal.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i == j {
            return self.diagonal.get(i).copied();
        }
        self.grn.get(i, j).map(f64::from)
    }

    /// Rows and columns restricted and reordered to `order`.
    pub fn reindex(&self, order: &[String]) -> Result<WeightedGrn> {
        let grn = self.grn.reindex(order)?;
        let diagonal = order
            .iter()
            .map(|g| self.grn.gene_index(g).map(|i| self.diagonal[i]))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| GrnetError::UnknownLabel(format!("{order:?}")))?;
        Ok(WeightedGrn { grn, diagonal })
    }
}

impl GeneLabeled for WeightedGrn {
    fn genes(&self) -> &[String] {
        self.grn.genes()
    }
}
