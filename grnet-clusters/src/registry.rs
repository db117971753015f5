//! The cell-class registry: per-class GRNs with display names and colors.

use core::fmt;

use grnet_core::{GrnetError, Result, Summarizable};
use grnet_models::{Estimator, Pretrained};
use grnet_omics::GrnMatrix;
use tracing::info;

use crate::color::{Color, ColorScheme};

/// Display name of a cell class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellClassName {
    Int(i64),
    Text(String),
}

impl fmt::Display for CellClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellClassName::Int(i) => write!(f, "{i}"),
            CellClassName::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellClassName {
    fn from(i: i64) -> Self {
        CellClassName::Int(i)
    }
}

impl From<&str> for CellClassName {
    fn from(s: &str) -> Self {
        CellClassName::Text(s.to_string())
    }
}

impl From<String> for CellClassName {
    fn from(s: String) -> Self {
        CellClassName::Text(s)
    }
}

/// Selects a cell class by position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellClassId {
    Index(usize),
    Name(CellClassName),
}

impl From<usize> for CellClassId {
    fn from(i: usize) -> Self {
        CellClassId::Index(i)
    }
}

impl From<&str> for CellClassId {
    fn from(s: &str) -> Self {
        CellClassId::Name(s.into())
    }
}

impl From<CellClassName> for CellClassId {
    fn from(name: CellClassName) -> Self {
        CellClassId::Name(name)
    }
}

/// One cell class: its GRN, name and color.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellClassEntry {
    pub grn: GrnMatrix,
    pub name: CellClassName,
    pub color: Color,
}

impl CellClassEntry {
    /// An entry with a validated color.
    pub fn new(grn: GrnMatrix, name: CellClassName, color: Color) -> Result<Self> {
        color.validate()?;
        Ok(Self { grn, name, color })
    }
}

/// Ordered cell classes built once from fitted estimators.
///
/// The estimators are kept alongside their GRNs so a class can be traced
/// back to the data it was fitted on.
#[derive(Debug, Clone)]
pub struct CellClassRegistry {
    models: Vec<Estimator>,
    entries: Vec<CellClassEntry>,
}

impl CellClassRegistry {
    /// Build from fitted estimators.
    ///
    /// Every model must yield a GRN matrix (i.e. has been estimated). Names
    /// default to `0..n`; when given, there must be one per model, as must
    /// explicit colors.
    pub fn new(
        models: Vec<Estimator>,
        names: Option<Vec<CellClassName>>,
        colors: ColorScheme,
    ) -> Result<Self> {
        let grns = models
            .iter()
            .map(Estimator::get_matrix)
            .collect::<Result<Vec<_>>>()?;

        let n = models.len();
        let names = match names {
            None => (0..n as i64).map(CellClassName::Int).collect(),
            Some(names) if names.len() == n => names,
            Some(names) => {
                return Err(GrnetError::Invariant(format!(
                    "length of names should be equal to the number of models ({n}), got {}",
                    names.len()
                )))
            }
        };
        let colors = colors.resolve(n)?;

        let entries = grns
            .into_iter()
            .zip(names)
            .zip(colors)
            .map(|((grn, name), color)| CellClassEntry { grn, name, color })
            .collect();
        info!(n_classes = n, "cell-class registry built");
        Ok(Self { models, entries })
    }

    /// Build from known GRN matrices, each wrapped in a [`Pretrained`] model.
    pub fn from_grns(
        grns: Vec<GrnMatrix>,
        names: Option<Vec<CellClassName>>,
        colors: ColorScheme,
    ) -> Result<Self> {
        let models = grns
            .into_iter()
            .map(|g| Pretrained::new(g).map(Estimator::from))
            .collect::<Result<Vec<_>>>()?;
        Self::new(models, names, colors)
    }

    /// The entry for `id`, by index or by name.
    ///
    /// When several classes share a name, the first of them is returned.
    pub fn fetch(&self, id: impl Into<CellClassId>) -> Result<CellClassEntry> {
        let index = self.index_of(id)?;
        Ok(self.entries[index].clone())
    }

    /// Resolve `id` to a position, failing with
    /// [`GrnetError::UnknownCellClass`] when no class matches.
    pub fn index_of(&self, id: impl Into<CellClassId>) -> Result<usize> {
        match id.into() {
            CellClassId::Index(i) if i < self.entries.len() => Ok(i),
            CellClassId::Index(i) => Err(GrnetError::UnknownCellClass(format!(
                "index {i} (n_classes={})",
                self.entries.len()
            ))),
            CellClassId::Name(name) => self
                .position(&name)
                .ok_or_else(|| GrnetError::UnknownCellClass(name.to_string())),
        }
    }

    /// Position of the first class called `name`.
    pub fn position(&self, name: &CellClassName) -> Option<usize> {
        self.entries.iter().position(|e| &e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellClassEntry> {
        self.entries.iter()
    }

    pub fn entry(&self, index: usize) -> Option<&CellClassEntry> {
        self.entries.get(index)
    }

    pub fn names(&self) -> impl Iterator<Item = &CellClassName> {
        self.entries.iter().map(|e| &e.name)
    }

    /// The estimator class `index` was built from.
    pub fn model(&self, index: usize) -> Option<&Estimator> {
        self.models.get(index)
    }
}

impl Summarizable for CellClassRegistry {
    fn summary(&self) -> String {
        let names: Vec<String> = self.names().map(|n| n.to_string()).collect();
        format!("CellClassRegistry: {} classes [{}]", self.len(), names.join(", "))
    }
}
