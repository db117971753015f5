//! Unordered gene-pair edge sets and their projection onto GRN matrices.

use std::collections::BTreeSet;

use grnet_core::{GrnetError, Result};
use grnet_omics::GrnMatrix;

/// A set of undirected gene-pair edges without self loops.
///
/// `(a, b)` and `(b, a)` denote the same edge. Pairs are stored with the
/// lexicographically smaller gene first, so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSet {
    pairs: BTreeSet<(String, String)>,
}

impl EdgeSet {
    /// An empty edge set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect pairs, rejecting self loops.
    pub fn from_pairs<I, A, B>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut set = Self::new();
        for (a, b) in pairs {
            set.insert(a, b)?;
        }
        Ok(set)
    }

    /// Insert an edge; `Ok(false)` if it was already present.
    pub fn insert(&mut self, a: impl Into<String>, b: impl Into<String>) -> Result<bool> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(GrnetError::Invariant(format!(
                "self loop on {a:?} is not an edge"
            )));
        }
        Ok(self.pairs.insert(canonical(a, b)))
    }

    /// Whether `a` and `b` are connected, in either order.
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&canonical(a.to_string(), b.to_string()))
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set has no edges.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Edges in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }
}

fn canonical(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Project `edges` onto a D×D GRN matrix over `genes`.
///
/// The diagonal is 1, cells (i, j) and (j, i) are 1 for every edge between
/// genes i and j, and every other cell is 0. An edge naming a gene outside
/// `genes` fails with [`GrnetError::UnknownLabel`].
pub fn project_edges(genes: &[String], edges: &EdgeSet) -> Result<GrnMatrix> {
    let d = genes.len();
    let position = |g: &str| {
        genes
            .iter()
            .position(|x| x == g)
            .ok_or_else(|| GrnetError::UnknownLabel(g.to_string()))
    };

    let mut rows: Vec<Vec<f64>> = (0..d)
        .map(|i| (0..d).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    for (a, b) in edges.iter() {
        let (i, j) = (position(a)?, position(b)?);
        rows[i][j] = 1.0;
        rows[j][i] = 1.0;
    }
    GrnMatrix::from_rows(genes.to_vec(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grnet_core::GeneLabeled;

    fn genes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn membership_is_unordered() {
        let set = EdgeSet::from_pairs([("b", "a"), ("c", "a")]).unwrap();
        assert!(set.contains("a", "b"));
        assert!(set.contains("b", "a"));
        assert!(!set.contains("b", "c"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn duplicate_orientations_collapse() {
        let mut set = EdgeSet::new();
        assert!(set.insert("x", "y").unwrap());
        assert!(!set.insert("y", "x").unwrap());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![("x", "y")]);
    }

    #[test]
    fn self_loops_rejected() {
        assert!(EdgeSet::from_pairs([("a", "a")]).is_err());
    }

    #[test]
    fn project_empty_is_identity() {
        let g = genes(&["a", "b", "c"]);
        let m = project_edges(&g, &EdgeSet::new()).unwrap();
        assert_eq!(m, GrnMatrix::identity(g));
    }

    #[test]
    fn project_is_symmetric() {
        let g = genes(&["a", "b", "c"]);
        let edges = EdgeSet::from_pairs([("c", "a")]).unwrap();
        let m = project_edges(&g, &edges).unwrap();
        assert_eq!(
            m.to_rows(),
            vec![
                vec![1.0, 0.0, 1.0],
                vec![0.0, 1.0, 0.0],
                vec![1.0, 0.0, 1.0],
            ]
        );
        assert!(m.is_symmetric());
        assert_eq!(m.genes(), g.as_slice());
    }

    #[test]
    fn project_unknown_gene_fails() {
        let edges = EdgeSet::from_pairs([("a", "z")]).unwrap();
        let err = project_edges(&genes(&["a", "b"]), &edges).unwrap_err();
        assert!(matches!(err, GrnetError::UnknownLabel(g) if g == "z"));
    }
}
