//! Core trait definitions for the grnet workspace.

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}

/// A type labeled by an ordered list of gene identifiers.
pub trait GeneLabeled {
    /// Gene identifiers in storage order.
    fn genes(&self) -> &[String];

    /// Number of genes.
    fn n_genes(&self) -> usize {
        self.genes().len()
    }

    /// Position of `gene`, if present.
    fn gene_index(&self, gene: &str) -> Option<usize> {
        self.genes().iter().position(|g| g == gene)
    }
}
