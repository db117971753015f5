//! Quasi-pseudo-distances between gene regulatory networks.
//!
//! - [`d_asterisk`]: fraction of the subjective GRN's relations missing
//!   from the objective GRN
//! - [`whqpm`]: weighted-Hamming variant weighting self relations by gene
//!   detection rates ([`whqpm_diagonal`] reads them from weighted GRNs)
//! - [`QuasiDistanceMatrix`] / [`distances_from`]: the same across the
//!   classes of a cell-class registry
//!
//! Enable the `parallel` feature to fill distance matrices on rayon.

pub mod distance;
pub mod metrics;

pub use distance::{distances_from, QuasiDistanceMatrix};
pub use metrics::{d_asterisk, whqpm, whqpm_diagonal, QuasiMetric};
