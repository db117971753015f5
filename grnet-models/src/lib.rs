//! GRN estimators for grnet.
//!
//! - **Edges**: [`EdgeSet`] and [`project_edges`] onto a GRN matrix
//! - **Structure learning**: [`StructureLearner`] with the built-in
//!   [`PcSkeleton`], configured by [`PcConfig`]
//! - **Estimators**: [`Empty`], [`Pc`], [`BinaryPc`], [`Pretrained`], unified
//!   as [`Estimator`]
//!
//! Enable the `parallel` feature to run [`PcVariant::Parallel`] levels on
//! rayon.

pub mod config;
pub mod edges;
pub mod estimator;
pub mod learner;

pub use config::{CiTest, PcConfig, PcVariant};
pub use edges::{project_edges, EdgeSet};
pub use estimator::{BinaryPc, Empty, Estimator, EstimatorKind, Pc, Pretrained};
pub use learner::{PcSkeleton, StructureLearner};
