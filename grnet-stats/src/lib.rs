//! Statistics used by grnet's structure learners.
//!
//! - **Distributions**: [`Normal`], [`ChiSquared`] and the special functions
//!   behind their tails
//! - **Correlation**: Pearson and partial correlation ([`CorrelationMatrix`])
//! - **Independence tests**: Fisher z, χ² and G tests conditioned on
//!   arbitrary variable subsets

pub mod correlation;
pub mod distribution;
pub mod independence;

pub use correlation::{pearson, CorrelationMatrix};
pub use distribution::{ChiSquared, Distribution, Normal};
pub use independence::{fisher_z, CiOutcome, DiscreteData};
