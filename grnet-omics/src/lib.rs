//! Sample tables and GRN matrices for grnet.
//!
//! - **Tables**: [`SampleTable`] (samples × genes) with seeded subsampling
//! - **GRN matrices**: [`LabeledMatrix`], [`validate`], [`GrnMatrix`],
//!   [`WeightedGrn`]
//! - **Preprocessing**: [`binarize`], [`rpm`], [`rp100k`], [`log_transform`]

pub mod grn;
pub mod preprocess;
pub mod table;

pub use grn::{validate, GrnMatrix, LabeledMatrix, WeightedGrn};
pub use preprocess::{binarize, binarize_with, log_transform, rp100k, rpm, Binarized, LogBase};
pub use table::SampleTable;
