//! Shared primitives for the grnet gene-regulatory-network workspace.
//!
//! `grnet-core` provides the foundation that the other grnet crates build on:
//!
//! - **Error types**: [`GrnetError`], [`ErrorKind`], [`GrnRule`] and [`Result`]
//! - **Checks**: [`check`] helpers that turn failed preconditions into errors
//! - **Traits**: [`Summarizable`], [`GeneLabeled`]

pub mod check;
pub mod error;
pub mod traits;

pub use error::{ErrorKind, GrnRule, GrnetError, Result};
pub use traits::*;
