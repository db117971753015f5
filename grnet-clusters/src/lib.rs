//! Cell-class registries for grnet.
//!
//! A [`CellClassRegistry`] organizes the GRNs of several cell classes, each
//! with a display name and a color, and resolves classes by index or name.

pub mod color;
pub mod registry;

pub use color::{Color, ColorScheme, Colormap, TAB10};
pub use registry::{CellClassEntry, CellClassId, CellClassName, CellClassRegistry};
