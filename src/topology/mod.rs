//! Top-level module for 2D unstructured grid topology.
//!
//! This module provides the validated, immutable [`GridTopology`] and the
//! tables derived from it.
//! It includes:
//! - CSR connectivity and edge derivation
//! - Validation options and non-manifold handling
//! - Regular rasters expressed as quadrilateral grids
//! - The centroid triangulation used for barycentric interpolation
//!
//! Derived tables are computed on first access and cached for the grid's
//! lifetime; a grid is never mutated after construction.

pub(crate) mod cache;
pub mod connectivity;
mod dual;
pub mod grid;
pub mod structured;
pub mod validation;

pub use connectivity::{Connectivity, EdgeTopology, NO_FACE};
pub use grid::{GridFingerprint, GridTopology};
pub use structured::RasterGrid;
pub use validation::{NonManifoldHandling, ValidationOptions};
