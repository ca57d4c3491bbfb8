#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-regrid
//!
//! mesh-regrid models two-dimensional unstructured meshes (nodes, edges and
//! faces of any arity) and computes conservative or interpolative mappings of
//! face values between two independently defined meshes, or between a mesh
//! and a regular raster.
//!
//! ## Features
//! - Validated, immutable [`GridTopology`](topology::GridTopology) with lazily
//!   derived, cached connectivity (edges, face adjacency, node incidence)
//! - Geometry kernel: signed area, centroids, point-in-polygon, convex and
//!   concave polygon clipping, barycentric coordinates
//! - Bounding-volume hierarchy for point location and box queries
//! - Four regridding methods sharing one weighted aggregation step
//! - Reusable [`WeightMatrix`](weights::WeightMatrix) with JSON and bincode
//!   round-trips that preserve every weight bit for bit
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mesh-regrid = "0.3"
//! # Optional features:
//! # features = ["rayon"]
//! ```
//!
//! ```
//! use mesh_regrid::prelude::*;
//!
//! let source = GridTopology::new(
//!     &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
//!     &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
//!     &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
//! )?;
//! let target = GridTopology::new(&[0.5, 1.5, 1.5, 0.5], &[0.0, 0.0, 1.0, 1.0], &[vec![0, 1, 2, 3]])?;
//! let regridder = Regridder::new(&source, &target, RegridMethod::Overlap)?;
//! assert_eq!(regridder.apply(&[10.0, 20.0])?, vec![15.0]);
//! # Ok::<(), MeshRegridError>(())
//! ```
//!
//! ## Determinism
//!
//! Weight construction is a pure function of the two grids and the method:
//! rebuilding gives bit-identical triplets regardless of thread count. A
//! point on an edge or vertex shared by several faces belongs to the face
//! with the lowest index.
//!
//! ## Parallelism
//!
//! With the `rayon` feature, per-target weight construction, bulk index
//! queries and apply run on the rayon pool. Results are collected in index
//! order and match the serial build exactly.

pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
mod parallel;
pub mod regrid;
pub mod spatial;
pub mod topology;
pub mod weights;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{BBox, Point2};
    pub use crate::mesh_error::MeshRegridError;
    pub use crate::regrid::{
        Aggregation, OutOfBoundsPolicy, RegridMethod, RegridOptions, RegridResult, Regridder,
        sample_points,
    };
    pub use crate::spatial::{EdgeIndex, SpatialIndex};
    pub use crate::topology::{
        GridFingerprint, GridTopology, NonManifoldHandling, RasterGrid, ValidationOptions,
    };
    pub use crate::weights::{Triplet, WeightConvention, WeightMatrix};
}
