//! Spatial indexing over grid geometry.
//!
//! [`SpatialIndex`] answers "which face contains this point" and "which faces
//! may touch this box" over a [`GridTopology`](crate::topology::GridTopology);
//! [`EdgeIndex`] does the same for edges. Both borrow their grid, are
//! read-only after construction and may be queried from many threads. The
//! face hierarchy is stored with the grid, so it is built once per topology
//! no matter how many indexes are made over it.

pub(crate) mod bvh;
pub mod index;

pub use index::{EdgeIndex, SpatialIndex};

/// What to do with a query point or target face that no source face covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutOfBoundsPolicy {
    /// Fail with an error naming the first uncovered point or target.
    #[default]
    Raise,
    /// Keep the entry and mark it missing (NaN on apply).
    FillMissing,
    /// Leave the entry out of the result.
    Drop,
}
