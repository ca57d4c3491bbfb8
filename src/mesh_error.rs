//! MeshRegridError: Unified error type for mesh-regrid public APIs
//!
//! Every variant carries the index of the offending node, face, edge, point or
//! target row so failures can be diagnosed without re-running.

use thiserror::Error;

/// Unified error type for mesh-regrid operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshRegridError {
    /// `node_x` and `node_y` have different lengths.
    #[error("Validation error: node_x has {x_len} entries but node_y has {y_len}")]
    CoordinateLengthMismatch { x_len: usize, y_len: usize },
    /// A node coordinate is NaN or infinite.
    #[error("Validation error: node {node} has a non-finite coordinate")]
    NonFiniteCoordinate { node: usize },
    /// The grid has no faces.
    #[error("Validation error: grid has no faces")]
    EmptyGrid,
    /// The fill table length is not a multiple of its row width.
    #[error("Validation error: face-node table of length {len} is not a multiple of row width {width}")]
    TableShapeMismatch { len: usize, width: usize },
    /// A face references a node that does not exist.
    #[error("Validation error: face {face} slot {slot} references node {node}, but the grid has {n_nodes} nodes")]
    NodeIndexOutOfRange {
        face: usize,
        slot: usize,
        node: i64,
        n_nodes: usize,
    },
    /// A fill sentinel appears between two valid vertices of a face row.
    #[error("Validation error: face {face} has a fill value at slot {slot} followed by valid vertices")]
    InteriorFillValue { face: usize, slot: usize },
    /// A face lists the same node twice in a row.
    #[error("Validation error: face {face} repeats node {node} consecutively")]
    RepeatedVertex { face: usize, node: usize },
    /// A face has fewer than three vertices.
    #[error("Validation error: face {face} has {found} vertices (at least 3 required)")]
    TooFewVertices { face: usize, found: usize },
    /// A face has (near) zero area.
    #[error("Validation error: face {face} is degenerate (signed area {signed_area})")]
    DegenerateFace { face: usize, signed_area: f64 },
    /// A face is ordered clockwise.
    #[error("Validation error: face {face} is clockwise (signed area {signed_area}); faces must be counter-clockwise")]
    InconsistentOrientation { face: usize, signed_area: f64 },
    /// An edge is shared by more than two faces.
    #[error("Topology error: edge ({node_a}, {node_b}) is shared by {faces} faces (non-manifold)")]
    NonManifoldEdge {
        node_a: usize,
        node_b: usize,
        faces: usize,
    },
    /// A face index passed to a subset/selection is out of range.
    #[error("Face index {face} out of range for grid with {n_faces} faces")]
    FaceIndexOutOfRange { face: usize, n_faces: usize },
    /// A raster axis is too short or not strictly monotonic.
    #[error("Raster error: {axis} coordinates must hold at least 2 strictly monotonic values (problem at index {index})")]
    InvalidRasterAxis { axis: &'static str, index: usize },
    /// A point query fell outside every face under the `Raise` policy.
    #[error("Point {point} at ({x}, {y}) lies outside the grid")]
    PointOutOfBounds { point: usize, x: f64, y: f64 },
    /// A target face found no source coverage under the `Raise` policy.
    #[error("Target face {target} has no source coverage")]
    TargetOutOfBounds { target: usize },
    /// A weight matrix or value array does not match the grid it is applied to.
    #[error("Incompatible grid: {what} expected {expected}, found {found}")]
    IncompatibleGrid {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A weight matrix was re-attached to grids with different fingerprints.
    #[error("Incompatible grid: {side} fingerprint does not match the weight matrix")]
    FingerprintMismatch { side: &'static str },
    /// A triplet references a face outside the recorded face counts.
    #[error("Invalid weight triplet {entry}: ({source_face}, {target_face}) outside {n_source}x{n_target}")]
    TripletOutOfRange {
        entry: usize,
        source_face: usize,
        target_face: usize,
        n_source: usize,
        n_target: usize,
    },
    /// A percentile outside `[0, 100]`.
    #[error("Percentile {0} is outside [0, 100]")]
    InvalidPercentile(f64),
    /// A derived table or weight matrix violates a structural invariant.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MeshRegridError {
    fn from(err: serde_json::Error) -> Self {
        MeshRegridError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for MeshRegridError {
    fn from(err: bincode::Error) -> Self {
        MeshRegridError::Serialization(err.to_string())
    }
}
