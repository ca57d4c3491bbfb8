//! Topology validation helpers.
//!
//! Malformed input is always rejected at construction and never silently
//! repaired. Each error names the offending node or face.

use crate::geometry::{EPS, Point2, signed_area};
use crate::mesh_error::MeshRegridError;
use crate::topology::connectivity::{Connectivity, EdgeTopology};

/// Validation toggles for [`GridTopology`](crate::topology::GridTopology)
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationOptions {
    /// Relative area tolerance. A face whose signed area is at most
    /// `area_tolerance * extent²` in magnitude is degenerate; one whose signed
    /// area is below `-area_tolerance * extent²` is clockwise. `extent` is the
    /// larger side of the face's bounding box.
    pub area_tolerance: f64,
    /// How to handle edges shared by more than two faces.
    pub non_manifold: NonManifoldHandling,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            area_tolerance: EPS,
            non_manifold: NonManifoldHandling::Error,
        }
    }
}

impl ValidationOptions {
    /// Default checks, but non-manifold edges are only logged.
    pub fn lenient() -> Self {
        Self {
            non_manifold: NonManifoldHandling::Warn,
            ..Self::default()
        }
    }
}

/// Behavior for non-manifold detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonManifoldHandling {
    /// Skip non-manifold detection; edge tables are derived lazily.
    Ignore,
    /// Log a warning on non-manifold edges.
    Warn,
    /// Return an error on non-manifold edges.
    Error,
}

/// Check coordinate arrays and pack them into points.
pub(crate) fn validate_nodes(node_x: &[f64], node_y: &[f64]) -> Result<Vec<Point2>, MeshRegridError> {
    if node_x.len() != node_y.len() {
        return Err(MeshRegridError::CoordinateLengthMismatch {
            x_len: node_x.len(),
            y_len: node_y.len(),
        });
    }
    node_x
        .iter()
        .zip(node_y)
        .enumerate()
        .map(|(node, (&x, &y))| {
            let p = Point2::new(x, y);
            if p.is_finite() {
                Ok(p)
            } else {
                Err(MeshRegridError::NonFiniteCoordinate { node })
            }
        })
        .collect()
}

/// Convert a fixed-width face→node table with a fill sentinel to CSR.
///
/// Fill values may only pad the end of a row.
pub(crate) fn csr_from_fill_table(
    table: &[i64],
    width: usize,
    fill_value: i64,
    n_nodes: usize,
) -> Result<Connectivity, MeshRegridError> {
    if width == 0 || table.len() % width != 0 {
        return Err(MeshRegridError::TableShapeMismatch {
            len: table.len(),
            width,
        });
    }
    let mut offsets = Vec::with_capacity(table.len() / width + 1);
    let mut indices = Vec::with_capacity(table.len());
    offsets.push(0);
    for (face, row) in table.chunks_exact(width).enumerate() {
        let valid = row.iter().take_while(|&&v| v != fill_value).count();
        if let Some(slot) = row[valid..].iter().position(|&v| v != fill_value) {
            return Err(MeshRegridError::InteriorFillValue {
                face,
                slot: valid + slot - 1,
            });
        }
        for (slot, &node) in row[..valid].iter().enumerate() {
            if node < 0 || node as u64 >= n_nodes as u64 {
                return Err(MeshRegridError::NodeIndexOutOfRange {
                    face,
                    slot,
                    node,
                    n_nodes,
                });
            }
            indices.push(node as usize);
        }
        offsets.push(indices.len());
    }
    Ok(Connectivity::from_csr(offsets, indices))
}

/// Convert per-face vertex lists to CSR, checking node ranges.
pub(crate) fn csr_from_faces<R>(faces: &[R], n_nodes: usize) -> Result<Connectivity, MeshRegridError>
where
    R: AsRef<[usize]>,
{
    for (face, row) in faces.iter().enumerate() {
        if let Some((slot, &node)) = row.as_ref().iter().enumerate().find(|(_, n)| **n >= n_nodes) {
            return Err(MeshRegridError::NodeIndexOutOfRange {
                face,
                slot,
                node: i64::try_from(node).unwrap_or(i64::MAX),
                n_nodes,
            });
        }
    }
    Ok(Connectivity::from_rows(
        faces.iter().map(|row| row.as_ref().iter().copied()),
    ))
}

/// Per-face checks: arity, repeated vertices, degeneracy and orientation.
pub(crate) fn validate_faces(
    nodes: &[Point2],
    face_node: &Connectivity,
    options: &ValidationOptions,
) -> Result<(), MeshRegridError> {
    if face_node.is_empty() {
        return Err(MeshRegridError::EmptyGrid);
    }
    let mut polygon = Vec::new();
    for (face, row) in face_node.rows().enumerate() {
        if row.len() < 3 {
            return Err(MeshRegridError::TooFewVertices {
                face,
                found: row.len(),
            });
        }
        let n = row.len();
        if let Some(k) = (0..n).find(|&k| row[k] == row[(k + 1) % n]) {
            return Err(MeshRegridError::RepeatedVertex {
                face,
                node: row[k],
            });
        }

        polygon.clear();
        polygon.extend(row.iter().map(|&i| nodes[i]));
        let area = signed_area(&polygon);
        let scale = crate::geometry::extent(&polygon);
        let tol = options.area_tolerance * scale * scale;
        if area.abs() <= tol {
            return Err(MeshRegridError::DegenerateFace {
                face,
                signed_area: area,
            });
        }
        if area < -tol {
            return Err(MeshRegridError::InconsistentOrientation {
                face,
                signed_area: area,
            });
        }
    }
    Ok(())
}

/// Apply the non-manifold policy to derived edges.
pub(crate) fn check_non_manifold(
    edges: &EdgeTopology,
    handling: NonManifoldHandling,
) -> Result<(), MeshRegridError> {
    if handling == NonManifoldHandling::Ignore {
        return Ok(());
    }
    for &(edge, faces) in &edges.non_manifold {
        let [node_a, node_b] = edges.edge_node[edge];
        match handling {
            NonManifoldHandling::Warn => {
                log::warn!("Non-manifold edge detected: edge={edge} nodes=({node_a}, {node_b}) faces={faces}");
            }
            NonManifoldHandling::Error => {
                return Err(MeshRegridError::NonManifoldEdge {
                    node_a,
                    node_b,
                    faces,
                });
            }
            NonManifoldHandling::Ignore => {}
        }
    }
    Ok(())
}
