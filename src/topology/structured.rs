//! Regular rasters as unstructured grids.
//!
//! A raster is described by its cell-edge coordinates along x and y. Either
//! axis may run ascending or descending (north-up images usually have
//! descending y). Cells become quadrilateral faces numbered row-major, so
//! face `row * nx + col` holds the value at `[row, col]` of a `[ny, nx]`
//! array laid out in the axes' given order.

use crate::geometry::Point2;
use crate::mesh_error::MeshRegridError;
use crate::topology::connectivity::Connectivity;
use crate::topology::grid::GridTopology;
use crate::topology::validation::ValidationOptions;

#[derive(Clone, Debug, PartialEq)]
pub struct RasterGrid {
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
}

impl RasterGrid {
    /// Raster from cell-edge coordinates (`nx + 1` and `ny + 1` values).
    pub fn from_edges(x_edges: Vec<f64>, y_edges: Vec<f64>) -> Result<Self, MeshRegridError> {
        check_axis(&x_edges, "x")?;
        check_axis(&y_edges, "y")?;
        Ok(Self { x_edges, y_edges })
    }

    /// Raster from cell-center coordinates. Outer edges are extrapolated by
    /// half the neighbouring spacing, inner edges are midpoints.
    pub fn from_centers(x: &[f64], y: &[f64]) -> Result<Self, MeshRegridError> {
        check_axis(x, "x")?;
        check_axis(y, "y")?;
        Ok(Self {
            x_edges: edges_from_centers(x),
            y_edges: edges_from_centers(y),
        })
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.x_edges.len() - 1
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.y_edges.len() - 1
    }

    /// `(ny, nx)`, the shape of a value array on this raster.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny(), self.nx())
    }

    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    /// Face index of the cell at `(row, col)`.
    #[inline]
    pub fn cell_index(&self, row: usize, col: usize) -> usize {
        row * self.nx() + col
    }

    /// Cell centers in face order.
    pub fn cell_centers(&self) -> Vec<Point2> {
        let mid = |e: &[f64], i: usize| 0.5 * (e[i] + e[i + 1]);
        (0..self.ny())
            .flat_map(|r| {
                (0..self.nx()).map(move |c| Point2::new(mid(&self.x_edges, c), mid(&self.y_edges, r)))
            })
            .collect()
    }

    /// Build the equivalent [`GridTopology`].
    pub fn to_topology(&self) -> Result<GridTopology, MeshRegridError> {
        let (nx, ny) = (self.nx(), self.ny());
        let stride = nx + 1;
        let nodes: Vec<Point2> = self
            .y_edges
            .iter()
            .flat_map(|&y| self.x_edges.iter().map(move |&x| Point2::new(x, y)))
            .collect();

        // Axis directions that disagree mirror the cell, so its corners are
        // listed the other way round to stay counter-clockwise.
        let x_up = self.x_edges[1] > self.x_edges[0];
        let y_up = self.y_edges[1] > self.y_edges[0];
        let flip = x_up != y_up;
        let face_node = Connectivity::from_rows((0..ny).flat_map(|r| {
            (0..nx).map(move |c| {
                let n = |i: usize, j: usize| i * stride + j;
                if flip {
                    [n(r, c), n(r + 1, c), n(r + 1, c + 1), n(r, c + 1)]
                } else {
                    [n(r, c), n(r, c + 1), n(r + 1, c + 1), n(r + 1, c)]
                }
            })
        }));
        GridTopology::from_parts(nodes, face_node, ValidationOptions::default())
    }
}

impl GridTopology {
    /// Grid of quadrilateral faces covering a regular raster.
    pub fn from_structured(raster: &RasterGrid) -> Result<GridTopology, MeshRegridError> {
        raster.to_topology()
    }
}

fn check_axis(values: &[f64], axis: &'static str) -> Result<(), MeshRegridError> {
    if values.len() < 2 {
        return Err(MeshRegridError::InvalidRasterAxis {
            axis,
            index: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(MeshRegridError::InvalidRasterAxis { axis, index });
    }
    let ascending = values[1] > values[0];
    match values
        .windows(2)
        .position(|w| if ascending { w[1] <= w[0] } else { w[1] >= w[0] })
    {
        Some(i) => Err(MeshRegridError::InvalidRasterAxis { axis, index: i + 1 }),
        None => Ok(()),
    }
}

fn edges_from_centers(centers: &[f64]) -> Vec<f64> {
    let n = centers.len();
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
    edges.extend(centers.windows(2).map(|w| 0.5 * (w[0] + w[1])));
    edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
    edges
}
