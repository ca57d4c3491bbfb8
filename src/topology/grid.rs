//! Immutable, validated 2D unstructured grid.
//!
//! A [`GridTopology`] owns node coordinates and face→node connectivity. Every
//! other table (edges, adjacency, areas, centroids, ...) is derived on first
//! access and cached for the lifetime of the grid. Nothing is ever mutated in
//! place: operations that change the mesh, such as [`GridTopology::subset`],
//! return a new grid.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point2, centroid, polygon_area};
use crate::mesh_error::MeshRegridError;
use crate::spatial::bvh::Bvh;
use crate::topology::cache::DerivedCache;
use crate::topology::connectivity::{
    Connectivity, EdgeTopology, NO_FACE, derive_edges, face_face_from_edges,
};
use crate::topology::dual::build_centroid_triangulation;
use crate::topology::validation::{
    NonManifoldHandling, ValidationOptions, check_non_manifold, csr_from_faces,
    csr_from_fill_table, validate_faces, validate_nodes,
};

/// Structural identity of a grid, recorded in weight matrices.
///
/// Two fingerprints are equal when node and face counts match and the bounds
/// are bit-for-bit identical.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GridFingerprint {
    pub n_nodes: usize,
    pub n_faces: usize,
    pub bounds: BBox,
}

impl PartialEq for GridFingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.n_nodes == other.n_nodes
            && self.n_faces == other.n_faces
            && self.bounds.bits_eq(&other.bounds)
    }
}

impl Eq for GridFingerprint {}

/// A validated 2D mesh of counter-clockwise polygonal faces.
#[derive(Clone, Debug)]
pub struct GridTopology {
    nodes: Vec<Point2>,
    face_node: Connectivity,
    bounds: BBox,
    crs: Option<String>,
    cache: DerivedCache,
}

impl GridTopology {
    /// Build from coordinate arrays and per-face vertex lists with default
    /// validation.
    ///
    /// ```
    /// use mesh_regrid::topology::GridTopology;
    /// let grid = GridTopology::new(
    ///     &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
    ///     &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
    ///     &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
    /// )?;
    /// assert_eq!(grid.n_faces(), 2);
    /// # Ok::<(), mesh_regrid::mesh_error::MeshRegridError>(())
    /// ```
    pub fn new<R>(node_x: &[f64], node_y: &[f64], faces: &[R]) -> Result<Self, MeshRegridError>
    where
        R: AsRef<[usize]>,
    {
        Self::new_with_options(node_x, node_y, faces, ValidationOptions::default())
    }

    pub fn new_with_options<R>(
        node_x: &[f64],
        node_y: &[f64],
        faces: &[R],
        options: ValidationOptions,
    ) -> Result<Self, MeshRegridError>
    where
        R: AsRef<[usize]>,
    {
        let nodes = validate_nodes(node_x, node_y)?;
        let face_node = csr_from_faces(faces, nodes.len())?;
        Self::from_parts(nodes, face_node, options)
    }

    /// Build from a row-major face→node table of width `n_max` in which
    /// `fill_value` pads faces with fewer than `n_max` vertices.
    pub fn from_fill_table(
        node_x: &[f64],
        node_y: &[f64],
        table: &[i64],
        n_max: usize,
        fill_value: i64,
    ) -> Result<Self, MeshRegridError> {
        Self::from_fill_table_with_options(
            node_x,
            node_y,
            table,
            n_max,
            fill_value,
            ValidationOptions::default(),
        )
    }

    pub fn from_fill_table_with_options(
        node_x: &[f64],
        node_y: &[f64],
        table: &[i64],
        n_max: usize,
        fill_value: i64,
        options: ValidationOptions,
    ) -> Result<Self, MeshRegridError> {
        let nodes = validate_nodes(node_x, node_y)?;
        let face_node = csr_from_fill_table(table, n_max, fill_value, nodes.len())?;
        Self::from_parts(nodes, face_node, options)
    }

    /// Build from points and CSR connectivity whose node indices are already
    /// known to be in range.
    pub(crate) fn from_parts(
        nodes: Vec<Point2>,
        face_node: Connectivity,
        options: ValidationOptions,
    ) -> Result<Self, MeshRegridError> {
        validate_faces(&nodes, &face_node, &options)?;
        let bounds = BBox::from_points(&nodes).ok_or(MeshRegridError::EmptyGrid)?;
        let grid = Self {
            nodes,
            face_node,
            bounds,
            crs: None,
            cache: DerivedCache::default(),
        };
        if options.non_manifold != NonManifoldHandling::Ignore {
            check_non_manifold(grid.derive_edges(), options.non_manifold)?;
        }
        crate::debug_invariants!(grid.validate_invariants(), "GridTopology construction");
        log::debug!(
            "GridTopology: {} nodes, {} faces, max arity {}",
            grid.n_nodes(),
            grid.n_faces(),
            grid.face_node.max_row_len()
        );
        Ok(grid)
    }

    /// Attach a coordinate-reference tag. Only used to warn when two grids with
    /// different tags are regridded; no transform is ever applied.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.face_node.len()
    }

    pub fn n_edges(&self) -> usize {
        self.derive_edges().n_edges()
    }

    #[inline]
    pub fn nodes(&self) -> &[Point2] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, i: usize) -> Point2 {
        self.nodes[i]
    }

    /// Face→node connectivity in CSR form.
    #[inline]
    pub fn face_node(&self) -> &Connectivity {
        &self.face_node
    }

    /// Vertex indices of face `f`.
    #[inline]
    pub fn face_nodes(&self, f: usize) -> &[usize] {
        self.face_node.row(f)
    }

    /// Vertex coordinates of face `f`, counter-clockwise.
    pub fn face_polygon(&self, f: usize) -> Vec<Point2> {
        self.face_nodes(f).iter().map(|&n| self.nodes[n]).collect()
    }

    /// Fixed-width face→node table padded with `fill_value`, and its width.
    pub fn face_node_table(&self, fill_value: i64) -> (Vec<i64>, usize) {
        let width = self.face_node.max_row_len();
        let mut table = vec![fill_value; width * self.n_faces()];
        for (row, nodes) in table.chunks_exact_mut(width).zip(self.face_node.rows()) {
            for (slot, &n) in row.iter_mut().zip(nodes) {
                *slot = n as i64;
            }
        }
        (table, width)
    }

    #[inline]
    pub fn bounds(&self) -> BBox {
        self.bounds
    }

    pub fn fingerprint(&self) -> GridFingerprint {
        GridFingerprint {
            n_nodes: self.n_nodes(),
            n_faces: self.n_faces(),
            bounds: self.bounds,
        }
    }

    /// Edge tables: canonical edge→node pairs, face→edge and edge→face.
    pub fn derive_edges(&self) -> &EdgeTopology {
        self.cache.edges.get_or_init(|| derive_edges(&self.face_node))
    }

    pub fn edge_node(&self) -> &[[usize; 2]] {
        &self.derive_edges().edge_node
    }

    pub fn face_edge(&self) -> &Connectivity {
        &self.derive_edges().face_edge
    }

    /// Up to two faces per edge; the second is [`NO_FACE`] on the boundary.
    pub fn edge_face(&self) -> &[[usize; 2]] {
        &self.derive_edges().edge_face
    }

    /// Edges with exactly one adjacent face, ascending.
    pub fn boundary_edges(&self) -> Vec<usize> {
        let edges = self.derive_edges();
        (0..edges.n_edges())
            .filter(|&e| edges.is_boundary(e))
            .collect()
    }

    /// Nodes on at least one boundary edge, ascending.
    pub fn boundary_nodes(&self) -> Vec<usize> {
        let edges = self.derive_edges();
        let mut on_boundary = vec![false; self.n_nodes()];
        for e in self.boundary_edges() {
            let [a, b] = edges.edge_node[e];
            on_boundary[a] = true;
            on_boundary[b] = true;
        }
        on_boundary
            .iter()
            .enumerate()
            .filter_map(|(n, &b)| b.then_some(n))
            .collect()
    }

    /// Face→face adjacency: sorted neighbors, one entry per adjacent pair.
    pub fn face_face_adjacency(&self) -> &Connectivity {
        self.cache
            .face_face
            .get_or_init(|| face_face_from_edges(self.derive_edges(), self.n_faces()))
    }

    /// Node→face incidence, each row sorted ascending.
    pub fn node_face(&self) -> &Connectivity {
        self.cache
            .node_face
            .get_or_init(|| self.face_node.transpose(self.n_nodes()))
    }

    pub fn face_areas(&self) -> &[f64] {
        self.cache.face_areas.get_or_init(|| {
            (0..self.n_faces())
                .map(|f| polygon_area(&self.face_polygon(f)))
                .collect()
        })
    }

    /// Area-weighted face centroids.
    pub fn face_centroids(&self) -> &[Point2] {
        self.cache.face_centroids.get_or_init(|| {
            (0..self.n_faces())
                .map(|f| {
                    let polygon = self.face_polygon(f);
                    // Validated faces are never degenerate; the vertex mean is
                    // only reachable through rounding.
                    centroid(&polygon).unwrap_or_else(|| vertex_mean(&polygon))
                })
                .collect()
        })
    }

    pub fn face_bounds(&self) -> &[BBox] {
        self.cache.face_bounds.get_or_init(|| {
            self.face_node
                .rows()
                .map(|row| {
                    row.iter()
                        .fold(BBox::from_point(self.nodes[row[0]]), |mut b, &n| {
                            b.expand(self.nodes[n]);
                            b
                        })
                })
                .collect()
        })
    }

    /// Hierarchy over the face bounding boxes, shared by every
    /// [`SpatialIndex`](crate::spatial::SpatialIndex) on this grid.
    pub(crate) fn face_bvh(&self) -> Option<&Bvh> {
        self.cache
            .face_bvh
            .get_or_init(|| Bvh::build(self.face_bounds()))
            .as_ref()
    }

    pub fn edge_lengths(&self) -> &[f64] {
        self.cache.edge_lengths.get_or_init(|| {
            self.edge_node()
                .iter()
                .map(|&[a, b]| self.nodes[a].distance_squared(self.nodes[b]).sqrt())
                .collect()
        })
    }

    /// Triangulation whose vertices are this grid's face centroids.
    ///
    /// Node `i` of the returned grid is the centroid of face `i`, so each
    /// triangle's vertex indices are face indices of `self`. Around every
    /// interior node the centroids of the incident faces are ordered by angle
    /// and the resulting ring is ear-clipped. `None` when the grid has no
    /// interior node.
    pub fn centroid_triangulation(&self) -> Option<&GridTopology> {
        self.cache
            .centroid_triangulation
            .get_or_init(|| build_centroid_triangulation(self).map(Box::new))
            .as_deref()
    }

    /// New grid made of the selected faces, with unused nodes dropped.
    ///
    /// Selected indices are sorted and deduplicated; the returned map gives the
    /// original index of every face of the new grid. The CRS tag is kept.
    pub fn subset(&self, faces: &[usize]) -> Result<(GridTopology, Vec<usize>), MeshRegridError> {
        let n_faces = self.n_faces();
        if let Some(&face) = faces.iter().find(|&&f| f >= n_faces) {
            return Err(MeshRegridError::FaceIndexOutOfRange { face, n_faces });
        }
        let mut face_map = faces.to_vec();
        face_map.sort_unstable();
        face_map.dedup();
        if face_map.is_empty() {
            return Err(MeshRegridError::EmptyGrid);
        }

        let mut used = vec![false; self.n_nodes()];
        for &f in &face_map {
            for &n in self.face_nodes(f) {
                used[n] = true;
            }
        }
        let mut node_map = vec![usize::MAX; self.n_nodes()];
        let mut nodes = Vec::new();
        for (old, _) in used.iter().enumerate().filter(|(_, u)| **u) {
            node_map[old] = nodes.len();
            nodes.push(self.nodes[old]);
        }
        let face_node = Connectivity::from_rows(
            face_map
                .iter()
                .map(|&f| self.face_nodes(f).iter().map(|&n| node_map[n]).collect::<Vec<_>>()),
        );
        let mut grid = Self::from_parts(nodes, face_node, ValidationOptions {
            non_manifold: NonManifoldHandling::Ignore,
            ..ValidationOptions::default()
        })?;
        grid.crs = self.crs.clone();
        Ok((grid, face_map))
    }

    /// Number of derived tables computed so far.
    pub fn cached_tables(&self) -> usize {
        self.cache.filled()
    }

    /// Check the structural invariants of the derived tables.
    pub fn validate_invariants(&self) -> Result<(), MeshRegridError> {
        let Some(edges) = self.cache.edges.get() else {
            return Ok(());
        };
        for (e, faces) in edges.edge_face.iter().enumerate() {
            if faces[0] == NO_FACE || faces[0] >= self.n_faces() {
                return Err(MeshRegridError::InvariantViolation(format!(
                    "edge {e} has no adjacent face"
                )));
            }
            if faces[1] != NO_FACE && faces[1] <= faces[0] {
                return Err(MeshRegridError::InvariantViolation(format!(
                    "edge {e} faces {faces:?} are not ascending"
                )));
            }
        }
        if edges.face_edge.len() != self.n_faces() {
            return Err(MeshRegridError::InvariantViolation(format!(
                "face_edge has {} rows for {} faces",
                edges.face_edge.len(),
                self.n_faces()
            )));
        }
        Ok(())
    }
}

fn vertex_mean(polygon: &[Point2]) -> Point2 {
    let n = polygon.len().max(1) as f64;
    let (sx, sy) = polygon
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2::new(sx / n, sy / n)
}
