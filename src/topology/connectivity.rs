//! Derived connectivity tables.
//!
//! Ragged tables use a compressed-sparse-row layout:
//!
//! * `offsets[i] .. offsets[i+1]` = range of row *i* in `indices`
//! * `indices`                    = concatenated rows
//!
//! Edges are canonical `(min, max)` node pairs numbered in order of first
//! appearance when faces are scanned in index order and each face's vertices in
//! stored order, so numbering is a pure function of the input.

use hashbrown::HashMap;
use itertools::Itertools;

/// Marker for the absent second face of a boundary edge in `edge_face`.
pub const NO_FACE: usize = usize::MAX;

/// CSR ragged table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connectivity {
    offsets: Vec<usize>,
    indices: Vec<usize>,
}

impl Connectivity {
    /// Build from explicit CSR arrays. `offsets` must start at 0, be
    /// non-decreasing, and end at `indices.len()`.
    pub fn from_csr(offsets: Vec<usize>, indices: Vec<usize>) -> Self {
        debug_assert_eq!(offsets.first().copied(), Some(0));
        debug_assert_eq!(offsets.last().copied(), Some(indices.len()));
        debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        Self { offsets, indices }
    }

    /// Build from a list of rows.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = usize>,
    {
        let mut offsets = vec![0];
        let mut indices = Vec::new();
        for row in rows {
            indices.extend(row);
            offsets.push(indices.len());
        }
        Self { offsets, indices }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row `i`. Panics if `i >= len()`.
    #[inline]
    pub fn row(&self, i: usize) -> &[usize] {
        &self.indices[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[usize]> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Longest row length.
    pub fn max_row_len(&self) -> usize {
        self.offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }

    /// Transpose: row `j` of the result lists, in ascending order, every row
    /// `i` of `self` that contains `j`. Duplicates within a row collapse.
    pub fn transpose(&self, n_cols: usize) -> Connectivity {
        let mut counts = vec![0usize; n_cols + 1];
        for row in self.rows() {
            for &j in row.iter().sorted_unstable().dedup() {
                counts[j + 1] += 1;
            }
        }
        for j in 0..n_cols {
            counts[j + 1] += counts[j];
        }
        let mut write = counts.clone();
        let mut indices = vec![0usize; counts[n_cols]];
        // Rows are visited in ascending order, so every output row is sorted.
        for (i, row) in self.rows().enumerate() {
            for &j in row.iter().sorted_unstable().dedup() {
                indices[write[j]] = i;
                write[j] += 1;
            }
        }
        Connectivity {
            offsets: counts,
            indices,
        }
    }
}

/// Edge tables derived from face→node connectivity.
#[derive(Clone, Debug)]
pub struct EdgeTopology {
    /// Canonical `(min, max)` node pair per edge.
    pub edge_node: Vec<[usize; 2]>,
    /// Edges of each face; edge `k` of face `f` joins vertex `k` and `k+1`.
    pub face_edge: Connectivity,
    /// Up to two faces per edge, lower face first; [`NO_FACE`] marks a boundary
    /// edge's missing neighbor.
    pub edge_face: Vec<[usize; 2]>,
    /// Edges shared by more than two faces with their full face count.
    pub non_manifold: Vec<(usize, usize)>,
}

impl EdgeTopology {
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edge_node.len()
    }

    /// True if the edge has a single adjacent face.
    #[inline]
    pub fn is_boundary(&self, edge: usize) -> bool {
        self.edge_face[edge][1] == NO_FACE
    }
}

/// Group every `(node_i, node_{i+1 mod arity})` pair per face, canonicalize the
/// pair order, and merge identical pairs across faces.
pub fn derive_edges(face_node: &Connectivity) -> EdgeTopology {
    let mut lookup: HashMap<(usize, usize), usize> = HashMap::with_capacity(face_node.indices().len());
    let mut edge_node: Vec<[usize; 2]> = Vec::new();
    let mut edge_face: Vec<[usize; 2]> = Vec::new();
    let mut face_count: Vec<usize> = Vec::new();
    let mut face_edge_idx = Vec::with_capacity(face_node.indices().len());

    for (face, nodes) in face_node.rows().enumerate() {
        let n = nodes.len();
        for k in 0..n {
            let (a, b) = (nodes[k], nodes[(k + 1) % n]);
            let key = if a < b { (a, b) } else { (b, a) };
            let edge = *lookup.entry(key).or_insert_with(|| {
                edge_node.push([key.0, key.1]);
                edge_face.push([NO_FACE, NO_FACE]);
                face_count.push(0);
                edge_node.len() - 1
            });
            face_edge_idx.push(edge);

            let slot = &mut edge_face[edge];
            if slot[0] == NO_FACE {
                slot[0] = face;
                face_count[edge] += 1;
            } else if slot[0] != face && slot[1] == NO_FACE {
                slot[1] = face;
                face_count[edge] += 1;
            } else if slot[0] != face && slot[1] != face {
                face_count[edge] += 1;
            }
        }
    }

    let non_manifold = face_count
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 2)
        .map(|(e, c)| (e, *c))
        .collect();

    EdgeTopology {
        edge_node,
        face_edge: Connectivity::from_csr(face_node.offsets().to_vec(), face_edge_idx),
        edge_face,
        non_manifold,
    }
}

/// Face→face adjacency from edge→face: two faces are neighbors iff they share
/// an edge. Rows are sorted and a pair sharing several edges appears once.
pub fn face_face_from_edges(edges: &EdgeTopology, n_faces: usize) -> Connectivity {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n_faces];
    for &[a, b] in &edges.edge_face {
        if a != NO_FACE && b != NO_FACE && a != b {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
    }
    Connectivity::from_rows(neighbors.into_iter().map(|mut row| {
        row.sort_unstable();
        row.dedup();
        row
    }))
}
