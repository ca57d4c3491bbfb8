//! Bounding-volume hierarchy over axis-aligned boxes.
//!
//! Built top-down: each node splits its primitives at the median centroid
//! along the axis of widest centroid spread, until at most `leaf_size`
//! primitives remain. Nodes are stored in a flat array with the root at 0.
//! The primitive boxes are kept alongside the nodes so leaf hits can be
//! tested per primitive.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::{BBox, Point2};

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bbox: BBox,
    left: u32,
    right: u32,
    start: u32,
    count: u32,
}

impl BvhNode {
    const fn leaf(bbox: BBox, start: u32, count: u32) -> Self {
        Self {
            bbox,
            left: u32::MAX,
            right: u32::MAX,
            start,
            count,
        }
    }

    const fn inner(bbox: BBox, left: u32, right: u32) -> Self {
        Self {
            bbox,
            left,
            right,
            start: 0,
            count: 0,
        }
    }

    const fn is_leaf(self) -> bool {
        self.count != 0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Bvh {
    nodes: Vec<BvhNode>,
    prim_indices: Vec<u32>,
    prim_boxes: Vec<BBox>,
}

impl Bvh {
    pub(crate) const DEFAULT_LEAF_SIZE: usize = 8;

    pub(crate) fn build(bboxes: &[BBox]) -> Option<Self> {
        Self::build_with_leaf_size(bboxes, Self::DEFAULT_LEAF_SIZE)
    }

    pub(crate) fn build_with_leaf_size(bboxes: &[BBox], leaf_size: usize) -> Option<Self> {
        if bboxes.is_empty() {
            return None;
        }
        let leaf_size = leaf_size.clamp(1, 256);
        let mut bvh = Self {
            nodes: Vec::with_capacity(bboxes.len().saturating_mul(2) / leaf_size + 1),
            prim_indices: (0..bboxes.len() as u32).collect(),
            prim_boxes: bboxes.to_vec(),
        };
        bvh.build_node(bboxes, 0, bboxes.len(), leaf_size);
        Some(bvh)
    }

    fn build_node(&mut self, bboxes: &[BBox], start: usize, end: usize, leaf_size: usize) -> u32 {
        let node_index = self.nodes.len() as u32;
        let bbox = self.range_bbox(bboxes, start, end);
        self.nodes.push(BvhNode::leaf(bbox, 0, 0));

        let count = end - start;
        if count <= leaf_size {
            self.nodes[node_index as usize] = BvhNode::leaf(bbox, start as u32, count as u32);
            return node_index;
        }

        let use_x = self.split_on_x(bboxes, start, end);
        let mid = start + count / 2;
        self.prim_indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
            let ca = bboxes[*a as usize].center();
            let cb = bboxes[*b as usize].center();
            let ord = if use_x { ca.x.total_cmp(&cb.x) } else { ca.y.total_cmp(&cb.y) };
            ord.then(a.cmp(b))
        });

        let left = self.build_node(bboxes, start, mid, leaf_size);
        let right = self.build_node(bboxes, mid, end, leaf_size);
        self.nodes[node_index as usize] = BvhNode::inner(bbox, left, right);
        node_index
    }

    fn range_bbox(&self, bboxes: &[BBox], start: usize, end: usize) -> BBox {
        self.prim_indices[start + 1..end]
            .iter()
            .fold(bboxes[self.prim_indices[start] as usize], |acc, &i| {
                acc.union(bboxes[i as usize])
            })
    }

    fn split_on_x(&self, bboxes: &[BBox], start: usize, end: usize) -> bool {
        let spread = self.prim_indices[start..end]
            .iter()
            .map(|&i| BBox::from_point(bboxes[i as usize].center()))
            .reduce(BBox::union);
        spread.is_none_or(|s| s.width() >= s.height())
    }

    /// Visit every primitive whose own box intersects `query`. The visitor
    /// returns `false` to stop early.
    pub(crate) fn query_bbox<F>(&self, query: &BBox, mut visit: F)
    where
        F: FnMut(usize) -> bool,
    {
        let mut stack = vec![0u32];
        while let Some(node_idx) = stack.pop() {
            let node = self.nodes[node_idx as usize];
            if !node.bbox.intersects(query) {
                continue;
            }
            if node.is_leaf() {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &prim in &self.prim_indices[start..end] {
                    let prim = prim as usize;
                    if !self.prim_boxes[prim].intersects(query) {
                        continue;
                    }
                    if !visit(prim) {
                        return;
                    }
                }
                continue;
            }
            stack.push(node.left);
            stack.push(node.right);
        }
    }

    /// Visit every primitive whose box contains `point`.
    pub(crate) fn query_point<F>(&self, point: Point2, visit: F)
    where
        F: FnMut(usize) -> bool,
    {
        self.query_bbox(&BBox::from_point(point), visit);
    }

    /// Best-first nearest primitive. `distance_to_prim` returns the squared
    /// distance from the query to a primitive; ties go to the lower index.
    pub(crate) fn nearest<F>(&self, point: Point2, mut distance_to_prim: F) -> Option<(usize, f64)>
    where
        F: FnMut(usize) -> Option<f64>,
    {
        let mut best_dist2 = f64::INFINITY;
        let mut best_prim: Option<usize> = None;

        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry {
            dist2: self.nodes[0].bbox.distance_squared(point),
            node: 0,
        });

        while let Some(entry) = heap.pop() {
            if entry.dist2 > best_dist2 {
                break;
            }
            let node = self.nodes[entry.node as usize];
            if node.is_leaf() {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &prim in &self.prim_indices[start..end] {
                    let prim = prim as usize;
                    let Some(d2) = distance_to_prim(prim).filter(|d| d.is_finite()) else {
                        continue;
                    };
                    let better = d2 < best_dist2
                        || (d2 == best_dist2 && best_prim.is_some_and(|b| prim < b));
                    if better {
                        best_dist2 = d2;
                        best_prim = Some(prim);
                    }
                }
                continue;
            }
            for child in [node.left, node.right] {
                let d2 = self.nodes[child as usize].bbox.distance_squared(point);
                if d2 <= best_dist2 {
                    heap.push(HeapEntry { dist2: d2, node: child });
                }
            }
        }

        best_prim.map(|idx| (idx, best_dist2))
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        fn walk(nodes: &[BvhNode], i: u32) -> usize {
            let node = nodes[i as usize];
            if node.is_leaf() {
                1
            } else {
                1 + walk(nodes, node.left).max(walk(nodes, node.right))
            }
        }
        walk(&self.nodes, 0)
    }
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist2: f64,
    node: u32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest distance first.
        other
            .dist2
            .total_cmp(&self.dist2)
            .then_with(|| other.node.cmp(&self.node))
    }
}
