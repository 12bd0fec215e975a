//! BSP/KD-tree spatial accelerator.
//!
//! The tree is built once over a set of bounded primitives by recursive
//! centroid splits with the split axis cycling X -> Y -> Z. Primitives that
//! straddle a split plane are referenced from both children. Queries walk
//! the tree front to back with an explicit stack and stop as soon as no
//! deferred node can hold a closer hit.

use crate::{AcceleratorError, HitRecord, Intersectable};
use lumen_math::{Aabb, Axis, Ray};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Below this magnitude a split parameter counts as "at the ray origin".
const SPLIT_EPSILON: f32 = 1e-6;

/// Relative growth of the root box. Rays grazing its faces, edges or corners
/// would otherwise miss the slab test by one ulp.
const ROOT_PADDING: f32 = 1e-5;

/// Build limits for [`BspAccelerator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspConfig {
    /// Depth at which a node always becomes a leaf
    pub max_depth: usize,
    /// Nodes with at most this many primitives become leaves
    pub max_primitives_per_leaf: usize,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            max_primitives_per_leaf: 5,
        }
    }
}

/// Tree node. Children and primitives are indices into the accelerator's
/// arenas.
#[derive(Debug, Clone)]
enum BspNode {
    Internal {
        axis: Axis,
        split: f32,
        #[allow(dead_code)]
        bbox: Aabb,
        below: usize,
        above: usize,
    },
    Leaf {
        #[allow(dead_code)]
        bbox: Aabb,
        primitives: Vec<usize>,
    },
}

/// Deferred far child of a traversal step.
#[derive(Debug, Clone, Copy)]
struct StackItem {
    node: usize,
    tmin: f32,
    tmax: f32,
}

/// Summary of a built tree, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BspStats {
    pub nodes: usize,
    pub leaves: usize,
    pub max_depth: usize,
    /// Primitive references over all leaves (duplicates counted)
    pub references: usize,
}

/// BSP accelerator over shared primitives.
pub struct BspAccelerator {
    primitives: Vec<Arc<dyn Intersectable>>,
    nodes: Vec<BspNode>,
    root: usize,
    bbox: Aabb,
    stats: BspStats,
}

impl BspAccelerator {
    /// Build the tree over `primitives`.
    ///
    /// Fails if the set is empty or if any primitive is unbounded.
    pub fn build(
        primitives: Vec<Arc<dyn Intersectable>>,
        config: &BspConfig,
    ) -> Result<Self, AcceleratorError> {
        if primitives.is_empty() {
            return Err(AcceleratorError::EmptyPrimitiveSet);
        }

        let boxes = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                p.bounding_box()
                    .ok_or(AcceleratorError::UnboundedPrimitive { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bbox = boxes.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b));
        let bbox = bbox.expanded(ROOT_PADDING * (bbox.max() - bbox.min()).max_element().max(1.0));

        let mut builder = Builder {
            boxes: &boxes,
            config,
            nodes: Vec::new(),
            stats: BspStats::default(),
        };
        let root = builder.build_node((0..primitives.len()).collect(), bbox, Axis::X, 0);
        let nodes = builder.nodes;
        let mut stats = builder.stats;
        stats.nodes = nodes.len();

        log::info!(
            "Built BSP over {} primitives: {} nodes, {} leaves, depth {}, {:.2} refs/leaf",
            primitives.len(),
            stats.nodes,
            stats.leaves,
            stats.max_depth,
            stats.references as f32 / stats.leaves.max(1) as f32
        );

        Ok(Self {
            primitives,
            nodes,
            root,
            bbox,
            stats,
        })
    }

    pub fn stats(&self) -> BspStats {
        self.stats
    }

    /// Number of primitives the tree was built over.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    fn intersect_leaf<'a>(&'a self, primitives: &[usize], ray: &Ray, best: &mut Option<HitRecord<'a>>) {
        for &index in primitives {
            if let Some(hit) = self.primitives[index].intersect(ray) {
                if hit.t > 0.0 && best.as_ref().map_or(true, |b| hit.t < b.t) {
                    *best = Some(hit);
                }
            }
        }
    }
}

struct Builder<'b> {
    boxes: &'b [Aabb],
    config: &'b BspConfig,
    nodes: Vec<BspNode>,
    stats: BspStats,
}

impl Builder<'_> {
    fn push(&mut self, node: BspNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn build_node(&mut self, primitives: Vec<usize>, bbox: Aabb, axis: Axis, depth: usize) -> usize {
        if depth >= self.config.max_depth || primitives.len() <= self.config.max_primitives_per_leaf {
            // Re-filter against the leaf box itself.
            let primitives: Vec<usize> = primitives
                .into_iter()
                .filter(|&i| self.boxes[i].intersects(&bbox))
                .collect();

            self.stats.leaves += 1;
            self.stats.references += primitives.len();
            self.stats.max_depth = self.stats.max_depth.max(depth);
            return self.push(BspNode::Leaf { bbox, primitives });
        }

        let split = self.centroid(&primitives, axis);
        let (below_box, above_box) = bbox.split(axis, split);

        let mut below_prims = Vec::new();
        let mut above_prims = Vec::new();
        for &i in &primitives {
            if self.boxes[i].intersects(&below_box) {
                below_prims.push(i);
            }
            if self.boxes[i].intersects(&above_box) {
                above_prims.push(i);
            }
        }

        let next = axis.next();
        let below = self.build_node(below_prims, below_box, next, depth + 1);
        let above = self.build_node(above_prims, above_box, next, depth + 1);

        self.push(BspNode::Internal {
            axis,
            split: axis.of(below_box.max()),
            bbox,
            below,
            above,
        })
    }

    /// Mean of the primitives' box centers along `axis`.
    fn centroid(&self, primitives: &[usize], axis: Axis) -> f32 {
        let sum: f32 = primitives.iter().map(|&i| axis.of(self.boxes[i].center())).sum();
        sum / primitives.len().max(1) as f32
    }
}

impl Intersectable for BspAccelerator {
    fn intersect<'a>(&'a self, ray: &Ray) -> Option<HitRecord<'a>> {
        let (mut tmin, mut tmax) = self.bbox.slab(ray)?;

        let mut stack: Vec<StackItem> = Vec::with_capacity(32);
        let mut best: Option<HitRecord<'a>> = None;
        let mut node = self.root;

        loop {
            match &self.nodes[node] {
                BspNode::Internal {
                    axis,
                    split,
                    below,
                    above,
                    ..
                } => {
                    let origin = axis.of(ray.origin);
                    let dir = axis.of(ray.direction);
                    let tsplit = (split - origin) / dir;

                    // The child holding the ray origin is visited first. An
                    // origin on the plane belongs to the side it moves into.
                    let below_first = origin < *split || (origin == *split && dir <= 0.0);
                    let (first, second) = if below_first {
                        (*below, *above)
                    } else {
                        (*above, *below)
                    };

                    if tsplit.abs() < SPLIT_EPSILON {
                        node = if dir > 0.0 { *above } else { *below };
                    } else if tsplit.is_nan() || tsplit > tmax || tsplit < 0.0 {
                        node = first;
                    } else if tsplit < tmin {
                        node = second;
                    } else {
                        stack.push(StackItem {
                            node: second,
                            tmin: tsplit,
                            tmax,
                        });
                        tmax = tsplit;
                        node = first;
                    }
                }
                BspNode::Leaf { primitives, .. } => {
                    self.intersect_leaf(primitives, ray, &mut best);

                    let Some(item) = stack.pop() else {
                        break;
                    };
                    if best.as_ref().is_some_and(|b| b.t < item.tmin) {
                        break;
                    }
                    node = item.node;
                    tmin = item.tmin;
                    tmax = item.tmax;
                }
            }
        }

        best
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
