//! Room Splitter: binary space partition over an arena of nodes.
//!
//! The tree is stored as a flat `Vec<BspNode>` indexed by [`NodeId`];
//! parent, children and sibling relations are indices into that arena.
//! Node 0 is always the root.

use crate::geometry::Rect;
use crate::random::{chance, range_f32};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type NodeId = usize;

/// Parameters for the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitParams {
    /// Number of passes over the leaf set.
    pub iterations: u32,
    /// Probability of splitting with a vertical dividing line
    /// (halves side by side on the X axis).
    pub vertical_split_probability: f32,
    pub min_width: i32,
    pub min_height: i32,
    /// The dividing line falls within `[ratio, 1 - ratio]` of the split axis.
    pub min_division_ratio: f32,
    /// Per-axis shrink ratio range applied to every leaf after splitting.
    pub scale_min: Vec2,
    pub scale_max: Vec2,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            iterations: 3,
            vertical_split_probability: 0.5,
            min_width: 400,
            min_height: 400,
            min_division_ratio: 0.35,
            scale_min: Vec2::new(0.6, 0.6),
            scale_max: Vec2::new(0.8, 0.8),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BspNode {
    pub rect: Rect,
    pub parent: Option<NodeId>,
    /// Either both children or none.
    pub children: Option<[NodeId; 2]>,
    /// The sibling produced by the same split.
    pub adjacent: Option<NodeId>,
    /// Index of the corridor bridging this node's two children.
    pub corridor: Option<usize>,
    /// Corridors ending in this leaf, in routing order.
    pub corridors: Vec<usize>,
}

impl BspNode {
    fn new(rect: Rect, parent: Option<NodeId>) -> Self {
        Self {
            rect,
            parent,
            children: None,
            adjacent: None,
            corridor: None,
            corridors: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTree {
    nodes: Vec<BspNode>,
}

impl RoomTree {
    pub fn new(area: Rect) -> Self {
        Self {
            nodes: vec![BspNode::new(area, None)],
        }
    }

    pub const ROOT: NodeId = 0;

    pub fn node(&self, id: NodeId) -> &BspNode {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn rect(&self, id: NodeId) -> Rect {
        self.nodes[id].rect
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forget every registered corridor.
    pub fn clear_corridors(&mut self) {
        for node in &mut self.nodes {
            node.corridor = None;
            node.corridors.clear();
        }
    }

    /// Record corridor `index` on the node whose split it bridges and on
    /// both leaves it joins.
    pub fn register_corridor(&mut self, index: usize, node: NodeId, rooms: [NodeId; 2]) {
        self.nodes[node].corridor = Some(index);
        for room in rooms {
            self.nodes[room].corridors.push(index);
        }
    }

    /// All leaves, depth-first with the first child visited first.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.leaves_under(Self::ROOT)
    }

    /// Leaves of the subtree rooted at `id` (just `id` if it is a leaf).
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.nodes[current].children {
                Some([first, second]) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => leaves.push(current),
            }
        }
        leaves
    }

    /// Nodes that have been split, in creation order.
    pub fn internal_nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|&id| !self.nodes[id].is_leaf())
            .collect()
    }

    /// Try to split a leaf. Returns false (leaving it a leaf) when either
    /// half would fall below the minimum size.
    fn try_split(&mut self, id: NodeId, params: &SplitParams, rng: &mut impl Rng) -> bool {
        if !self.nodes[id].is_leaf() {
            return false;
        }
        let vertical = chance(rng, params.vertical_split_probability);
        let ratio_min = params.min_division_ratio.clamp(0.0, 0.5);
        let ratio = range_f32(rng, ratio_min, 1.0 - ratio_min);

        let rect = self.nodes[id].rect;
        let halves = if vertical {
            let w = (rect.width as f32 * ratio).round() as i32;
            [
                Rect::new(rect.x, rect.y, w, rect.height),
                Rect::new(rect.x + w, rect.y, rect.width - w, rect.height),
            ]
        } else {
            let h = (rect.height as f32 * ratio).round() as i32;
            [
                Rect::new(rect.x, rect.y, rect.width, h),
                Rect::new(rect.x, rect.y + h, rect.width, rect.height - h),
            ]
        };

        if halves
            .iter()
            .any(|h| h.width < params.min_width || h.height < params.min_height)
        {
            return false;
        }

        self.push_children(id, halves);
        true
    }

    /// Attach two child rects to `id` without any size checks.
    pub(crate) fn push_children(&mut self, id: NodeId, halves: [Rect; 2]) -> [NodeId; 2] {
        let first = self.nodes.len();
        let second = first + 1;
        self.nodes.push(BspNode::new(halves[0], Some(id)));
        self.nodes.push(BspNode::new(halves[1], Some(id)));
        self.nodes[first].adjacent = Some(second);
        self.nodes[second].adjacent = Some(first);
        self.nodes[id].children = Some([first, second]);
        [first, second]
    }

    /// Shrink every leaf around its centre by randomly sampled ratios.
    pub fn scale_leaves(&mut self, params: &SplitParams, rng: &mut impl Rng) {
        for leaf in self.leaves() {
            let ratio_w = range_f32(rng, params.scale_min.x, params.scale_max.x);
            let ratio_h = range_f32(rng, params.scale_min.y, params.scale_max.y);
            let node = &mut self.nodes[leaf];
            node.rect = node.rect.scaled(ratio_w, ratio_h);
        }
    }
}

/// Recursively partition `area`, re-collecting the leaf set after each pass.
pub fn split_rooms(area: Rect, params: &SplitParams, rng: &mut impl Rng) -> RoomTree {
    let mut tree = RoomTree::new(area);
    for pass in 0..params.iterations {
        let mut splits = 0;
        for leaf in tree.leaves() {
            if tree.try_split(leaf, params, rng) {
                splits += 1;
            }
        }
        log::debug!("BSP pass {}: {} splits", pass, splits);
    }
    tree
}
