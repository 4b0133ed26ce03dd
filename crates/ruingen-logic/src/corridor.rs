//! Corridor Router: connects the two halves of every split.
//!
//! For each internal node the router looks for a pair of leaves, one in
//! each child subtree, whose facing edges overlap by at least the corridor
//! width, and lays a corridor between their centres. Candidate pairs are
//! scanned circularly from random offsets so the result is not biased
//! toward tree order.

use crate::bsp::{NodeId, RoomTree};
use crate::geometry::Rect;
use crate::random::{index, range_i32};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorridorParams {
    pub width_min: i32,
    pub width_max: i32,
}

impl Default for CorridorParams {
    fn default() -> Self {
        Self {
            width_min: 80,
            width_max: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub rect: Rect,
    /// Travel axis: true when the connected rooms sit side by side on X.
    pub is_horizontal: bool,
    /// The two leaves joined, lower/left one first.
    pub rooms: [NodeId; 2],
    /// The internal node whose split this corridor bridges.
    pub node: NodeId,
}

impl Corridor {
    /// Extent across the travel axis.
    pub fn thickness(&self) -> i32 {
        if self.is_horizontal {
            self.rect.height
        } else {
            self.rect.width
        }
    }
}

/// Connecting rectangle between two leaves, or `None` if their facing
/// edges do not overlap by `width`. `first` must lie left of (or below)
/// `second`.
fn connect(
    first: Rect,
    second: Rect,
    is_horizontal: bool,
    width: i32,
    rng: &mut impl Rng,
) -> Option<Rect> {
    let a = first.center_i();
    let b = second.center_i();
    let rect = if is_horizontal {
        let lo = first.y.max(second.y);
        let hi = first.top().min(second.top());
        if hi - lo < width || b.x <= a.x {
            return None;
        }
        let y = range_i32(rng, lo, hi - width);
        Rect::from_edges(a.x, y, b.x, y + width)
    } else {
        let lo = first.x.max(second.x);
        let hi = first.right().min(second.right());
        if hi - lo < width || b.y <= a.y {
            return None;
        }
        let x = range_i32(rng, lo, hi - width);
        Rect::from_edges(x, a.y, x + width, b.y)
    };
    (!rect.is_degenerate()).then_some(rect)
}

/// Search the two leaf sets for a connectable pair whose corridor does not
/// cut through any third leaf of either subtree.
fn find_connection(
    tree: &RoomTree,
    first_leaves: &[NodeId],
    second_leaves: &[NodeId],
    is_horizontal: bool,
    width: i32,
    rng: &mut impl Rng,
) -> Option<(Rect, [NodeId; 2])> {
    if first_leaves.is_empty() || second_leaves.is_empty() {
        return None;
    }
    let first_offset = index(rng, first_leaves.len());
    let second_offset = index(rng, second_leaves.len());

    for i in 0..first_leaves.len() {
        let a = first_leaves[(i + first_offset) % first_leaves.len()];
        for j in 0..second_leaves.len() {
            let b = second_leaves[(j + second_offset) % second_leaves.len()];
            let Some(rect) = connect(tree.rect(a), tree.rect(b), is_horizontal, width, rng) else {
                continue;
            };
            let blocked = first_leaves
                .iter()
                .chain(second_leaves)
                .any(|&other| other != a && other != b && tree.rect(other).intersects(&rect));
            if !blocked {
                return Some((rect, [a, b]));
            }
        }
    }
    None
}

/// A corridor the router gave up on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DroppedCorridor {
    /// No leaf pair across the split could hold a corridor of this width.
    NoFit { node: NodeId, width: i32 },
    /// Lost to an accepted corridor of the same orientation that was at
    /// least as thick.
    Conflict { node: NodeId, kept: NodeId },
    /// Accepted, then removed for a thicker corridor.
    Superseded { node: NodeId, by: NodeId },
}

impl DroppedCorridor {
    /// The internal node left without a corridor.
    pub fn node(&self) -> NodeId {
        match *self {
            DroppedCorridor::NoFit { node, .. }
            | DroppedCorridor::Conflict { node, .. }
            | DroppedCorridor::Superseded { node, .. } => node,
        }
    }
}

impl fmt::Display for DroppedCorridor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroppedCorridor::NoFit { node, width } => {
                write!(f, "no corridor of width {} fits across node {}", width, node)
            }
            DroppedCorridor::Conflict { node, kept } => write!(
                f,
                "corridor for node {} dropped in favour of node {}",
                node, kept
            ),
            DroppedCorridor::Superseded { node, by } => write!(
                f,
                "corridor for node {} superseded by thicker node {}",
                node, by
            ),
        }
    }
}

/// Result of offering a candidate to the accepted set.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Accepted { superseded: Vec<Corridor> },
    Rejected { by: NodeId },
}

/// Offer `candidate` to `accepted`.
///
/// Intersecting corridors of the same orientation keep the thicker one,
/// or the earlier one on a tie. Crossing corridors of the other
/// orientation never conflict.
pub fn admit_corridor(accepted: &mut Vec<Corridor>, candidate: Corridor) -> Admission {
    let mut superseded = Vec::new();
    for (k, other) in accepted.iter().enumerate() {
        if other.is_horizontal != candidate.is_horizontal || !other.rect.intersects(&candidate.rect) {
            continue;
        }
        if candidate.thickness() > other.thickness() {
            superseded.push(k);
        } else {
            return Admission::Rejected { by: other.node };
        }
    }
    let mut removed: Vec<Corridor> = superseded
        .into_iter()
        .rev()
        .map(|k| accepted.remove(k))
        .collect();
    removed.reverse();
    accepted.push(candidate);
    Admission::Accepted { superseded: removed }
}

#[derive(Debug, Clone, Default)]
pub struct Routing {
    pub corridors: Vec<Corridor>,
    pub dropped: Vec<DroppedCorridor>,
}

/// Route one corridor per internal node.
///
/// Orientation comes from the unshrunk sibling rects. Conflicts are
/// settled by [`admit_corridor`]. Each surviving corridor is registered on
/// the node whose split it bridges and on both leaves it joins.
pub fn route_corridors(tree: &mut RoomTree, params: &CorridorParams, rng: &mut impl Rng) -> Routing {
    let mut routing = Routing::default();

    for node in tree.internal_nodes() {
        let Some([a, b]) = tree.node(node).children else {
            continue;
        };
        let (ra, rb) = (tree.rect(a), tree.rect(b));
        let is_horizontal = ra.right() <= rb.x || rb.right() <= ra.x;
        let (first, second) = if is_horizontal {
            if ra.x <= rb.x { (a, b) } else { (b, a) }
        } else if ra.y <= rb.y {
            (a, b)
        } else {
            (b, a)
        };

        let width = range_i32(rng, params.width_min, params.width_max);
        let first_leaves = tree.leaves_under(first);
        let second_leaves = tree.leaves_under(second);
        let Some((rect, rooms)) =
            find_connection(tree, &first_leaves, &second_leaves, is_horizontal, width, rng)
        else {
            log::warn!(
                "No corridor fits between subtrees {} and {} (width {})",
                first,
                second,
                width
            );
            routing.dropped.push(DroppedCorridor::NoFit { node, width });
            continue;
        };

        let candidate = Corridor {
            rect,
            is_horizontal,
            rooms,
            node,
        };
        match admit_corridor(&mut routing.corridors, candidate) {
            Admission::Rejected { by } => {
                log::debug!("Dropping corridor for node {}: conflicts with node {}", node, by);
                routing.dropped.push(DroppedCorridor::Conflict { node, kept: by });
            }
            Admission::Accepted { superseded } => {
                for dropped in superseded {
                    log::debug!("Corridor for node {} superseded by node {}", dropped.node, node);
                    routing.dropped.push(DroppedCorridor::Superseded {
                        node: dropped.node,
                        by: node,
                    });
                }
            }
        }
    }

    tree.clear_corridors();
    for (i, corridor) in routing.corridors.iter().enumerate() {
        tree.register_corridor(i, corridor.node, corridor.rooms);
    }
    routing
}
