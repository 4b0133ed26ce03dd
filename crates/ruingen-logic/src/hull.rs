//! Hull Partitioner & Gap Builder.
//!
//! Shape rectangles overlap wherever a corridor enters a room. This module
//! rewrites them into a disjoint set of hulls, splits hulls that contain a
//! door, and synthesizes gaps between every pair of touching hulls.
//!
//! Orientation convention for doors and gaps: `is_horizontal` describes the
//! direction of passage. A horizontal gap joins hulls that sit side by side
//! on X and is itself a thin vertical strip.

use crate::geometry::Rect;
use crate::shape::ShapeId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Hulls touching within this many units are considered adjacent.
pub const ADJACENCY_TOLERANCE: i32 = 1;
/// A door within this distance of a would-be gap replaces it.
pub const DOOR_GAP_TOLERANCE: f32 = 16.0;
/// Upper bound on full reduction passes in [`partition_hulls`].
const MAX_REDUCTION_PASSES: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hull {
    pub rect: Rect,
    /// The shape this hull was carved from.
    pub shape: ShapeId,
    /// Fraction of the hull initially filled with water.
    pub water_fill: f32,
}

impl Hull {
    pub fn new(rect: Rect, shape: ShapeId) -> Self {
        Self {
            rect,
            shape,
            water_fill: 0.0,
        }
    }
}

/// A door or hatch as seen by the partitioner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorMarker {
    pub rect: Rect,
    pub is_horizontal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub rect: Rect,
    pub is_horizontal: bool,
    /// Hulls on either side: left/bottom first.
    pub hulls: [Option<usize>; 2],
    /// The door this gap belongs to, if any.
    pub door: Option<usize>,
}

/// Number of `r`'s edges lying entirely within `other`'s interior band.
fn edges_inside(r: &Rect, other: &Rect) -> usize {
    let spans_y = other.y <= r.y && r.top() <= other.top();
    let spans_x = other.x <= r.x && r.right() <= other.right();
    let in_x = |x: i32| other.x < x && x < other.right();
    let in_y = |y: i32| other.y < y && y < other.top();
    [
        spans_y && in_x(r.x),
        spans_y && in_x(r.right()),
        spans_x && in_y(r.y),
        spans_x && in_y(r.top()),
    ]
    .iter()
    .filter(|&&inside| inside)
    .count()
}

/// Which of two overlapping rects gets rewritten. Returns true for `a`.
///
/// A container is cut around the rect it contains. A rect poking a single
/// edge into the other is truncated. Spanning and corner overlaps cut the
/// smaller rect, or `b` on a tie.
fn cut_first(a: &Rect, b: &Rect) -> bool {
    if b.contains_rect(a) {
        return false;
    }
    if a.contains_rect(b) {
        return true;
    }
    let a_in = edges_inside(a, b);
    let b_in = edges_inside(b, a);
    if a_in > 0 && b_in == 0 {
        return true;
    }
    if b_in > 0 && a_in == 0 {
        return false;
    }
    a.area() < b.area()
}

/// One forward `for i, for j > i` pass over a list that grows as
/// remainders are appended. Returns the number of reductions made.
///
/// Every rewrite replaces a rect with pieces of itself, so rects only
/// shrink; pairs resolved earlier stay resolved.
pub fn reduce_overlaps_single_pass(hulls: &mut Vec<Hull>) -> usize {
    let mut reductions = 0;
    let mut i = 0;
    while i < hulls.len() {
        let mut j = i + 1;
        while j < hulls.len() {
            if hulls[i].rect.intersects(&hulls[j].rect) {
                let (cut, cutter) = if cut_first(&hulls[i].rect, &hulls[j].rect) {
                    (i, j)
                } else {
                    (j, i)
                };
                let cutter_rect = hulls[cutter].rect;
                let mut pieces = hulls[cut].rect.subtract(&cutter_rect).into_iter();
                let shape = hulls[cut].shape;
                hulls[cut].rect = pieces.next().unwrap_or_default();
                hulls.extend(pieces.map(|rect| Hull::new(rect, shape)));
                reductions += 1;
            }
            j += 1;
        }
        i += 1;
    }
    hulls.retain(|h| !h.rect.is_degenerate());
    reductions
}

/// Pairs of hulls that still overlap.
pub fn overlapping_pairs(hulls: &[Hull]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..hulls.len() {
        for j in (i + 1)..hulls.len() {
            if hulls[i].rect.intersects(&hulls[j].rect) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Resolve overlapping shape rects into disjoint hulls.
///
/// Runs the single forward pass, then re-checks the result. Any residual
/// overlap is logged and another pass is made, up to a fixed bound.
pub fn partition_hulls(mut hulls: Vec<Hull>) -> Vec<Hull> {
    hulls.retain(|h| !h.rect.is_degenerate());
    let reductions = reduce_overlaps_single_pass(&mut hulls);
    log::debug!("Hull reduction: {} rewrites, {} hulls", reductions, hulls.len());

    for pass in 1..MAX_REDUCTION_PASSES {
        let residual = overlapping_pairs(&hulls);
        if residual.is_empty() {
            break;
        }
        log::warn!(
            "Hull pass {} left {} overlapping pairs (first {:?}); reducing again",
            pass,
            residual.len(),
            residual[0]
        );
        reduce_overlaps_single_pass(&mut hulls);
    }
    hulls
}

/// Split any hull that contains a door strictly inside it, at the door's
/// centre line across its passage direction.
pub fn split_hulls_at_doors(hulls: &mut Vec<Hull>, doors: &[DoorMarker]) {
    for door in doors {
        let c = door.rect.center_i();
        let found = hulls.iter().position(|h| {
            let r = h.rect;
            if door.is_horizontal {
                r.x + ADJACENCY_TOLERANCE < c.x
                    && c.x < r.right() - ADJACENCY_TOLERANCE
                    && r.y <= c.y
                    && c.y <= r.top()
            } else {
                r.y + ADJACENCY_TOLERANCE < c.y
                    && c.y < r.top() - ADJACENCY_TOLERANCE
                    && r.x <= c.x
                    && c.x <= r.right()
            }
        });
        let Some(index) = found else {
            continue;
        };
        let r = hulls[index].rect;
        let (first, second) = if door.is_horizontal {
            (
                Rect::from_edges(r.x, r.y, c.x, r.top()),
                Rect::from_edges(c.x, r.y, r.right(), r.top()),
            )
        } else {
            (
                Rect::from_edges(r.x, r.y, r.right(), c.y),
                Rect::from_edges(r.x, c.y, r.right(), r.top()),
            )
        };
        let shape = hulls[index].shape;
        hulls[index].rect = first;
        hulls.push(Hull::new(second, shape));
    }
}

fn hull_at(hulls: &[Hull], point: Vec2) -> Option<usize> {
    hulls.iter().position(|h| h.rect.contains_point(point))
}

fn door_near(doors: &[DoorMarker], gap: &Rect, is_horizontal: bool) -> bool {
    let center = gap.center();
    doors.iter().any(|door| {
        if door.is_horizontal != is_horizontal {
            return false;
        }
        let d = door.rect.center();
        if is_horizontal {
            (d.x - center.x).abs() <= DOOR_GAP_TOLERANCE
                && d.y >= gap.y as f32
                && d.y <= gap.top() as f32
        } else {
            (d.y - center.y).abs() <= DOOR_GAP_TOLERANCE
                && d.x >= gap.x as f32
                && d.x <= gap.right() as f32
        }
    })
}

/// Door gaps first (one per door, in door order), then one gap per pair of
/// touching hulls not already covered by a door.
pub fn build_gaps(hulls: &[Hull], doors: &[DoorMarker], thickness: i32) -> Vec<Gap> {
    let mut gaps = Vec::new();

    for (index, door) in doors.iter().enumerate() {
        let c = door.rect.center();
        let (before, after) = if door.is_horizontal {
            (c - Vec2::X, c + Vec2::X)
        } else {
            (c - Vec2::Y, c + Vec2::Y)
        };
        gaps.push(Gap {
            rect: door.rect,
            is_horizontal: door.is_horizontal,
            hulls: [hull_at(hulls, before), hull_at(hulls, after)],
            door: Some(index),
        });
    }

    let half = thickness / 2;
    for i in 0..hulls.len() {
        for j in (i + 1)..hulls.len() {
            let (a, b) = (hulls[i].rect, hulls[j].rect);

            let side_by_side = if (a.right() - b.x).abs() <= ADJACENCY_TOLERANCE {
                Some(((a.right() + b.x) / 2, [i, j]))
            } else if (b.right() - a.x).abs() <= ADJACENCY_TOLERANCE {
                Some(((b.right() + a.x) / 2, [j, i]))
            } else {
                None
            };
            if let Some((x, order)) = side_by_side {
                let (lo, hi) = (a.y.max(b.y), a.top().min(b.top()));
                if hi > lo {
                    let rect = Rect::from_edges(x - half, lo, x - half + thickness, hi);
                    if !door_near(doors, &rect, true) {
                        gaps.push(Gap {
                            rect,
                            is_horizontal: true,
                            hulls: [Some(order[0]), Some(order[1])],
                            door: None,
                        });
                    }
                }
                continue;
            }

            let stacked = if (a.top() - b.y).abs() <= ADJACENCY_TOLERANCE {
                Some(((a.top() + b.y) / 2, [i, j]))
            } else if (b.top() - a.y).abs() <= ADJACENCY_TOLERANCE {
                Some(((b.top() + a.y) / 2, [j, i]))
            } else {
                None
            };
            if let Some((y, order)) = stacked {
                let (lo, hi) = (a.x.max(b.x), a.right().min(b.right()));
                if hi > lo {
                    let rect = Rect::from_edges(lo, y - half, hi, y - half + thickness);
                    if !door_near(doors, &rect, false) {
                        gaps.push(Gap {
                            rect,
                            is_horizontal: false,
                            hulls: [Some(order[0]), Some(order[1])],
                            door: None,
                        });
                    }
                }
            }
        }
    }
    gaps
}
