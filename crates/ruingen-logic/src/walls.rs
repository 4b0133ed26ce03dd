//! Shape Geometry Builder: removes wall segments embedded in other shapes.
//!
//! Where a corridor cuts through a room, the room's edge inside the
//! corridor and the corridor's edges inside the room would otherwise render
//! as double walls. Each line is clipped against every other shape's rect
//! that intersects its own shape.

use crate::geometry::{Line, Rect};
use crate::shape::RuinShape;
use glam::IVec2;

/// Clip one axis-aligned line against a rect.
///
/// A line on the rect boundary or outside it is kept whole; the part
/// strictly inside is removed, leaving zero, one or two pieces.
pub fn clip_line(line: &Line, rect: &Rect) -> Vec<Line> {
    let (across, lo, hi, span_lo, span_hi) = if line.is_horizontal() {
        (line.a.y, rect.y, rect.top(), rect.x, rect.right())
    } else {
        (line.a.x, rect.x, rect.right(), rect.y, rect.top())
    };
    let (start, end) = if line.is_horizontal() {
        (line.a.x, line.b.x)
    } else {
        (line.a.y, line.b.y)
    };

    if across <= lo || across >= hi || end <= span_lo || start >= span_hi {
        return vec![*line];
    }

    let make = |from: i32, to: i32| -> Line {
        let (p1, p2) = if line.is_horizontal() {
            (IVec2::new(from, across), IVec2::new(to, across))
        } else {
            (IVec2::new(across, from), IVec2::new(across, to))
        };
        Line::new(p1, p2).with_radius(line.radius)
    };

    let mut pieces = Vec::with_capacity(2);
    if start < span_lo {
        pieces.push(make(start, span_lo));
    }
    if end > span_hi {
        pieces.push(make(span_hi, end));
    }
    pieces
}

/// Clip every shape's walls against each other intersecting shape.
pub fn split_walls(shapes: &mut [RuinShape]) {
    let rects: Vec<Rect> = shapes.iter().map(|s| s.rect).collect();
    let mut removed = 0usize;
    for (i, shape) in shapes.iter_mut().enumerate() {
        for (j, other) in rects.iter().enumerate() {
            if i == j || !shape.rect.intersects(other) {
                continue;
            }
            let before = shape.walls.len();
            shape.walls = shape
                .walls
                .iter()
                .flat_map(|line| clip_line(line, other))
                .filter(|line| line.length() > 0)
                .collect();
            removed += before.saturating_sub(shape.walls.len());
        }
    }
    log::debug!("Wall splitting removed {} segments", removed);
}

/// All wall segments of all shapes, in shape order.
pub fn merged_walls(shapes: &[RuinShape]) -> Vec<Line> {
    shapes.iter().flat_map(|s| s.walls.iter().copied()).collect()
}
