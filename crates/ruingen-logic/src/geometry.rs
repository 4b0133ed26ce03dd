//! Integer rectangles and wall segments.
//!
//! All layout geometry is integer so that repeated and mirrored runs produce
//! bit-identical output. Y grows upward: `Rect::y` is the bottom edge.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with its origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from edge coordinates. Inverted edges produce a degenerate rect.
    pub const fn from_edges(left: i32, bottom: i32, right: i32, top: i32) -> Self {
        Self {
            x: left,
            y: bottom,
            width: right - left,
            height: top - bottom,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn top(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Integer centre, rounded toward the bottom-left.
    pub const fn center_i(&self) -> IVec2 {
        IVec2::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True if the rect has non-positive width or height.
    pub const fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Positive-area overlap test. Rects that only touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_degenerate()
            && !other.is_degenerate()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.top().min(other.top()),
        ))
    }

    /// Non-strict containment: edges may coincide.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.top() <= self.top()
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x as f32
            && p.x <= self.right() as f32
            && p.y >= self.y as f32
            && p.y <= self.top() as f32
    }

    /// Length of the shared X interval (negative when disjoint).
    pub fn overlap_x(&self, other: &Rect) -> i32 {
        self.right().min(other.right()) - self.x.max(other.x)
    }

    /// Length of the shared Y interval (negative when disjoint).
    pub fn overlap_y(&self, other: &Rect) -> i32 {
        self.top().min(other.top()) - self.y.max(other.y)
    }

    /// True if the two rects share an edge (within `tolerance`) with a
    /// positive overlap along that edge, or if they intersect.
    pub fn is_adjacent(&self, other: &Rect, tolerance: i32) -> bool {
        if self.intersects(other) {
            return true;
        }
        let side_by_side = (self.right() - other.x).abs() <= tolerance
            || (other.right() - self.x).abs() <= tolerance;
        let stacked = (self.top() - other.y).abs() <= tolerance
            || (other.top() - self.y).abs() <= tolerance;
        (side_by_side && self.overlap_y(other) > 0) || (stacked && self.overlap_x(other) > 0)
    }

    /// Shrink around the centre by independent width/height ratios.
    /// The result is always at least 1×1.
    pub fn scaled(&self, ratio_w: f32, ratio_h: f32) -> Rect {
        let width = ((self.width as f32 * ratio_w).round() as i32).clamp(1, self.width.max(1));
        let height = ((self.height as f32 * ratio_h).round() as i32).clamp(1, self.height.max(1));
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }

    /// The parts of `self` not covered by `cutter`.
    ///
    /// Pieces come out as full-height left/right columns first, then the
    /// bottom/top remainders of the middle column. Returns `self` unchanged
    /// when the two do not intersect and an empty list when fully covered.
    pub fn subtract(&self, cutter: &Rect) -> Vec<Rect> {
        let Some(cut) = self.intersection(cutter) else {
            return vec![*self];
        };
        let mut pieces = Vec::with_capacity(4);
        if cut.x > self.x {
            pieces.push(Rect::from_edges(self.x, self.y, cut.x, self.top()));
        }
        if cut.right() < self.right() {
            pieces.push(Rect::from_edges(cut.right(), self.y, self.right(), self.top()));
        }
        if cut.y > self.y {
            pieces.push(Rect::from_edges(cut.x, self.y, cut.right(), cut.y));
        }
        if cut.top() < self.top() {
            pieces.push(Rect::from_edges(cut.x, cut.top(), cut.right(), self.top()));
        }
        pieces
    }

    /// Reflect about the vertical line `x = axis2 / 2`.
    ///
    /// Takes twice the axis so odd-width areas mirror exactly in integers.
    pub const fn mirrored_x(&self, axis2: i32) -> Rect {
        Rect::new(axis2 - self.right(), self.y, self.width, self.height)
    }
}

/// Twice the X coordinate of an area's vertical centre line.
pub const fn mirror_axis2(area: &Rect) -> i32 {
    area.x * 2 + area.width
}

/// Reflect a point about `x = axis2 / 2`.
pub fn mirror_point(p: Vec2, axis2: i32) -> Vec2 {
    Vec2::new(axis2 as f32 - p.x, p.y)
}

/// An axis-aligned wall segment.
///
/// Endpoints are ordered so `a` is lexicographically ≤ `b`. `radius` is
/// the wall's half-thickness and stays zero until a wall entity is placed
/// on the segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: IVec2,
    pub b: IVec2,
    pub radius: f32,
}

impl Line {
    pub fn new(p1: IVec2, p2: IVec2) -> Self {
        let (a, b) = if (p1.x, p1.y) <= (p2.x, p2.y) {
            (p1, p2)
        } else {
            (p2, p1)
        };
        Self { a, b, radius: 0.0 }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn is_horizontal(&self) -> bool {
        self.a.y == self.b.y
    }

    pub fn length(&self) -> i32 {
        (self.b.x - self.a.x).abs() + (self.b.y - self.a.y).abs()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.a.as_vec2() + self.b.as_vec2()) / 2.0
    }

    /// Corners of the segment thickened by its radius, counter-clockwise.
    pub fn polygon(&self) -> [Vec2; 4] {
        let a = self.a.as_vec2();
        let b = self.b.as_vec2();
        let normal = (b - a).normalize_or_zero().perp() * self.radius;
        [a - normal, b - normal, b + normal, a + normal]
    }

    /// Distance along a unit `dir` from `origin` to this segment, if hit.
    pub fn ray_distance(&self, origin: Vec2, dir: Vec2) -> Option<f32> {
        let a = self.a.as_vec2();
        let seg = self.b.as_vec2() - a;
        let denom = dir.perp_dot(seg);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let to_a = a - origin;
        let t = to_a.perp_dot(seg) / denom;
        let u = to_a.perp_dot(dir) / denom;
        if t >= 0.0 && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    pub fn mirrored_x(&self, axis2: i32) -> Line {
        Line::new(
            IVec2::new(axis2 - self.a.x, self.a.y),
            IVec2::new(axis2 - self.b.x, self.b.y),
        )
        .with_radius(self.radius)
    }
}
