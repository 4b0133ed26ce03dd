//! Axis-aligned float bounds for placed entities.

use glam::Vec2;
use ruingen_logic::Rect;
use serde::{Deserialize, Serialize};

const CONTAIN_EPSILON: f32 = 0.01;

/// World-space footprint of a placed entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            center: rect.center(),
            size: Vec2::new(rect.width as f32, rect.height as f32),
        }
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    pub fn half(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half()
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half()
    }

    /// Strict overlap: touching bounds do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half() + other.half();
        d.x < reach.x && d.y < reach.y
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        omin.x >= min.x - CONTAIN_EPSILON
            && omin.y >= min.y - CONTAIN_EPSILON
            && omax.x <= max.x + CONTAIN_EPSILON
            && omax.y <= max.y + CONTAIN_EPSILON
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    /// Shrink each side independently. Sides that cross collapse onto the
    /// midpoint.
    pub fn inset(&self, left: f32, bottom: f32, right: f32, top: f32) -> Bounds {
        let min = self.min() + Vec2::new(left, bottom);
        let max = self.max() - Vec2::new(right, top);
        let mid = (min + max) * 0.5;
        Bounds::from_min_max(min.min(mid), max.max(mid))
    }

    /// The centre nearest `center` at which an entity of `size` stays
    /// inside these bounds. An axis too small to fit is centred.
    pub fn clamp_center(&self, center: Vec2, size: Vec2) -> Vec2 {
        let lo = self.min() + size * 0.5;
        let hi = self.max() - size * 0.5;
        let axis = |c: f32, lo: f32, hi: f32, mid: f32| if lo > hi { mid } else { c.clamp(lo, hi) };
        Vec2::new(
            axis(center.x, lo.x, hi.x, self.center.x),
            axis(center.y, lo.y, hi.y, self.center.y),
        )
    }

    pub fn mirrored_x(&self, axis2: i32) -> Bounds {
        Bounds {
            center: Vec2::new(axis2 as f32 - self.center.x, self.center.y),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_bounds_do_not_overlap() {
        let a = Bounds::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Bounds::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(!a.overlaps(&b));
        let c = Bounds::new(Vec2::new(9.0, 3.0), Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_clamp_keeps_entity_inside() {
        let interior = Bounds::from_rect(&Rect::new(0, 0, 100, 50));
        let size = Vec2::new(20.0, 20.0);
        let c = interior.clamp_center(Vec2::new(-40.0, 200.0), size);
        assert_eq!(c, Vec2::new(10.0, 40.0));
        assert!(interior.contains(&Bounds::new(c, size)));
    }

    #[test]
    fn test_clamp_centres_oversized_axis() {
        let interior = Bounds::from_rect(&Rect::new(0, 0, 100, 10));
        let c = interior.clamp_center(Vec2::new(90.0, 0.0), Vec2::new(20.0, 30.0));
        assert_eq!(c, Vec2::new(90.0, 5.0));
    }

    #[test]
    fn test_inset_and_mirror() {
        let b = Bounds::from_rect(&Rect::new(0, 0, 100, 100)).inset(10.0, 0.0, 30.0, 0.0);
        assert_eq!(b.min(), Vec2::new(10.0, 0.0));
        assert_eq!(b.max(), Vec2::new(70.0, 100.0));
        assert_eq!(b.mirrored_x(100).center.x, 60.0);
    }
}
